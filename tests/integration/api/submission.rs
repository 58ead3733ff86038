use crate::integration::common::*;
use actix_web::{http::StatusCode, test};
use alloy::{primitives::Address, sol_types::SolValue};
use modal_relayer::{
    constants::MODULAR_ACCOUNT_V2_FACTORY_ADDRESS, models::UserRecord,
    repositories::InMemoryCredentialStore,
};
use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn post(uri: &str, body: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri(uri)
        .insert_header(("content-type", "application/json"))
        .set_payload(body.to_string())
}

#[actix_web::test]
async fn test_register_peer_submits_sponsored_user_operation() {
    let rpc = MockServer::start().await;
    let signer = MockServer::start().await;
    mount_account_and_sponsorship(&rpc, false).await;
    mount_send_user_operation(&rpc).await;
    mount_signing_relay(&signer).await;

    let config = server_config(&rpc, &signer, &[]);
    let app = init_app!(app_state(&config, seeded_store().await));

    let resp = test::call_service(
        &app,
        post(
            "/api/register-peer",
            &format!(r#"{{"orgId":"{}","peerId":"peer-123"}}"#, ORG_ID),
        )
        .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "hash": USER_OPERATION_HASH }));

    let sent = received_rpc(&rpc, "eth_sendUserOperation").await.unwrap();
    let operation = &sent["params"][0];
    assert_eq!(
        operation["sender"].as_str().unwrap().parse::<Address>().unwrap(),
        ACCOUNT
    );
    assert_eq!(
        operation["factory"].as_str().unwrap().parse::<Address>().unwrap(),
        MODULAR_ACCOUNT_V2_FACTORY_ADDRESS
    );
    // execute(address,uint256,bytes)
    assert!(operation["callData"].as_str().unwrap().starts_with("0xb61d27f6"));
    assert!(operation["signature"].as_str().unwrap().starts_with("0xff00"));
    assert_eq!(operation["paymasterData"], "0xabcd");

    let sponsorship = received_rpc(&rpc, "alchemy_requestGasAndPaymasterAndData")
        .await
        .unwrap();
    assert_eq!(sponsorship["params"][0]["policyId"], "policy-1");

    let relay_requests = signer.received_requests().await.unwrap();
    assert_eq!(relay_requests.len(), 1);
    assert_eq!(
        relay_requests[0].headers.get("authorization").unwrap(),
        "Bearer alchemy-key"
    );
    let stamped: Value = serde_json::from_slice(&relay_requests[0].body).unwrap();
    assert!(stamped["stampedRequest"]["url"]
        .as_str()
        .unwrap()
        .ends_with("/public/v1/submit/sign_raw_payload"));
    assert_eq!(
        stamped["stampedRequest"]["stamp"]["stampHeaderName"],
        "X-Stamp"
    );
}

#[actix_web::test]
async fn test_submit_winner_from_deployed_account_omits_factory() {
    let rpc = MockServer::start().await;
    let signer = MockServer::start().await;
    mount_account_and_sponsorship(&rpc, true).await;
    mount_send_user_operation(&rpc).await;
    mount_signing_relay(&signer).await;

    let config = server_config(&rpc, &signer, &[]);
    let app = init_app!(app_state(&config, seeded_store().await));

    let resp = test::call_service(
        &app,
        post(
            "/api/submit-winner",
            &format!(
                r#"{{"orgId":"{}","roundNumber":7,"winners":["a","b"]}}"#,
                ORG_ID
            ),
        )
        .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "hash": USER_OPERATION_HASH }));

    let sent = received_rpc(&rpc, "eth_sendUserOperation").await.unwrap();
    assert!(sent["params"][0].get("factory").is_none());
    assert!(sent["params"][0].get("factoryData").is_none());
}

#[actix_web::test]
async fn test_signing_relay_failure_is_opaque_and_nothing_is_sent() {
    let rpc = MockServer::start().await;
    let signer = MockServer::start().await;
    mount_account_and_sponsorship(&rpc, true).await;
    Mock::given(RpcCall::method("eth_sendUserOperation"))
        .respond_with(rpc_result(json!(USER_OPERATION_HASH)))
        .expect(0)
        .mount(&rpc)
        .await;
    Mock::given(method("POST"))
        .and(path("/signer/v1/sign-payload"))
        .respond_with(ResponseTemplate::new(500).set_body_string("custody backend exploded"))
        .mount(&signer)
        .await;

    let config = server_config(&rpc, &signer, &[]);
    let app = init_app!(app_state(&config, seeded_store().await));

    let resp = test::call_service(
        &app,
        post(
            "/api/register-peer",
            &format!(r#"{{"orgId":"{}","peerId":"peer-123"}}"#, ORG_ID),
        )
        .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = test::read_body(resp).await;
    assert!(!String::from_utf8_lossy(&body).contains("exploded"));
    assert_eq!(
        serde_json::from_slice::<Value>(&body).unwrap(),
        json!({ "error": "error" })
    );
}

#[actix_web::test]
async fn test_sponsorship_rejection_never_reaches_signer() {
    let rpc = MockServer::start().await;
    let signer = MockServer::start().await;
    Mock::given(RpcCall::eth_call(GET_ADDRESS_SELECTOR))
        .respond_with(rpc_result(json!(format!(
            "0x{}",
            hex::encode(ACCOUNT.abi_encode())
        ))))
        .mount(&rpc)
        .await;
    Mock::given(RpcCall::method("eth_getCode"))
        .respond_with(rpc_result(json!("0x6080")))
        .mount(&rpc)
        .await;
    Mock::given(RpcCall::eth_call(GET_NONCE_SELECTOR))
        .respond_with(rpc_result(json!(format!("0x{}", "00".repeat(32)))))
        .mount(&rpc)
        .await;
    Mock::given(RpcCall::method("alchemy_requestGasAndPaymasterAndData"))
        .respond_with(rpc_error(-32000, "policy exhausted"))
        .mount(&rpc)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&signer)
        .await;

    let config = server_config(&rpc, &signer, &[]);
    let app = init_app!(app_state(&config, seeded_store().await));

    let resp = test::call_service(
        &app,
        post(
            "/api/submit-winner",
            &format!(
                r#"{{"orgId":"{}","roundNumber":"0x07","winners":[]}}"#,
                ORG_ID
            ),
        )
        .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "error" }));
}

#[actix_web::test]
async fn test_unknown_org_is_not_found_without_relay_traffic() {
    let rpc = MockServer::start().await;
    let signer = MockServer::start().await;
    let config = server_config(&rpc, &signer, &[]);
    let app = init_app!(app_state(&config, seeded_store().await));

    let resp = test::call_service(
        &app,
        post("/api/register-peer", r#"{"orgId":"nobody","peerId":"peer-1"}"#)
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "user not found" }));
    assert!(rpc.received_requests().await.unwrap_or_default().is_empty());
    assert!(signer.received_requests().await.unwrap_or_default().is_empty());
}

#[actix_web::test]
async fn test_user_without_api_key_is_internal_error() {
    let rpc = MockServer::start().await;
    let signer = MockServer::start().await;
    let store = InMemoryCredentialStore::new();
    store
        .add_user(UserRecord {
            org_id: ORG_ID.to_string(),
            address: OWNER,
        })
        .await;

    let config = server_config(&rpc, &signer, &[]);
    let app = init_app!(app_state(&config, store));

    let resp = test::call_service(
        &app,
        post(
            "/api/register-peer",
            &format!(r#"{{"orgId":"{}","peerId":"peer-1"}}"#, ORG_ID),
        )
        .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "api key not found" }));
}

#[actix_web::test]
async fn test_invalid_bodies_are_bad_requests() {
    let rpc = MockServer::start().await;
    let signer = MockServer::start().await;
    let config = server_config(&rpc, &signer, &[]);
    let app = init_app!(app_state(&config, seeded_store().await));

    let cases = [
        ("/api/register-peer", r#"{"peerId":"peer-1"}"#),
        ("/api/register-peer", r#"{"orgId":"org-1"}"#),
        ("/api/register-peer", "not json"),
        ("/api/submit-winner", r#"{"orgId":"org-1","winners":["a"]}"#),
        ("/api/submit-winner", r#"{"orgId":"org-1","roundNumber":-1,"winners":[]}"#),
    ];

    for (uri, payload) in cases {
        let resp = test::call_service(&app, post(uri, payload).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{} {}", uri, payload);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "bad request" }));
    }
    assert!(rpc.received_requests().await.unwrap_or_default().is_empty());
}

#[actix_web::test]
async fn test_duplicate_registration_is_rejected_when_enabled() {
    let rpc = MockServer::start().await;
    let signer = MockServer::start().await;
    mount_account_and_sponsorship(&rpc, true).await;
    Mock::given(RpcCall::eth_call(GET_PEER_ID_SELECTOR))
        .respond_with(rpc_result(json!(format!(
            "0x{}",
            hex::encode(("peer-9".to_string(),).abi_encode_params())
        ))))
        .expect(1)
        .mount(&rpc)
        .await;
    Mock::given(RpcCall::method("eth_sendUserOperation"))
        .respond_with(rpc_result(json!(USER_OPERATION_HASH)))
        .expect(0)
        .mount(&rpc)
        .await;

    let config = server_config(&rpc, &signer, &[("REJECT_DUPLICATE_PEERS", "true")]);
    let app = init_app!(app_state(&config, seeded_store().await));

    let resp = test::call_service(
        &app,
        post(
            "/api/register-peer",
            &format!(r#"{{"orgId":"{}","peerId":"peer-123"}}"#, ORG_ID),
        )
        .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "account address already registered" }));
    assert!(signer.received_requests().await.unwrap_or_default().is_empty());
}
