use crate::integration::common::{app_state, init_app, seeded_store, server_config};
use actix_web::test;
use wiremock::MockServer;

#[actix_web::test]
async fn test_health_is_served_under_api_v1() {
    let rpc = MockServer::start().await;
    let signer = MockServer::start().await;
    let config = server_config(&rpc, &signer, &[]);
    let app = init_app!(app_state(&config, seeded_store().await));

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    assert_eq!(test::read_body(resp).await, "OK");
    assert!(rpc.received_requests().await.unwrap_or_default().is_empty());
}
