//! Shared fixtures: credential records, relay mocks and the application under test.
use alloy::{
    primitives::{Address, U256},
    sol_types::SolValue,
};
use chrono::{TimeZone, Utc};
use modal_relayer::{
    bootstrap::build_app_state,
    config::ServerConfig,
    models::{ApiKeyPair, DefaultAppState, SecretString, UserRecord},
    repositories::{CredentialStoreStorage, InMemoryCredentialStore},
};
use p256::ecdsa::SigningKey;
use serde_json::{json, Value};
use std::collections::HashMap;
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

pub const ORG_ID: &str = "org-1";
pub const CONTRACT: &str = "0x6484a07281B72b8b541A86Ec055534223672c2fb";
pub const OWNER: Address = Address::new([0x11; 20]);
pub const ACCOUNT: Address = Address::new([0xaa; 20]);
pub const USER_OPERATION_HASH: &str = "0xdeadbeef";

const API_PRIVATE_KEY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

/// Selector of `getAddressSemiModular(address,uint256)`.
pub const GET_ADDRESS_SELECTOR: &str = "0x6aa34063";
/// Selector of `getNonce(address,uint192)`.
pub const GET_NONCE_SELECTOR: &str = "0x35567e1a";
/// Selector of `getPeerId(address)`.
pub const GET_PEER_ID_SELECTOR: &str = "0x738e8995";

pub fn api_key(org_id: &str) -> ApiKeyPair {
    let bytes = hex::decode(API_PRIVATE_KEY).unwrap();
    let signing_key = SigningKey::from_slice(&bytes).unwrap();
    ApiKeyPair {
        org_id: org_id.to_string(),
        public_key: hex::encode(signing_key.verifying_key().to_encoded_point(true)),
        private_key: SecretString::new(API_PRIVATE_KEY),
        created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
    }
}

pub async fn seeded_store() -> InMemoryCredentialStore {
    let store = InMemoryCredentialStore::new();
    store
        .add_user(UserRecord {
            org_id: ORG_ID.to_string(),
            address: OWNER,
        })
        .await;
    store.add_api_key(api_key(ORG_ID)).await;
    store
}

pub fn server_config(rpc: &MockServer, signer: &MockServer, extra: &[(&str, &str)]) -> ServerConfig {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("ALCHEMY_API_KEY".to_string(), "alchemy-key".to_string()),
        ("PAYMASTER_POLICY_ID".to_string(), "policy-1".to_string()),
        ("SMART_CONTRACT_ADDRESS".to_string(), CONTRACT.to_string()),
        ("RPC_URL".to_string(), rpc.uri()),
        ("SIGNER_RELAY_URL".to_string(), signer.uri()),
        ("RELAY_TIMEOUT_SECONDS".to_string(), "5".to_string()),
    ]);
    for (key, value) in extra {
        vars.insert(key.to_string(), value.to_string());
    }
    ServerConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

pub fn app_state(config: &ServerConfig, store: InMemoryCredentialStore) -> DefaultAppState {
    build_app_state(config, CredentialStoreStorage::new_in_memory(store)).unwrap()
}

/// Initializes the full `/api` application around an app state.
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::ThinData($state))
                .service(
                    actix_web::web::scope("/api")
                        .configure(modal_relayer::api::routes::configure_routes),
                ),
        )
        .await
    };
}
pub(crate) use init_app;

/// Matches a JSON-RPC request by method and, for `eth_call`, by selector.
pub struct RpcCall {
    method: &'static str,
    selector: Option<&'static str>,
}

impl RpcCall {
    pub fn method(method: &'static str) -> Self {
        Self {
            method,
            selector: None,
        }
    }

    pub fn eth_call(selector: &'static str) -> Self {
        Self {
            method: "eth_call",
            selector: Some(selector),
        }
    }
}

impl Match for RpcCall {
    fn matches(&self, request: &Request) -> bool {
        let Ok(body) = serde_json::from_slice::<Value>(&request.body) else {
            return false;
        };
        if body["method"].as_str() != Some(self.method) {
            return false;
        }
        match self.selector {
            Some(selector) => {
                let call = &body["params"][0];
                call["input"]
                    .as_str()
                    .or_else(|| call["data"].as_str())
                    .is_some_and(|data| data.starts_with(selector))
            }
            None => true,
        }
    }
}

pub fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": result,
    }))
}

pub fn rpc_error(code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": { "code": code, "message": message },
    }))
}

fn encoded(value: impl SolValue) -> Value {
    json!(format!("0x{}", hex::encode(value.abi_encode())))
}

/// Mounts the account lookup, nonce and sponsorship responses every submission needs.
pub async fn mount_account_and_sponsorship(rpc: &MockServer, deployed: bool) {
    Mock::given(RpcCall::eth_call(GET_ADDRESS_SELECTOR))
        .respond_with(rpc_result(encoded(ACCOUNT)))
        .mount(rpc)
        .await;

    let code = if deployed { "0x6080" } else { "0x" };
    Mock::given(RpcCall::method("eth_getCode"))
        .respond_with(rpc_result(json!(code)))
        .mount(rpc)
        .await;

    Mock::given(RpcCall::eth_call(GET_NONCE_SELECTOR))
        .respond_with(rpc_result(encoded(U256::from(3u64))))
        .mount(rpc)
        .await;

    Mock::given(RpcCall::method("alchemy_requestGasAndPaymasterAndData"))
        .respond_with(rpc_result(json!({
            "paymaster": "0x2222222222222222222222222222222222222222",
            "paymasterData": "0xabcd",
            "paymasterVerificationGasLimit": "0x7530",
            "paymasterPostOpGasLimit": "0x2710",
            "callGasLimit": "0x5208",
            "verificationGasLimit": "0x186a0",
            "preVerificationGas": "0xc350",
            "maxFeePerGas": "0x3b9aca00",
            "maxPriorityFeePerGas": "0x5f5e100",
        })))
        .mount(rpc)
        .await;
}

pub async fn mount_send_user_operation(rpc: &MockServer) {
    Mock::given(RpcCall::method("eth_sendUserOperation"))
        .respond_with(rpc_result(json!(USER_OPERATION_HASH)))
        .expect(1)
        .mount(rpc)
        .await;
}

/// Signing relay answering every stamped request with a fixed 65 byte signature.
pub async fn mount_signing_relay(signer: &MockServer) {
    Mock::given(wiremock::matchers::method("POST"))
        .and(wiremock::matchers::path("/signer/v1/sign-payload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "signature": format!("0x{}{}1b", "ab".repeat(32), "cd".repeat(32)),
        })))
        .expect(1)
        .mount(signer)
        .await;
}

/// JSON body of the first received request for `method`.
pub async fn received_rpc(rpc: &MockServer, method: &str) -> Option<Value> {
    rpc.received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|request| serde_json::from_slice::<Value>(&request.body).ok())
        .find(|body| body["method"].as_str() == Some(method))
}
