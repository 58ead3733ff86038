//! # Signing Relay Module
//!
//! Forwards stamped Turnkey requests to the Alchemy signer relay, which
//! verifies the stamp, asks the custody backend for the signature and returns
//! it. The relay only ever sees the stamped envelope, never the API private key.
use std::time::Duration;

use alloy::primitives::Bytes;
use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::constants::{
    DEFAULT_HTTP_CLIENT_CONNECT_TIMEOUT_SECONDS, DEFAULT_HTTP_CLIENT_POOL_IDLE_TIMEOUT_SECONDS,
    DEFAULT_HTTP_CLIENT_POOL_MAX_IDLE_PER_HOST, SECP256K1_SIGNATURE_LENGTH, SIGN_PAYLOAD_PATH,
};
use crate::models::SecretString;
use crate::services::turnkey::StampedEnvelope;

#[derive(Error, Debug)]
pub enum SigningRelayError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Signing relay rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignPayloadRequest<'a> {
    stamped_request: &'a StampedEnvelope,
}

#[derive(Deserialize)]
struct SignPayloadResponse {
    signature: String,
}

/// Submits a stamped envelope and returns the raw 65 byte signature as produced
/// by the custody backend.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SigningTransport: Send + Sync {
    async fn submit(&self, envelope: &StampedEnvelope) -> Result<Bytes, SigningRelayError>;
}

#[derive(Clone)]
pub struct AlchemySigningRelay {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl std::fmt::Debug for AlchemySigningRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlchemySigningRelay")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl AlchemySigningRelay {
    pub fn new(
        base_url: impl Into<String>,
        api_key: SecretString,
        timeout_seconds: u64,
    ) -> Result<Self, SigningRelayError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(
                DEFAULT_HTTP_CLIENT_CONNECT_TIMEOUT_SECONDS,
            ))
            .timeout(Duration::from_secs(timeout_seconds))
            .pool_max_idle_per_host(DEFAULT_HTTP_CLIENT_POOL_MAX_IDLE_PER_HOST)
            .pool_idle_timeout(Duration::from_secs(
                DEFAULT_HTTP_CLIENT_POOL_IDLE_TIMEOUT_SECONDS,
            ))
            .build()
            .map_err(|e| {
                SigningRelayError::ConfigError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl SigningTransport for AlchemySigningRelay {
    async fn submit(&self, envelope: &StampedEnvelope) -> Result<Bytes, SigningRelayError> {
        let url = format!("{}{}", self.base_url, SIGN_PAYLOAD_PATH);
        debug!("Forwarding stamped request to signing relay at {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .json(&SignPayloadRequest {
                stamped_request: envelope,
            })
            .send()
            .await
            .map_err(|e| SigningRelayError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Signing relay responded with status {}", status);
            return Err(SigningRelayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let payload: SignPayloadResponse = response
            .json()
            .await
            .map_err(|e| SigningRelayError::InvalidResponse(e.to_string()))?;

        decode_signature(&payload.signature)
    }
}

fn decode_signature(signature: &str) -> Result<Bytes, SigningRelayError> {
    let bytes = hex::decode(signature.strip_prefix("0x").unwrap_or(signature))
        .map_err(|e| SigningRelayError::InvalidResponse(format!("Signature is not hex: {}", e)))?;

    if bytes.len() != SECP256K1_SIGNATURE_LENGTH {
        return Err(SigningRelayError::InvalidResponse(format!(
            "Expected {} byte signature, got {}",
            SECP256K1_SIGNATURE_LENGTH,
            bytes.len()
        )));
    }

    Ok(Bytes::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::turnkey::Stamp;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn envelope() -> StampedEnvelope {
        StampedEnvelope {
            url: "https://api.turnkey.com/public/v1/submit/sign_raw_payload".to_string(),
            body: "{\"type\":\"ACTIVITY_TYPE_SIGN_RAW_PAYLOAD_V2\"}".to_string(),
            stamp: Stamp {
                stamp_header_name: "X-Stamp".to_string(),
                stamp_header_value: "c3RhbXA".to_string(),
            },
        }
    }

    fn relay(server: &MockServer) -> AlchemySigningRelay {
        AlchemySigningRelay::new(server.uri(), SecretString::new("alchemy-key"), 5).unwrap()
    }

    #[tokio::test]
    async fn test_submit_posts_stamped_request_with_bearer_key() {
        let server = MockServer::start().await;
        let signature = format!("0x{}1b", "ab".repeat(64));

        Mock::given(method("POST"))
            .and(path("/signer/v1/sign-payload"))
            .and(header("authorization", "Bearer alchemy-key"))
            .and(body_json(serde_json::json!({
                "stampedRequest": {
                    "url": "https://api.turnkey.com/public/v1/submit/sign_raw_payload",
                    "body": "{\"type\":\"ACTIVITY_TYPE_SIGN_RAW_PAYLOAD_V2\"}",
                    "stamp": {
                        "stampHeaderName": "X-Stamp",
                        "stampHeaderValue": "c3RhbXA"
                    }
                }
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "signature": signature
                })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = relay(&server).submit(&envelope()).await.unwrap();
        assert_eq!(result.len(), 65);
        assert_eq!(result[64], 0x1b);
    }

    #[tokio::test]
    async fn test_submit_surfaces_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/signer/v1/sign-payload"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid stamp"))
            .mount(&server)
            .await;

        let err = relay(&server).submit(&envelope()).await.unwrap_err();
        match err {
            SigningRelayError::Rejected { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid stamp");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_submit_rejects_short_signature() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/signer/v1/sign-payload"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "signature": "0x1234" })),
            )
            .mount(&server)
            .await;

        let err = relay(&server).submit(&envelope()).await.unwrap_err();
        assert!(matches!(err, SigningRelayError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_submit_rejects_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/signer/v1/sign-payload"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = relay(&server).submit(&envelope()).await.unwrap_err();
        assert!(matches!(err, SigningRelayError::InvalidResponse(_)));
    }

    #[test]
    fn test_debug_does_not_print_api_key() {
        let relay =
            AlchemySigningRelay::new("https://relay", SecretString::new("alchemy-key"), 5).unwrap();
        assert!(!format!("{:?}", relay).contains("alchemy-key"));
    }
}
