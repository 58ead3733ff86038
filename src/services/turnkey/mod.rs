//! # Turnkey Stamping Module
//!
//! Builds Turnkey `sign_raw_payload` activities and authenticates them with an
//! API key stamp. Stamping is local: it never contacts Turnkey. The resulting
//! [`StampedEnvelope`] is handed to a signing relay, which verifies the stamp
//! and obtains the signature from the custody backend.
//!
//! ## Architecture
//!
//! ```text
//! ApiKeyStamper
//!   ├── Activity body (ACTIVITY_TYPE_SIGN_RAW_PAYLOAD_V2)
//!   └── X-Stamp (P-256 ECDSA over the exact body bytes)
//! ```
use alloy::primitives::{Address, B256};
use p256::{
    ecdsa::{signature::Signer, Signature as P256Signature, SigningKey},
    FieldBytes,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    ACTIVITY_TYPE_SIGN_RAW_PAYLOAD_V2, HASH_FUNCTION_NO_OP, PAYLOAD_ENCODING_HEXADECIMAL,
    SIGN_RAW_PAYLOAD_PATH, STAMP_HEADER_NAME, STAMP_SCHEME_P256,
};
use crate::models::ApiKeyPair;
use crate::utils::base64_url_encode;

#[derive(Error, Debug, PartialEq)]
pub enum StampError {
    #[error("Invalid API key material: {0}")]
    InvalidKey(String),

    #[error("API public key does not match the private key")]
    KeyMismatch,

    #[error("API key belongs to organization {key_org}, request targets {request_org}")]
    OrganizationMismatch {
        key_org: String,
        request_org: String,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// A request to sign one digest with the custody-held key `sign_with`.
///
/// Built fresh for every signature.
#[derive(Debug, Clone, PartialEq)]
pub struct SigningRequest {
    pub organization_id: String,
    pub sign_with: Address,
    pub digest: B256,
}

/// Header carrying the API key stamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stamp {
    pub stamp_header_name: String,
    pub stamp_header_value: String,
}

/// A stamped Turnkey request. The `body` string is what the stamp signs, so it
/// must reach the relay unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampedEnvelope {
    pub url: String,
    pub body: String,
    pub stamp: Stamp,
}

/// Digital stamp for API authentication
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiStamp {
    public_key: String,
    scheme: String,
    signature: String,
}

/// Request to sign raw payload
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignRawPayloadRequest {
    #[serde(rename = "type")]
    pub activity_type: String,
    pub timestamp_ms: String,
    pub organization_id: String,
    pub parameters: SignRawPayloadIntentV2Parameters,
}

/// Parameters for signing raw payload
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignRawPayloadIntentV2Parameters {
    pub sign_with: String,
    pub payload: String,
    pub encoding: String,
    pub hash_function: String,
}

#[derive(Debug, Clone)]
pub struct ApiKeyStamper {
    base_url: String,
}

impl ApiKeyStamper {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Stamps `request` with `api_key`.
    ///
    /// Pure in its inputs: the same request, key and timestamp always produce the
    /// same envelope.
    pub fn stamp(
        &self,
        request: &SigningRequest,
        api_key: &ApiKeyPair,
        timestamp_ms: i64,
    ) -> Result<StampedEnvelope, StampError> {
        if api_key.org_id != request.organization_id {
            return Err(StampError::OrganizationMismatch {
                key_org: api_key.org_id.clone(),
                request_org: request.organization_id.clone(),
            });
        }

        let activity = SignRawPayloadRequest {
            activity_type: ACTIVITY_TYPE_SIGN_RAW_PAYLOAD_V2.to_string(),
            timestamp_ms: timestamp_ms.to_string(),
            organization_id: request.organization_id.clone(),
            parameters: SignRawPayloadIntentV2Parameters {
                sign_with: request.sign_with.to_checksum(None),
                payload: request.digest.to_string(),
                encoding: PAYLOAD_ENCODING_HEXADECIMAL.to_string(),
                hash_function: HASH_FUNCTION_NO_OP.to_string(),
            },
        };

        let body = serde_json::to_string(&activity).map_err(|e| {
            StampError::SerializationError(format!("Signing serialization error: {}", e))
        })?;
        let stamp_header_value = stamp_body(&body, api_key)?;

        Ok(StampedEnvelope {
            url: format!("{}{}", self.base_url, SIGN_RAW_PAYLOAD_PATH),
            body,
            stamp: Stamp {
                stamp_header_name: STAMP_HEADER_NAME.to_string(),
                stamp_header_value,
            },
        })
    }
}

/// Creates a digital stamp over `body` for API authentication
fn stamp_body(body: &str, api_key: &ApiKeyPair) -> Result<String, StampError> {
    let private_key = api_key.private_key.expose();
    let private_api_key_bytes = hex::decode(private_key.strip_prefix("0x").unwrap_or(private_key))
        .map_err(|e| StampError::InvalidKey(format!("Failed to decode private key: {}", e)))?;
    if private_api_key_bytes.len() != 32 {
        return Err(StampError::InvalidKey(format!(
            "Private key must be 32 bytes, got {}",
            private_api_key_bytes.len()
        )));
    }

    let signing_key: SigningKey =
        SigningKey::from_bytes(FieldBytes::from_slice(&private_api_key_bytes))
            .map_err(|e| StampError::InvalidKey(format!("Invalid P-256 scalar: {}", e)))?;

    let derived_public_key = hex::encode(signing_key.verifying_key().to_encoded_point(true));
    if !derived_public_key.eq_ignore_ascii_case(api_key.public_key.trim_start_matches("0x")) {
        return Err(StampError::KeyMismatch);
    }

    let signature: P256Signature = signing_key.sign(body.as_bytes());

    let stamp = ApiStamp {
        public_key: api_key.public_key.clone(),
        scheme: STAMP_SCHEME_P256.to_string(),
        signature: hex::encode(signature.to_der()),
    };

    let json_stamp = serde_json::to_string(&stamp).map_err(|e| {
        StampError::SerializationError(format!("Serialization stamp error: {}", e))
    })?;

    Ok(base64_url_encode(json_stamp.as_bytes()))
}
