//! Inbound request bodies.
use alloy::primitives::U256;
use serde::Deserialize;
use validator::Validate;

use crate::utils::deserialize_u256;

/// Body of `POST /api/register-peer`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPeerRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "orgId is required"))]
    pub org_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "peerId is required"))]
    pub peer_id: String,
}

/// Body of `POST /api/submit-winner`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitWinnerRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "orgId is required"))]
    pub org_id: String,
    #[serde(deserialize_with = "deserialize_u256")]
    pub round_number: U256,
    pub winners: Vec<String>,
}
