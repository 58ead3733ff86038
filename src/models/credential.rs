//! Records read from the credential store.
//!
//! Both records are provisioned during onboarding by an external system and are
//! read-only here.
use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::SecretString;

/// A user onboarded into a custody organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub org_id: String,
    /// Custody-held EOA that owns the user's smart account.
    pub address: Address,
}

/// API key pair authorizing requests on behalf of an organization.
///
/// `public_key` is the compressed P-256 public key in hex and `private_key` the
/// 32-byte scalar in hex.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyPair {
    pub org_id: String,
    pub public_key: String,
    pub private_key: SecretString,
    pub created_at: DateTime<Utc>,
}

impl ApiKeyPair {
    /// Picks the most recently created key pair.
    pub fn latest<'a, I>(keys: I) -> Option<&'a ApiKeyPair>
    where
        I: IntoIterator<Item = &'a ApiKeyPair>,
    {
        keys.into_iter().max_by_key(|key| key.created_at)
    }
}
