//! # Delegated Signer
//!
//! A message signer that holds no private key. Each signature is produced by
//! stamping a `sign_raw_payload` request with the organization's API key and
//! forwarding it to a [`SigningTransport`], which returns the custody backend's
//! signature.
//!
//! ```text
//! DelegatedSigner
//!   ├── EIP-191 digest (local)
//!   ├── ApiKeyStamper::stamp (local)
//!   └── SigningTransport::submit (network)
//! ```
//!
//! Only personal-message signing is supported. Typed data and raw transactions
//! are built by the smart account layer and are rejected here.
use std::sync::Arc;

use alloy::primitives::{eip191_hash_message, Address, Bytes, B256};
use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::constants::SECP256K1_SIGNATURE_LENGTH;
use crate::models::{ApiKeyPair, UserRecord};
use crate::services::signing_relay::{AlchemySigningRelay, SigningRelayError, SigningTransport};
use crate::services::turnkey::{ApiKeyStamper, SigningRequest, StampError};

#[derive(Error, Debug)]
pub enum SignerError {
    #[error("Stamping failed: {0}")]
    Stamp(#[from] StampError),

    #[error("Signing relay failed: {0}")]
    Relay(#[from] SigningRelayError),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessageSigner: Send + Sync {
    /// Address whose key produces the signatures.
    fn address(&self) -> Address;

    /// Signs `message` under the personal-message convention and returns
    /// `r ‖ s ‖ v` with `v` in `{27, 28}`.
    async fn sign_message(&self, message: &[u8]) -> Result<Bytes, SignerError>;

    async fn sign_typed_data(
        &self,
        domain_separator: B256,
        struct_hash: B256,
    ) -> Result<Bytes, SignerError>;

    async fn sign_transaction(&self, unsigned_transaction: &[u8]) -> Result<Bytes, SignerError>;
}

pub type DefaultSigningTransport = AlchemySigningRelay;

pub struct DelegatedSigner<T = DefaultSigningTransport>
where
    T: SigningTransport,
{
    user: UserRecord,
    api_key: ApiKeyPair,
    stamper: ApiKeyStamper,
    transport: Arc<T>,
}

impl<T: SigningTransport> DelegatedSigner<T> {
    pub fn new(
        user: UserRecord,
        api_key: ApiKeyPair,
        stamper: ApiKeyStamper,
        transport: Arc<T>,
    ) -> Self {
        Self {
            user,
            api_key,
            stamper,
            transport,
        }
    }

    pub fn organization_id(&self) -> &str {
        &self.user.org_id
    }
}

#[async_trait]
impl<T: SigningTransport> MessageSigner for DelegatedSigner<T> {
    fn address(&self) -> Address {
        self.user.address
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Bytes, SignerError> {
        let request = SigningRequest {
            organization_id: self.organization_id().to_string(),
            sign_with: self.user.address,
            digest: eip191_hash_message(message),
        };

        let envelope =
            self.stamper
                .stamp(&request, &self.api_key, Utc::now().timestamp_millis())?;
        debug!(
            "Requesting delegated signature for organization {}",
            self.organization_id()
        );

        let signature = self.transport.submit(&envelope).await?;
        normalize_signature(signature)
    }

    async fn sign_typed_data(
        &self,
        _domain_separator: B256,
        _struct_hash: B256,
    ) -> Result<Bytes, SignerError> {
        Err(SignerError::NotImplemented(
            "EIP-712 typed data signing is not supported by the delegated signer".into(),
        ))
    }

    async fn sign_transaction(&self, _unsigned_transaction: &[u8]) -> Result<Bytes, SignerError> {
        Err(SignerError::NotImplemented(
            "Raw transaction signing is not supported by the delegated signer".into(),
        ))
    }
}

/// Brings the recovery byte into the `{27, 28}` form expected by EIP-191 verifiers.
fn normalize_signature(signature: Bytes) -> Result<Bytes, SignerError> {
    if signature.len() != SECP256K1_SIGNATURE_LENGTH {
        return Err(SignerError::InvalidSignature(format!(
            "expected {} bytes, got {}",
            SECP256K1_SIGNATURE_LENGTH,
            signature.len()
        )));
    }

    let mut bytes = signature.to_vec();
    bytes[64] = match bytes[64] {
        0 | 1 => bytes[64] + 27,
        27 | 28 => bytes[64],
        v => {
            return Err(SignerError::InvalidSignature(format!(
                "unexpected recovery id {}",
                v
            )))
        }
    };

    Ok(Bytes::from(bytes))
}
