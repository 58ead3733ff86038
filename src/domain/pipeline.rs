//! # Submission Pipeline
//!
//! One pipeline serves every contract call the relayer exposes. A request type
//! implements [`ContractCall`] to supply its organization id and call data; the
//! pipeline does the rest:
//!
//! ```text
//! Received → Validated → CredentialResolved → SignerBound → Submitted
//! ```
//!
//! Any failure stops the run. Nothing is retried.
use std::sync::Arc;

use alloy::primitives::{Address, Bytes};
use log::{error, info, warn};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::config::PipelineConfig;
use crate::domain::contract::{
    decode_get_peer_id, encode_get_peer_id, encode_register_peer, encode_submit_winners,
};
use crate::models::{ApiError, RegisterPeerRequest, RepositoryError, SubmitWinnerRequest};
use crate::repositories::CredentialStore;
use crate::services::{
    bundler::{OperationSubmitter, SubmissionError},
    signer::{DelegatedSigner, MessageSigner, SignerError},
    signing_relay::SigningTransport,
    smart_account::{SmartAccountError, SmartAccountFactory},
    turnkey::ApiKeyStamper,
};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No user for organization {0}")]
    NotFound(String),

    #[error("Credential inconsistency: {0}")]
    CredentialInconsistency(String),

    #[error("Account {0} is already registered")]
    DuplicateRegistration(Address),

    #[error("Signing relay error: {0}")]
    SigningRelay(String),

    #[error("Submission error: {0}")]
    Submission(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Credential store error: {0}")]
    Repository(String),
}

impl From<RepositoryError> for PipelineError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::OrganizationMismatch { .. } => {
                PipelineError::CredentialInconsistency(err.to_string())
            }
            other => PipelineError::Repository(other.to_string()),
        }
    }
}

impl From<SignerError> for PipelineError {
    fn from(err: SignerError) -> Self {
        match err {
            SignerError::NotImplemented(msg) => PipelineError::UnsupportedOperation(msg),
            other => PipelineError::SigningRelay(other.to_string()),
        }
    }
}

impl From<SmartAccountError> for PipelineError {
    fn from(err: SmartAccountError) -> Self {
        PipelineError::Submission(err.to_string())
    }
}

impl From<SubmissionError> for PipelineError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Signer(signer_error) => signer_error.into(),
            other => PipelineError::Submission(other.to_string()),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(_) => ApiError::BadRequest("bad request".to_string()),
            PipelineError::DuplicateRegistration(_) => {
                ApiError::BadRequest("account address already registered".to_string())
            }
            PipelineError::NotFound(_) => ApiError::NotFound("user not found".to_string()),
            PipelineError::CredentialInconsistency(_) => {
                ApiError::InternalError("api key not found".to_string())
            }
            PipelineError::SigningRelay(_)
            | PipelineError::Submission(_)
            | PipelineError::UnsupportedOperation(_)
            | PipelineError::Repository(_) => ApiError::InternalError("error".to_string()),
        }
    }
}

/// A request that ends in one call to the coordinator contract.
pub trait ContractCall: Validate + Send + Sync {
    /// Name used in logs.
    const OPERATION: &'static str;

    fn org_id(&self) -> &str;

    fn encode_call(&self) -> Bytes;

    /// Read that reveals whether `account` already holds a registration.
    fn duplicate_check(&self, _account: Address) -> Option<Bytes> {
        None
    }

    fn is_registered(&self, _response: &[u8]) -> Result<bool, PipelineError> {
        Ok(false)
    }
}

impl ContractCall for RegisterPeerRequest {
    const OPERATION: &'static str = "register_peer";

    fn org_id(&self) -> &str {
        &self.org_id
    }

    fn encode_call(&self) -> Bytes {
        encode_register_peer(&self.peer_id)
    }

    fn duplicate_check(&self, account: Address) -> Option<Bytes> {
        Some(encode_get_peer_id(account))
    }

    fn is_registered(&self, response: &[u8]) -> Result<bool, PipelineError> {
        decode_get_peer_id(response)
            .map(|peer_id| !peer_id.is_empty())
            .map_err(|e| PipelineError::Submission(format!("getPeerId: {}", e)))
    }
}

impl ContractCall for SubmitWinnerRequest {
    const OPERATION: &'static str = "submit_winners";

    fn org_id(&self) -> &str {
        &self.org_id
    }

    fn encode_call(&self) -> Bytes {
        encode_submit_winners(self.round_number, &self.winners)
    }
}

pub struct SubmissionPipeline<CS, T, F, O>
where
    CS: CredentialStore,
    T: SigningTransport + 'static,
    F: SmartAccountFactory,
    O: OperationSubmitter,
{
    credential_store: Arc<CS>,
    transport: Arc<T>,
    account_factory: Arc<F>,
    submitter: Arc<O>,
    stamper: ApiKeyStamper,
    contract_address: Address,
    reject_duplicate_peers: bool,
}

impl<CS, T, F, O> SubmissionPipeline<CS, T, F, O>
where
    CS: CredentialStore,
    T: SigningTransport + 'static,
    F: SmartAccountFactory,
    O: OperationSubmitter,
{
    pub fn new(
        config: &PipelineConfig,
        credential_store: Arc<CS>,
        transport: Arc<T>,
        account_factory: Arc<F>,
        submitter: Arc<O>,
    ) -> Self {
        Self {
            credential_store,
            transport,
            account_factory,
            submitter,
            stamper: ApiKeyStamper::new(config.turnkey_base_url.clone()),
            contract_address: config.contract_address,
            reject_duplicate_peers: config.reject_duplicate_peers,
        }
    }

    /// Runs `request` to completion and returns the submission hash.
    pub async fn run<C: ContractCall>(&self, request: C) -> Result<String, PipelineError> {
        let run_id = Uuid::new_v4();
        let result = self.execute(&request, run_id).await;

        match &result {
            Ok(hash) => info!("[{}:{}] submitted with hash {}", C::OPERATION, run_id, hash),
            Err(e) if matches!(e, PipelineError::Validation(_) | PipelineError::NotFound(_)) => {
                warn!("[{}:{}] rejected: {}", C::OPERATION, run_id, e)
            }
            Err(e) => error!("[{}:{}] failed: {}", C::OPERATION, run_id, e),
        }
        result
    }

    async fn execute<C: ContractCall>(
        &self,
        request: &C,
        run_id: Uuid,
    ) -> Result<String, PipelineError> {
        request
            .validate()
            .map_err(|e| PipelineError::Validation(e.to_string()))?;

        let org_id = request.org_id();
        info!(
            "[{}:{}] processing request for orgId {}",
            C::OPERATION,
            run_id,
            org_id
        );

        let user = self
            .credential_store
            .get_user(org_id)
            .await?
            .ok_or_else(|| PipelineError::NotFound(org_id.to_string()))?;

        let api_key = self
            .credential_store
            .get_latest_api_key(org_id)
            .await?
            .ok_or_else(|| {
                PipelineError::CredentialInconsistency(format!(
                    "no API key for organization {}",
                    org_id
                ))
            })?;

        if user.org_id != org_id || api_key.org_id != org_id {
            return Err(PipelineError::CredentialInconsistency(format!(
                "records for organization {} belong to another organization",
                org_id
            )));
        }
        info!(
            "[{}:{}] resolved user address {}",
            C::OPERATION,
            run_id,
            user.address
        );

        let signer: Arc<dyn MessageSigner> = Arc::new(DelegatedSigner::new(
            user,
            api_key,
            self.stamper.clone(),
            self.transport.clone(),
        ));

        let account = self.account_factory.derive_account(signer.address()).await?;
        info!(
            "[{}:{}] using smart account {}",
            C::OPERATION,
            run_id,
            account.address
        );

        if self.reject_duplicate_peers {
            if let Some(check) = request.duplicate_check(account.address) {
                let response = self.submitter.read(self.contract_address, check).await?;
                if request.is_registered(&response)? {
                    return Err(PipelineError::DuplicateRegistration(account.address));
                }
            }
        }

        let call_data = request.encode_call();
        let hash = self
            .submitter
            .submit(&account, signer, self.contract_address, call_data)
            .await?;

        Ok(hash)
    }
}
