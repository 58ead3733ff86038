//! # Operation Submitter
//!
//! Turns a target contract call into a sponsored ERC-4337 v0.7 user operation
//! and hands it to the bundler.
//!
//! ## Flow
//!
//! ```text
//! execute(target, 0, data)
//!   → EntryPoint.getNonce(sender, key)
//!   → alchemy_requestGasAndPaymasterAndData   (gas limits + paymaster under policy)
//!   → user operation hash                     (local)
//!   → MessageSigner::sign_message(hash)       (delegated signature)
//!   → eth_sendUserOperation                   (returns the user operation hash)
//! ```
//!
//! The returned hash is a submission handle. Inclusion is not awaited and
//! nothing is retried.
use std::sync::Arc;

use alloy::{
    primitives::{aliases::U192, keccak256, Address, Bytes, B256, U256},
    sol,
    sol_types::{SolCall, SolValue},
};
use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::constants::{
    DUMMY_USER_OPERATION_SIGNATURE, FALLBACK_SIGNATURE_PREFIX, FALLBACK_VALIDATION_NONCE_KEY,
};
use crate::services::provider::{EvmRpcTrait, JsonRpcProvider, ProviderError};
use crate::services::signer::{MessageSigner, SignerError};
use crate::services::smart_account::SmartAccount;

sol! {
    interface IEntryPoint {
        function getNonce(address sender, uint192 key) external view returns (uint256 nonce);
    }
}

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Signing failed: {0}")]
    Signer(#[from] SignerError),

    #[error("Gas sponsorship request failed: {0}")]
    Sponsorship(String),

    #[error("Bundler rejected user operation: {0}")]
    Rejected(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

/// User operation in the ERC-4337 v0.7 RPC shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
    pub sender: Address,
    pub nonce: U256,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factory: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factory_data: Option<Bytes>,
    pub call_data: Bytes,
    pub call_gas_limit: U256,
    pub verification_gas_limit: U256,
    pub pre_verification_gas: U256,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paymaster: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paymaster_verification_gas_limit: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paymaster_post_op_gas_limit: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paymaster_data: Option<Bytes>,
    pub signature: Bytes,
}

/// Fields of a user operation known before sponsorship.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct PartialUserOperation {
    sender: Address,
    nonce: U256,
    call_data: Bytes,
    #[serde(skip_serializing_if = "Option::is_none")]
    factory: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    factory_data: Option<Bytes>,
}

/// Result of `alchemy_requestGasAndPaymasterAndData`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsoredGas {
    pub paymaster: Address,
    pub paymaster_data: Bytes,
    pub paymaster_verification_gas_limit: U256,
    pub paymaster_post_op_gas_limit: U256,
    pub call_gas_limit: U256,
    pub verification_gas_limit: U256,
    pub pre_verification_gas: U256,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
}

impl PartialUserOperation {
    fn sponsored(self, gas: SponsoredGas) -> UserOperation {
        UserOperation {
            sender: self.sender,
            nonce: self.nonce,
            factory: self.factory,
            factory_data: self.factory_data,
            call_data: self.call_data,
            call_gas_limit: gas.call_gas_limit,
            verification_gas_limit: gas.verification_gas_limit,
            pre_verification_gas: gas.pre_verification_gas,
            max_fee_per_gas: gas.max_fee_per_gas,
            max_priority_fee_per_gas: gas.max_priority_fee_per_gas,
            paymaster: Some(gas.paymaster),
            paymaster_verification_gas_limit: Some(gas.paymaster_verification_gas_limit),
            paymaster_post_op_gas_limit: Some(gas.paymaster_post_op_gas_limit),
            paymaster_data: Some(gas.paymaster_data),
            signature: Bytes::new(),
        }
    }
}

/// Packs two 128-bit quantities into one word, `high` in the upper half.
fn pack_u128_pair(high: U256, low: U256) -> Result<B256, SubmissionError> {
    let high = u128::try_from(high)
        .map_err(|_| SubmissionError::Encoding(format!("{} exceeds 128 bits", high)))?;
    let low = u128::try_from(low)
        .map_err(|_| SubmissionError::Encoding(format!("{} exceeds 128 bits", low)))?;

    let mut word = [0u8; 32];
    word[..16].copy_from_slice(&high.to_be_bytes());
    word[16..].copy_from_slice(&low.to_be_bytes());
    Ok(B256::from(word))
}

fn u128_bytes(value: U256) -> Result<[u8; 16], SubmissionError> {
    u128::try_from(value)
        .map(u128::to_be_bytes)
        .map_err(|_| SubmissionError::Encoding(format!("{} exceeds 128 bits", value)))
}

fn describe_rpc_failure(code: i64, message: String, data: Option<String>) -> String {
    match data {
        Some(data) => format!("{} ({}, data {})", message, code, data),
        None => format!("{} ({})", message, code),
    }
}

/// EntryPoint v0.7 user operation hash.
pub fn user_operation_hash(
    operation: &UserOperation,
    entry_point: Address,
    chain_id: u64,
) -> Result<B256, SubmissionError> {
    let mut init_code = Vec::new();
    if let Some(factory) = operation.factory {
        init_code.extend_from_slice(factory.as_slice());
        if let Some(data) = &operation.factory_data {
            init_code.extend_from_slice(data);
        }
    }

    let mut paymaster_and_data = Vec::new();
    if let Some(paymaster) = operation.paymaster {
        paymaster_and_data.extend_from_slice(paymaster.as_slice());
        paymaster_and_data.extend_from_slice(&u128_bytes(
            operation
                .paymaster_verification_gas_limit
                .unwrap_or_default(),
        )?);
        paymaster_and_data.extend_from_slice(&u128_bytes(
            operation.paymaster_post_op_gas_limit.unwrap_or_default(),
        )?);
        if let Some(data) = &operation.paymaster_data {
            paymaster_and_data.extend_from_slice(data);
        }
    }

    let account_gas_limits =
        pack_u128_pair(operation.verification_gas_limit, operation.call_gas_limit)?;
    let gas_fees = pack_u128_pair(operation.max_priority_fee_per_gas, operation.max_fee_per_gas)?;

    let packed = (
        operation.sender,
        operation.nonce,
        keccak256(&init_code),
        keccak256(&operation.call_data),
        account_gas_limits,
        operation.pre_verification_gas,
        gas_fees,
        keccak256(&paymaster_and_data),
    )
        .abi_encode();

    Ok(keccak256(
        (keccak256(&packed), entry_point, U256::from(chain_id)).abi_encode(),
    ))
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait OperationSubmitter: Send + Sync {
    /// Executes `call_data` against `target` from `account` and returns the user
    /// operation hash accepted by the bundler.
    async fn submit(
        &self,
        account: &SmartAccount,
        signer: Arc<dyn MessageSigner>,
        target: Address,
        call_data: Bytes,
    ) -> Result<String, SubmissionError>;

    /// Read-only call against `target`.
    async fn read(&self, target: Address, call_data: Bytes) -> Result<Bytes, SubmissionError>;
}

pub type DefaultProvider = JsonRpcProvider;

pub struct UserOperationSubmitter<P = DefaultProvider>
where
    P: EvmRpcTrait,
{
    provider: Arc<P>,
    entry_point: Address,
    chain_id: u64,
    policy_id: String,
}

impl<P: EvmRpcTrait> UserOperationSubmitter<P> {
    pub fn new(provider: Arc<P>, entry_point: Address, chain_id: u64, policy_id: String) -> Self {
        Self {
            provider,
            entry_point,
            chain_id,
            policy_id,
        }
    }

    async fn get_nonce(&self, sender: Address) -> Result<U256, SubmissionError> {
        let call = IEntryPoint::getNonceCall {
            sender,
            key: U192::from(FALLBACK_VALIDATION_NONCE_KEY),
        };
        let result = self
            .provider
            .call(self.entry_point, call.abi_encode().into())
            .await?;

        IEntryPoint::getNonceCall::abi_decode_returns(&result, true)
            .map(|r| r.nonce)
            .map_err(|e| SubmissionError::InvalidResponse(format!("getNonce: {}", e)))
    }

    async fn request_sponsorship(
        &self,
        operation: &PartialUserOperation,
    ) -> Result<SponsoredGas, SubmissionError> {
        let params = json!([{
            "policyId": self.policy_id,
            "entryPoint": self.entry_point,
            "dummySignature": DUMMY_USER_OPERATION_SIGNATURE,
            "userOperation": operation,
        }]);

        let result = self
            .provider
            .raw_request("alchemy_requestGasAndPaymasterAndData", params)
            .await
            .map_err(|e| match e {
                ProviderError::RpcErrorCode {
                    code,
                    message,
                    data,
                } => SubmissionError::Sponsorship(describe_rpc_failure(code, message, data)),
                other => SubmissionError::Provider(other),
            })?;

        serde_json::from_value(result)
            .map_err(|e| SubmissionError::InvalidResponse(format!("sponsorship: {}", e)))
    }
}

#[async_trait]
impl<P: EvmRpcTrait> OperationSubmitter for UserOperationSubmitter<P> {
    async fn submit(
        &self,
        account: &SmartAccount,
        signer: Arc<dyn MessageSigner>,
        target: Address,
        call_data: Bytes,
    ) -> Result<String, SubmissionError> {
        let nonce = self.get_nonce(account.address).await?;
        let (factory, factory_data) = match account.deployment() {
            Some((factory, data)) => (Some(factory), Some(data)),
            None => (None, None),
        };

        let partial = PartialUserOperation {
            sender: account.address,
            nonce,
            call_data: account.encode_execute(target, call_data),
            factory,
            factory_data,
        };

        let gas = self.request_sponsorship(&partial).await?;
        let mut operation = partial.sponsored(gas);

        let hash = user_operation_hash(&operation, self.entry_point, self.chain_id)?;
        debug!("Signing user operation {} for {}", hash, account.address);
        let signature = signer.sign_message(hash.as_slice()).await?;

        let mut encoded = FALLBACK_SIGNATURE_PREFIX.to_vec();
        encoded.extend_from_slice(&signature);
        operation.signature = Bytes::from(encoded);

        let result = self
            .provider
            .raw_request(
                "eth_sendUserOperation",
                json!([operation, self.entry_point]),
            )
            .await
            .map_err(|e| match e {
                ProviderError::RpcErrorCode {
                    code,
                    message,
                    data,
                } => SubmissionError::Rejected(describe_rpc_failure(code, message, data)),
                other => SubmissionError::Provider(other),
            })?;

        let submitted = result.as_str().map(str::to_string).ok_or_else(|| {
            SubmissionError::InvalidResponse(
                "eth_sendUserOperation result is not a string".to_string(),
            )
        })?;

        info!(
            "User operation {} submitted from {} to {}",
            submitted, account.address, target
        );
        Ok(submitted)
    }

    async fn read(&self, target: Address, call_data: Bytes) -> Result<Bytes, SubmissionError> {
        Ok(self.provider.call(target, call_data).await?)
    }
}
