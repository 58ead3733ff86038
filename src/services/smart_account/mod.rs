//! # Smart Account Factory
//!
//! Derives the counterfactual Modular Account v2 (semi-modular variant) owned
//! by a signer. Derivation only reads chain state: the account address comes
//! from the factory's view function and deployment is left to the first user
//! operation, which carries the factory call as init code.
use std::sync::Arc;

use alloy::{
    primitives::{Address, Bytes, U256},
    sol,
    sol_types::SolCall,
};
use async_trait::async_trait;
use log::debug;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::constants::{DEFAULT_ACCOUNT_SALT, MODULAR_ACCOUNT_V2_FACTORY_ADDRESS};
use crate::services::provider::{EvmRpcTrait, JsonRpcProvider, ProviderError};

sol! {
    interface IModularAccountV2Factory {
        function getAddressSemiModular(address owner, uint256 salt) external view returns (address);
        function createSemiModularAccount(address owner, uint256 salt) external returns (address);
    }

    interface IModularAccount {
        function execute(address target, uint256 value, bytes calldata data) external payable returns (bytes memory);
    }
}

#[derive(Error, Debug)]
pub enum SmartAccountError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Failed to decode factory response: {0}")]
    Decode(String),
}

/// Handle to a smart account, deployed or not.
#[derive(Debug, Clone, PartialEq)]
pub struct SmartAccount {
    pub address: Address,
    pub owner: Address,
    pub factory: Address,
    /// `createSemiModularAccount(owner, salt)` call data.
    pub factory_data: Bytes,
    pub deployed: bool,
}

impl SmartAccount {
    /// Factory and factory data for the user operation, present only while the
    /// account has no code on chain.
    pub fn deployment(&self) -> Option<(Address, Bytes)> {
        if self.deployed {
            None
        } else {
            Some((self.factory, self.factory_data.clone()))
        }
    }

    /// Wraps a call to `target` in the account's `execute` entry point.
    pub fn encode_execute(&self, target: Address, data: Bytes) -> Bytes {
        IModularAccount::executeCall {
            target,
            value: U256::ZERO,
            data,
        }
        .abi_encode()
        .into()
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SmartAccountFactory: Send + Sync {
    /// Derives the account owned by `owner`. Repeated calls for the same owner
    /// return the same address and never write to the chain.
    async fn derive_account(&self, owner: Address) -> Result<SmartAccount, SmartAccountError>;
}

pub type DefaultProvider = JsonRpcProvider;

pub struct ModularAccountV2Factory<P = DefaultProvider>
where
    P: EvmRpcTrait,
{
    provider: Arc<P>,
    factory: Address,
    salt: U256,
}

impl<P: EvmRpcTrait> ModularAccountV2Factory<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            factory: MODULAR_ACCOUNT_V2_FACTORY_ADDRESS,
            salt: U256::from(DEFAULT_ACCOUNT_SALT),
        }
    }
}

#[async_trait]
impl<P: EvmRpcTrait> SmartAccountFactory for ModularAccountV2Factory<P> {
    async fn derive_account(&self, owner: Address) -> Result<SmartAccount, SmartAccountError> {
        let lookup = IModularAccountV2Factory::getAddressSemiModularCall {
            owner,
            salt: self.salt,
        };
        let result = self
            .provider
            .call(self.factory, lookup.abi_encode().into())
            .await?;
        let address =
            IModularAccountV2Factory::getAddressSemiModularCall::abi_decode_returns(&result, true)
                .map_err(|e| SmartAccountError::Decode(e.to_string()))?
                ._0;

        let code = self.provider.get_code(address).await?;
        debug!(
            "Derived smart account {} for owner {} (deployed: {})",
            address,
            owner,
            !code.is_empty()
        );

        let factory_data = IModularAccountV2Factory::createSemiModularAccountCall {
            owner,
            salt: self.salt,
        }
        .abi_encode()
        .into();

        Ok(SmartAccount {
            address,
            owner,
            factory: self.factory,
            factory_data,
            deployed: !code.is_empty(),
        })
    }
}
