//! JSON-RPC provider for the chain node and the ERC-4337 bundler.
//!
//! Alchemy serves both the standard `eth_*` namespace and the bundler methods
//! from the same endpoint, so one client covers contract reads and user
//! operation submission.
use std::{borrow::Cow, time::Duration};

use alloy::{
    primitives::{Address, Bytes},
    providers::{Provider, ProviderBuilder, RootProvider},
    rpc::{
        client::ClientBuilder,
        types::{BlockNumberOrTag, TransactionInput, TransactionRequest},
    },
    transports::{http::Http, RpcError, TransportError, TransportErrorKind},
};
use async_trait::async_trait;
use log::debug;
use reqwest::ClientBuilder as ReqwestClientBuilder;
use serde_json::Value;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::constants::{
    DEFAULT_HTTP_CLIENT_CONNECT_TIMEOUT_SECONDS, DEFAULT_HTTP_CLIENT_POOL_IDLE_TIMEOUT_SECONDS,
    DEFAULT_HTTP_CLIENT_POOL_MAX_IDLE_PER_HOST,
};

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Request timeout")]
    Timeout,
    #[error("Request error (HTTP {status_code}): {error}")]
    RequestError { error: String, status_code: u16 },
    #[error("JSON-RPC error (code {code}): {message}{}", data_suffix(.data))]
    RpcErrorCode {
        code: i64,
        message: String,
        /// Revert payload attached by the node, usually hex encoded.
        data: Option<String>,
    },
    #[error("Transport error: {0}")]
    TransportError(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Network configuration error: {0}")]
    NetworkConfiguration(String),
}

fn data_suffix(data: &Option<String>) -> String {
    data.as_deref()
        .map(|d| format!(" [data: {d}]"))
        .unwrap_or_default()
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::TransportError(err.to_string())
        }
    }
}

impl From<TransportError> for ProviderError {
    fn from(err: TransportError) -> Self {
        match err {
            RpcError::ErrorResp(payload) => ProviderError::RpcErrorCode {
                code: payload.code,
                message: payload.message.to_string(),
                data: payload.data.map(|raw| {
                    serde_json::from_str::<String>(raw.get())
                        .unwrap_or_else(|_| raw.get().to_string())
                }),
            },
            RpcError::Transport(TransportErrorKind::HttpError(http)) => {
                ProviderError::RequestError {
                    error: http.body,
                    status_code: http.status,
                }
            }
            RpcError::Transport(TransportErrorKind::Custom(custom)) => {
                match custom.downcast::<reqwest::Error>() {
                    Ok(reqwest_err) => ProviderError::from(*reqwest_err),
                    Err(other) => ProviderError::TransportError(other.to_string()),
                }
            }
            RpcError::Transport(kind) => ProviderError::TransportError(kind.to_string()),
            RpcError::NullResp => {
                ProviderError::InvalidResponse("server returned a null response".to_string())
            }
            RpcError::DeserError { err, text } => {
                debug!("Undecodable JSON-RPC response: {}", text);
                ProviderError::InvalidResponse(err.to_string())
            }
            other => ProviderError::TransportError(other.to_string()),
        }
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait EvmRpcTrait: Send + Sync {
    /// `eth_call` against the latest block.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError>;

    /// Deployed bytecode at `address`, empty when no contract exists.
    async fn get_code(&self, address: Address) -> Result<Bytes, ProviderError>;

    /// Sends an arbitrary JSON-RPC request and returns its `result`.
    async fn raw_request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;
}

pub struct JsonRpcProvider {
    provider: RootProvider<Http<reqwest::Client>>,
}

impl std::fmt::Debug for JsonRpcProvider {
    // RPC URLs embed the API key.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcProvider").finish_non_exhaustive()
    }
}

impl JsonRpcProvider {
    pub fn new(url: impl AsRef<str>, timeout_seconds: u64) -> Result<Self, ProviderError> {
        let rpc_url = url
            .as_ref()
            .parse()
            .map_err(|e| ProviderError::NetworkConfiguration(format!("Invalid URL format: {e}")))?;

        let client = ReqwestClientBuilder::new()
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
                ProviderError::NetworkConfiguration(format!("Failed to build HTTP client: {e}"))
            })?;

        let mut transport = Http::new(rpc_url);
        transport.set_client(client);

        let is_local = transport.guess_local();
        let client = ClientBuilder::default().transport(transport, is_local);

        Ok(Self {
            provider: ProviderBuilder::new().on_client(client),
        })
    }
}

#[async_trait]
impl EvmRpcTrait for JsonRpcProvider {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError> {
        let tx = TransactionRequest::default()
            .to(to)
            .input(TransactionInput::both(data));

        self.provider
            .call(&tx)
            .block(BlockNumberOrTag::Latest.into())
            .await
            .map_err(ProviderError::from)
    }

    async fn get_code(&self, address: Address) -> Result<Bytes, ProviderError> {
        self.provider
            .get_code_at(address)
            .await
            .map_err(ProviderError::from)
    }

    async fn raw_request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        debug!("JSON-RPC request {}", method);

        self.provider
            .raw_request::<_, Value>(Cow::Owned(method.to_string()), params)
            .await
            .map_err(ProviderError::from)
    }
}
