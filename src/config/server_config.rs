//! Configuration for the server, including network settings, relay credentials
//! and the credential store backend.
use std::{env, str::FromStr};

use alloy::primitives::Address;

use crate::{
    config::{ConfigError, NetworkName},
    constants::{
        DEFAULT_CREDENTIALS_FILE_PATH, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_REDIS_KEY_PREFIX,
        DEFAULT_REDIS_URL, DEFAULT_RELAY_TIMEOUT_SECONDS, DEFAULT_REQUEST_TIMEOUT_SECONDS,
        DEFAULT_SIGNER_RELAY_URL, DEFAULT_TURNKEY_BASE_URL, ENTRY_POINT_V07_ADDRESS,
    },
    models::SecretString,
};

/// Which credential store backend to read users and API keys from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStoreKind {
    /// In-memory store seeded from a JSON file at startup.
    File,
    Redis,
}

impl FromStr for CredentialStoreKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "file" | "memory" | "in-memory" => Ok(CredentialStoreKind::File),
            "redis" => Ok(CredentialStoreKind::Redis),
            other => Err(ConfigError::InvalidValue {
                field: "CREDENTIAL_STORE".to_string(),
                reason: format!("unknown backend '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The host address the server will bind to.
    pub host: String,
    /// The port number the server will listen on.
    pub port: u16,
    /// Relay API key: bearer credential for the signer relay and path key for RPC.
    pub alchemy_api_key: SecretString,
    /// Gas sponsorship policy identifier.
    pub policy_id: String,
    /// Contract receiving `registerPeer` / `submitWinners` calls.
    pub contract_address: Address,
    pub network: NetworkName,
    /// Node and bundler JSON-RPC endpoint.
    pub rpc_url: String,
    pub signer_relay_url: String,
    pub turnkey_base_url: String,
    /// Timeout applied to each call to the signing relay and the submission relay.
    pub relay_timeout_seconds: u64,
    /// Timeout applied to a whole inbound request.
    pub request_timeout_seconds: u64,
    pub credential_store: CredentialStoreKind,
    pub credentials_file_path: String,
    pub redis_url: String,
    pub redis_key_prefix: String,
    /// Read `getPeerId` before submitting a registration and reject known accounts.
    pub reject_duplicate_peers: bool,
}

/// Values the submission pipeline needs, built once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub contract_address: Address,
    pub policy_id: String,
    pub chain_id: u64,
    pub entry_point: Address,
    pub turnkey_base_url: String,
    pub reject_duplicate_peers: bool,
}

impl ServerConfig {
    /// Creates a new `ServerConfig` instance from environment variables.
    ///
    /// # Errors
    ///
    /// Fails when a required variable (`ALCHEMY_API_KEY`, `PAYMASTER_POLICY_ID`,
    /// `SMART_CONTRACT_ADDRESS`) is missing or any value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required =
            |key: &str| get(key).ok_or_else(|| ConfigError::MissingField(key.to_string()));

        let alchemy_api_key = SecretString::new(&required("ALCHEMY_API_KEY")?);
        let policy_id = required("PAYMASTER_POLICY_ID")?;

        let contract_raw = required("SMART_CONTRACT_ADDRESS")?;
        let contract_address =
            Address::from_str(contract_raw.trim()).map_err(|e| ConfigError::InvalidValue {
                field: "SMART_CONTRACT_ADDRESS".to_string(),
                reason: e.to_string(),
            })?;

        let network_raw = get("NETWORK").unwrap_or_else(|| NetworkName::GensynTestnet.to_string());
        let network = NetworkName::from_str(network_raw.trim())
            .map_err(|_| ConfigError::InvalidNetwork(network_raw.clone()))?;

        let rpc_url = get("RPC_URL").unwrap_or_else(|| network.rpc_url(alchemy_api_key.expose()));

        let credential_store = match get("CREDENTIAL_STORE") {
            Some(value) => CredentialStoreKind::from_str(&value)?,
            None => CredentialStoreKind::File,
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?,
            alchemy_api_key,
            policy_id,
            contract_address,
            network,
            rpc_url,
            signer_relay_url: get("SIGNER_RELAY_URL")
                .unwrap_or_else(|| DEFAULT_SIGNER_RELAY_URL.to_string()),
            turnkey_base_url: get("TURNKEY_BASE_URL")
                .unwrap_or_else(|| DEFAULT_TURNKEY_BASE_URL.to_string()),
            relay_timeout_seconds: parse_or(
                "RELAY_TIMEOUT_SECONDS",
                get("RELAY_TIMEOUT_SECONDS"),
                DEFAULT_RELAY_TIMEOUT_SECONDS,
            )?,
            request_timeout_seconds: parse_or(
                "REQUEST_TIMEOUT_SECONDS",
                get("REQUEST_TIMEOUT_SECONDS"),
                DEFAULT_REQUEST_TIMEOUT_SECONDS,
            )?,
            credential_store,
            credentials_file_path: get("CREDENTIALS_FILE_PATH")
                .unwrap_or_else(|| DEFAULT_CREDENTIALS_FILE_PATH.to_string()),
            redis_url: get("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
            redis_key_prefix: get("REDIS_KEY_PREFIX")
                .unwrap_or_else(|| DEFAULT_REDIS_KEY_PREFIX.to_string()),
            reject_duplicate_peers: parse_or(
                "REJECT_DUPLICATE_PEERS",
                get("REJECT_DUPLICATE_PEERS"),
                false,
            )?,
        })
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            contract_address: self.contract_address,
            policy_id: self.policy_id.clone(),
            chain_id: self.network.chain_id(),
            entry_point: ENTRY_POINT_V07_ADDRESS,
            turnkey_base_url: self.turnkey_base_url.clone(),
            reject_duplicate_peers: self.reject_duplicate_peers,
        }
    }
}

fn parse_or<T>(field: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue {
                field: field.to_string(),
                reason: e.to_string(),
            }),
        None => Ok(default),
    }
}
