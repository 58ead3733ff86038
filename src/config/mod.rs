//! Service configuration.
//!
//! The process environment is read once, by [`ServerConfig::from_env`]. Everything
//! downstream receives explicit values ([`PipelineConfig`], client configs).
use thiserror::Error;

mod network;
pub use network::*;

mod server_config;
pub use server_config::*;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("Invalid network name: {0}")]
    InvalidNetwork(String),
}
