//! Application state initialization
//!
//! Wires the credential store, relay clients and pipeline from an explicit
//! [`ServerConfig`].
use crate::{
    config::{CredentialStoreKind, ServerConfig},
    domain::SubmissionPipeline,
    models::{AppState, DefaultAppState},
    repositories::{CredentialStoreStorage, InMemoryCredentialStore},
    services::{
        bundler::UserOperationSubmitter, provider::JsonRpcProvider,
        signing_relay::AlchemySigningRelay, smart_account::ModularAccountV2Factory,
    },
    utils::initialize_redis_connection,
};
use actix_web::web;
use color_eyre::{eyre::WrapErr, Result};
use log::info;
use std::sync::Arc;

/// Opens the credential store selected by `CREDENTIAL_STORE`.
pub async fn initialize_credential_store(config: &ServerConfig) -> Result<CredentialStoreStorage> {
    match config.credential_store {
        CredentialStoreKind::File => {
            let store = InMemoryCredentialStore::from_file(&config.credentials_file_path)
                .wrap_err_with(|| {
                    format!(
                        "Failed to load credentials from {}",
                        config.credentials_file_path
                    )
                })?;
            info!(
                "Using in-memory credential store seeded from {}",
                config.credentials_file_path
            );
            Ok(CredentialStoreStorage::new_in_memory(store))
        }
        CredentialStoreKind::Redis => {
            let connection = initialize_redis_connection(config).await?;
            info!("Using Redis credential store at prefix {}", config.redis_key_prefix);
            CredentialStoreStorage::new_redis(connection, config.redis_key_prefix.clone())
                .wrap_err("Failed to create Redis credential store")
        }
    }
}

/// Builds the application state around an already opened credential store.
pub fn build_app_state(
    config: &ServerConfig,
    credential_store: CredentialStoreStorage,
) -> Result<DefaultAppState> {
    let pipeline_config = config.pipeline_config();

    let provider = Arc::new(
        JsonRpcProvider::new(config.rpc_url.clone(), config.relay_timeout_seconds)
            .wrap_err("Failed to create JSON-RPC provider")?,
    );
    let signing_relay = Arc::new(
        AlchemySigningRelay::new(
            config.signer_relay_url.clone(),
            config.alchemy_api_key.clone(),
            config.relay_timeout_seconds,
        )
        .wrap_err("Failed to create signing relay client")?,
    );
    let account_factory = Arc::new(ModularAccountV2Factory::new(provider.clone()));
    let submitter = Arc::new(UserOperationSubmitter::new(
        provider,
        pipeline_config.entry_point,
        pipeline_config.chain_id,
        pipeline_config.policy_id.clone(),
    ));

    let pipeline = SubmissionPipeline::new(
        &pipeline_config,
        Arc::new(credential_store),
        signing_relay,
        account_factory,
        submitter,
    );

    Ok(AppState {
        pipeline: Arc::new(pipeline),
    })
}

/// Initializes application state
///
/// # Errors
///
/// Returns error if the credential store cannot be opened or an HTTP client
/// cannot be built.
pub async fn initialize_app_state(
    server_config: Arc<ServerConfig>,
) -> Result<web::ThinData<DefaultAppState>> {
    let credential_store = initialize_credential_store(&server_config).await?;
    let app_state = build_app_state(&server_config, credential_store)?;

    Ok(web::ThinData(app_state))
}
