//! # Modal Relayer
//!
//! Entry point: reads configuration, opens the credential store and serves
//! the `/api` routes until shutdown.
use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use color_eyre::{eyre::WrapErr, Result};
use dotenvy::dotenv;
use log::info;

use modal_relayer::{
    api::{middleware::TimeoutMiddleware, routes::configure_routes},
    bootstrap::initialize_app_state,
    config::ServerConfig,
    constants::DEFAULT_CLIENT_DISCONNECT_TIMEOUT_SECONDS,
    logging::setup_logging,
};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();
    setup_logging()?;

    let config = Arc::new(ServerConfig::from_env().wrap_err("Failed to load configuration")?);
    info!(
        "Network {} (chain {}), contract {}",
        config.network,
        config.network.chain_id(),
        config.contract_address
    );

    let app_state = initialize_app_state(config.clone()).await?;
    let request_timeout_seconds = config.request_timeout_seconds;

    info!("Starting server on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .wrap(TimeoutMiddleware::new(request_timeout_seconds))
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .service(web::scope("/api").configure(configure_routes))
    })
    .client_disconnect_timeout(std::time::Duration::from_secs(
        DEFAULT_CLIENT_DISCONNECT_TIMEOUT_SECONDS,
    ))
    .bind((config.host.as_str(), config.port))
    .wrap_err_with(|| format!("Failed to bind {}:{}", config.host, config.port))?
    .shutdown_timeout(5)
    .run()
    .await
    .wrap_err("Server terminated with an error")?;

    Ok(())
}
