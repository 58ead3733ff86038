use std::sync::Arc;
use std::time::Duration;

use color_eyre::Result;
use redis::aio::ConnectionManager;

use crate::config::ServerConfig;

/// Maximum time to wait for the initial Redis connection.
const REDIS_CONNECTION_TIMEOUT_MS: u64 = 5_000;

/// Initializes a Redis connection manager.
///
/// # Arguments
///
/// * `config` - The server configuration.
///
/// # Returns
///
/// A shared connection manager that reconnects transparently after failures.
pub async fn initialize_redis_connection(config: &ServerConfig) -> Result<Arc<ConnectionManager>> {
    let client = redis::Client::open(config.redis_url.as_str())
        .map_err(|e| eyre::eyre!("Invalid Redis URL: {}", e))?;

    let connection_manager = tokio::time::timeout(
        Duration::from_millis(REDIS_CONNECTION_TIMEOUT_MS),
        ConnectionManager::new(client),
    )
    .await
    .map_err(|_| eyre::eyre!("Timed out connecting to Redis"))?
    .map_err(|e| eyre::eyre!("Failed to connect to Redis: {}", e))?;

    Ok(Arc::new(connection_manager))
}
