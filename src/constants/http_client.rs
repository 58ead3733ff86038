/// Default HTTP client connection timeout in seconds.
/// Maximum time to wait for establishing a connection.
pub const DEFAULT_HTTP_CLIENT_CONNECT_TIMEOUT_SECONDS: u64 = 2;

/// Default total timeout in seconds for a single call to the signing relay or
/// the submission relay.
pub const DEFAULT_RELAY_TIMEOUT_SECONDS: u64 = 30;

/// Default maximum number of idle connections per host in the connection pool.
pub const DEFAULT_HTTP_CLIENT_POOL_MAX_IDLE_PER_HOST: usize = 25;

/// Default HTTP client pool idle timeout in seconds.
/// Time after which idle connections are closed.
pub const DEFAULT_HTTP_CLIENT_POOL_IDLE_TIMEOUT_SECONDS: u64 = 30;

/// Base URL of the Alchemy signer relay.
pub const DEFAULT_SIGNER_RELAY_URL: &str = "https://api.g.alchemy.com";

/// Path of the sign-payload endpoint on the signer relay.
pub const SIGN_PAYLOAD_PATH: &str = "/signer/v1/sign-payload";
