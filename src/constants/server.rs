/// Default client disconnect timeout in seconds.
/// This is the time the server waits for cleanup after a client disconnects.
pub const DEFAULT_CLIENT_DISCONNECT_TIMEOUT_SECONDS: u64 = 5;

/// Default timeout for a whole inbound request in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 60;

pub const DEFAULT_HOST: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 8080;

pub const DEFAULT_CREDENTIALS_FILE_PATH: &str = "config/credentials.json";

pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

pub const DEFAULT_REDIS_KEY_PREFIX: &str = "modal";
