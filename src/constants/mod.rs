//! Constants shared across the service.
mod account_abstraction;
pub use account_abstraction::*;

mod http_client;
pub use http_client::*;

mod logging;
pub use logging::*;

mod server;
pub use server::*;

mod turnkey;
pub use turnkey::*;
