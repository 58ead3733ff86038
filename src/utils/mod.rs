mod serde;
pub use serde::*;

mod base64;
pub use base64::*;

mod redis;
pub use redis::*;
