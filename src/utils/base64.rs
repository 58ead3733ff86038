// base64 helpers for API stamps

use base64::Engine;

/// URL-safe base64 without padding, as used in API stamps.
pub fn base64_url_encode(message: &[u8]) -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(message)
}

pub fn base64_url_decode(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(data)
}
