//! Turnkey activity and stamping constants.

pub const DEFAULT_TURNKEY_BASE_URL: &str = "https://api.turnkey.com";

pub const SIGN_RAW_PAYLOAD_PATH: &str = "/public/v1/submit/sign_raw_payload";

pub const ACTIVITY_TYPE_SIGN_RAW_PAYLOAD_V2: &str = "ACTIVITY_TYPE_SIGN_RAW_PAYLOAD_V2";

pub const PAYLOAD_ENCODING_HEXADECIMAL: &str = "PAYLOAD_ENCODING_HEXADECIMAL";

/// The payload is already a keccak digest, so the custody backend must not hash again.
pub const HASH_FUNCTION_NO_OP: &str = "HASH_FUNCTION_NO_OP";

pub const STAMP_HEADER_NAME: &str = "X-Stamp";

pub const STAMP_SCHEME_P256: &str = "SIGNATURE_SCHEME_TK_API_P256";
