use serde::{Deserialize, Serialize};

/// Success body: the handle returned by the submission relay.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct SubmissionResponse {
    pub hash: String,
}

/// Failure body. Messages are fixed strings and never carry downstream detail.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
