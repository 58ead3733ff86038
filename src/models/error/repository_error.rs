use thiserror::Error;

/// Failures reading the credential store.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Credential store unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed credential record: {0}")]
    InvalidData(String),

    /// A record stored under one organization names another.
    #[error("Cross-organization record: requested {requested}, found {found}")]
    OrganizationMismatch { requested: String, found: String },
}
