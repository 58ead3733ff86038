//! Credential Store Module
//!
//! Lookup of the [`UserRecord`] and latest [`ApiKeyPair`] for a custody
//! organization, backed by either an in-memory map or Redis.
//!
//! ## Repository Implementations
//!
//! - [`InMemoryCredentialStore`]: seeded from a JSON file, for development and tests
//! - [`RedisCredentialStore`]: Redis-backed storage written by the onboarding flow
//!
//! Both backends are read concurrently by many requests and never write.
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::sync::Arc;

pub mod credential_in_memory;
pub mod credential_redis;

pub use credential_in_memory::*;
pub use credential_redis::*;

#[cfg(test)]
use mockall::automock;

use crate::models::{ApiKeyPair, RepositoryError, UserRecord};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the user onboarded under `org_id`, if any.
    async fn get_user(&self, org_id: &str) -> Result<Option<UserRecord>, RepositoryError>;

    /// Returns the most recently created API key pair of `org_id`, if any.
    async fn get_latest_api_key(&self, org_id: &str)
        -> Result<Option<ApiKeyPair>, RepositoryError>;
}

/// Enum wrapper for the credential store implementations
#[derive(Debug, Clone)]
pub enum CredentialStoreStorage {
    InMemory(Arc<InMemoryCredentialStore>),
    Redis(RedisCredentialStore),
}

impl CredentialStoreStorage {
    pub fn new_in_memory(store: InMemoryCredentialStore) -> Self {
        Self::InMemory(Arc::new(store))
    }

    pub fn new_redis(
        connection_manager: Arc<ConnectionManager>,
        key_prefix: String,
    ) -> Result<Self, RepositoryError> {
        let redis_repo = RedisCredentialStore::new(connection_manager, key_prefix)?;
        Ok(Self::Redis(redis_repo))
    }
}

#[async_trait]
impl CredentialStore for CredentialStoreStorage {
    async fn get_user(&self, org_id: &str) -> Result<Option<UserRecord>, RepositoryError> {
        match self {
            CredentialStoreStorage::InMemory(repo) => repo.get_user(org_id).await,
            CredentialStoreStorage::Redis(repo) => repo.get_user(org_id).await,
        }
    }

    async fn get_latest_api_key(
        &self,
        org_id: &str,
    ) -> Result<Option<ApiKeyPair>, RepositoryError> {
        match self {
            CredentialStoreStorage::InMemory(repo) => repo.get_latest_api_key(org_id).await,
            CredentialStoreStorage::Redis(repo) => repo.get_latest_api_key(org_id).await,
        }
    }
}

/// Ensures a fetched record belongs to the organization it was looked up for.
pub(crate) fn ensure_same_organization(
    requested: &str,
    found: &str,
) -> Result<(), RepositoryError> {
    if requested == found {
        Ok(())
    } else {
        Err(RepositoryError::OrganizationMismatch {
            requested: requested.to_string(),
            found: found.to_string(),
        })
    }
}
