//! Redis-backed implementation of the credential store.
//!
//! Key layout (written by the onboarding flow):
//! - `{prefix}:user:{org_id}` - JSON [`UserRecord`]
//! - `{prefix}:apikeys:{org_id}` - JSON array of [`ApiKeyPair`]

use crate::models::{ApiKeyPair, RepositoryError, UserRecord};
use crate::repositories::redis_base::RedisRepository;
use crate::repositories::{ensure_same_organization, CredentialStore};
use async_trait::async_trait;
use log::debug;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::fmt;
use std::sync::Arc;

const USER_PREFIX: &str = "user";
const API_KEYS_PREFIX: &str = "apikeys";

#[derive(Clone)]
pub struct RedisCredentialStore {
    pub client: Arc<ConnectionManager>,
    pub key_prefix: String,
}

impl RedisRepository for RedisCredentialStore {}

impl RedisCredentialStore {
    pub fn new(
        connection_manager: Arc<ConnectionManager>,
        key_prefix: String,
    ) -> Result<Self, RepositoryError> {
        if key_prefix.is_empty() {
            return Err(RepositoryError::InvalidData(
                "Redis key prefix cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            client: connection_manager,
            key_prefix,
        })
    }

    fn user_key(&self, org_id: &str) -> String {
        format!("{}:{}:{}", self.key_prefix, USER_PREFIX, org_id)
    }

    fn api_keys_key(&self, org_id: &str) -> String {
        format!("{}:{}:{}", self.key_prefix, API_KEYS_PREFIX, org_id)
    }

    async fn get_json(&self, key: &str, context: &str) -> Result<Option<String>, RepositoryError> {
        let mut conn = self.client.as_ref().clone();
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| self.map_redis_error(e, context))
    }
}

impl fmt::Debug for RedisCredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCredentialStore")
            .field("client", &"<ConnectionManager>")
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}

#[async_trait]
impl CredentialStore for RedisCredentialStore {
    async fn get_user(&self, org_id: &str) -> Result<Option<UserRecord>, RepositoryError> {
        debug!("Fetching user record for organization {}", org_id);
        let Some(json) = self.get_json(&self.user_key(org_id), "get_user").await? else {
            return Ok(None);
        };

        let user: UserRecord = self.deserialize_entity(&json, org_id, "user")?;
        ensure_same_organization(org_id, &user.org_id)?;
        Ok(Some(user))
    }

    async fn get_latest_api_key(
        &self,
        org_id: &str,
    ) -> Result<Option<ApiKeyPair>, RepositoryError> {
        debug!("Fetching api keys for organization {}", org_id);
        let Some(json) = self
            .get_json(&self.api_keys_key(org_id), "get_latest_api_key")
            .await?
        else {
            return Ok(None);
        };

        let keys: Vec<ApiKeyPair> = self.deserialize_entity(&json, org_id, "api keys")?;
        let latest = ApiKeyPair::latest(&keys).cloned();
        if let Some(key) = &latest {
            ensure_same_organization(org_id, &key.org_id)?;
        }
        Ok(latest)
    }
}
