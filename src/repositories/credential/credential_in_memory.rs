//! This module provides an in-memory implementation of the credential store.
//!
//! The `InMemoryCredentialStore` can be seeded from a JSON file of the form
//! `{"users": [...], "apiKeys": [...]}` using the camelCase record layout.
use crate::{
    models::{ApiKeyPair, RepositoryError, UserRecord},
    repositories::{ensure_same_organization, CredentialStore},
};

use async_trait::async_trait;
use log::info;
use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};
use tokio::sync::RwLock;

/// Layout of the seed file.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsFile {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub api_keys: Vec<ApiKeyPair>,
}

#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<String, UserRecord>>,
    api_keys: RwLock<HashMap<String, Vec<ApiKeyPair>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: CredentialsFile) -> Self {
        let mut users = HashMap::new();
        for user in records.users {
            users.insert(user.org_id.clone(), user);
        }

        let mut api_keys: HashMap<String, Vec<ApiKeyPair>> = HashMap::new();
        for key in records.api_keys {
            api_keys.entry(key.org_id.clone()).or_default().push(key);
        }

        Self {
            users: RwLock::new(users),
            api_keys: RwLock::new(api_keys),
        }
    }

    /// Loads the store from a seed file. A missing file yields an empty store.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        if !path.exists() {
            info!(
                "Credentials file {} not found, starting with an empty store",
                path.display()
            );
            return Ok(Self::new());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            RepositoryError::Unavailable(format!(
                "Failed to read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        let records: CredentialsFile = serde_json::from_str(&contents).map_err(|e| {
            RepositoryError::InvalidData(format!(
                "Failed to parse credentials file {}: {}",
                path.display(),
                e
            ))
        })?;

        info!(
            "Loaded {} users and {} api keys from {}",
            records.users.len(),
            records.api_keys.len(),
            path.display()
        );
        Ok(Self::from_records(records))
    }

    pub async fn add_user(&self, user: UserRecord) {
        let mut users = self.users.write().await;
        users.insert(user.org_id.clone(), user);
    }

    pub async fn add_api_key(&self, api_key: ApiKeyPair) {
        let mut api_keys = self.api_keys.write().await;
        api_keys
            .entry(api_key.org_id.clone())
            .or_default()
            .push(api_key);
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get_user(&self, org_id: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.get(org_id).cloned())
    }

    async fn get_latest_api_key(
        &self,
        org_id: &str,
    ) -> Result<Option<ApiKeyPair>, RepositoryError> {
        let api_keys = self.api_keys.read().await;
        let latest = api_keys
            .get(org_id)
            .and_then(|keys| ApiKeyPair::latest(keys))
            .cloned();

        if let Some(key) = &latest {
            ensure_same_organization(org_id, &key.org_id)?;
        }
        Ok(latest)
    }
}
