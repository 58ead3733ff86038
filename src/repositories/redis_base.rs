//! Helpers shared by the Redis-backed stores.
use crate::models::RepositoryError;
use log::warn;
use redis::{ErrorKind, RedisError};
use serde::de::DeserializeOwned;

pub trait RedisRepository {
    /// Parses a stored JSON record, naming the organization and record kind on failure.
    fn deserialize_entity<T: DeserializeOwned>(
        &self,
        json: &str,
        org_id: &str,
        record: &str,
    ) -> Result<T, RepositoryError> {
        serde_json::from_str(json).map_err(|e| {
            RepositoryError::InvalidData(format!("{} for organization {}: {}", record, org_id, e))
        })
    }

    fn map_redis_error(&self, error: RedisError, context: &str) -> RepositoryError {
        warn!("Redis {} failed: {}", context, error);

        match error.kind() {
            ErrorKind::TypeError => {
                RepositoryError::InvalidData(format!("unexpected Redis type in {}", context))
            }
            ErrorKind::AuthenticationFailed => {
                RepositoryError::Unavailable("Redis authentication failed".to_string())
            }
            _ => RepositoryError::Unavailable(format!("Redis {} failed: {}", context, error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Store;
    impl RedisRepository for Store {}

    #[test]
    fn test_deserialize_entity_names_the_record() {
        let err = Store
            .deserialize_entity::<Vec<String>>("{oops", "org1", "api keys")
            .unwrap_err();
        match err {
            RepositoryError::InvalidData(message) => {
                assert!(message.starts_with("api keys for organization org1"))
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_map_redis_error_kinds() {
        let type_error = RedisError::from((ErrorKind::TypeError, "wrong type"));
        assert!(matches!(
            Store.map_redis_error(type_error, "GET user"),
            RepositoryError::InvalidData(_)
        ));

        let io_error = RedisError::from((ErrorKind::IoError, "connection reset"));
        assert!(matches!(
            Store.map_redis_error(io_error, "GET user"),
            RepositoryError::Unavailable(_)
        ));
    }
}
