//! Redis credential store implementation.
//!
//! Values are written with `SET ... EX`, so Redis expires cached tokens on
//! its own. Each tag is kept as a Redis set holding the keys saved under it.

use async_trait::async_trait;
use ::redis::aio::ConnectionManager;

use super::{CredentialStore, SaveOptions, StoreError};

/// Credential store backed by a shared Redis instance.
///
/// The connection manager reconnects on its own, and cloning it is cheap,
/// so every call works on a clone.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
    tag_prefix: String,
}

impl RedisStore {
    /// Connect to Redis at `url` (`redis://host:port/db`).
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        if !url.starts_with("redis://") && !url.starts_with("rediss://") {
            return Err(StoreError::Unavailable {
                message: "Redis URL must start with redis:// or rediss://".to_string(),
            });
        }

        let client = ::redis::Client::open(url).map_err(|e| StoreError::Unavailable {
            message: format!("failed to create Redis client: {}", e),
        })?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::Unavailable {
                message: format!("failed to connect to Redis: {}", e),
            })?;

        Ok(Self {
            manager,
            tag_prefix: "wappin:tag:".to_string(),
        })
    }

    /// Use a custom prefix for the sets that index tagged keys.
    pub fn with_tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tag_prefix = prefix.into();
        self
    }

    fn tag_key(&self, tag: &str) -> String {
        format!("{}{}", self.tag_prefix, tag)
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("tag_prefix", &self.tag_prefix)
            .finish()
    }
}

fn backend(e: ::redis::RedisError) -> StoreError {
    StoreError::BackendError {
        message: e.to_string(),
    }
}

#[async_trait]
impl CredentialStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.manager.clone();
        ::redis::cmd("GET")
            .arg(key)
            .query_async::<_, Option<String>>(&mut conn)
            .await
            .map_err(backend)
    }

    async fn save(&self, key: &str, value: &str, options: &SaveOptions) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();

        let mut cmd = ::redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = options.ttl {
            // Redis rejects EX 0
            if ttl.as_secs() == 0 {
                return Err(StoreError::BackendError {
                    message: format!("refusing to save {} with a zero TTL", key),
                });
            }
            cmd.arg("EX").arg(ttl.as_secs());
        }
        cmd.query_async::<_, ()>(&mut conn).await.map_err(backend)?;

        for tag in &options.tags {
            ::redis::cmd("SADD")
                .arg(self.tag_key(tag))
                .arg(key)
                .query_async::<_, ()>(&mut conn)
                .await
                .map_err(backend)?;
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        ::redis::cmd("DEL")
            .arg(key)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(backend)
    }

    async fn invalidate_tag(&self, tag: &str) -> Result<usize, StoreError> {
        let mut conn = self.manager.clone();
        let tag_key = self.tag_key(tag);

        let keys: Vec<String> = ::redis::cmd("SMEMBERS")
            .arg(&tag_key)
            .query_async(&mut conn)
            .await
            .map_err(backend)?;

        let removed = if keys.is_empty() {
            0
        } else {
            ::redis::cmd("DEL")
                .arg(&keys)
                .query_async::<_, usize>(&mut conn)
                .await
                .map_err(backend)?
        };

        ::redis::cmd("DEL")
            .arg(&tag_key)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(backend)?;

        tracing::debug!("Invalidated {} cached entries tagged {}", removed, tag);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_rejects_non_redis_url() {
        let result = RedisStore::connect("http://localhost:6379").await;
        assert!(matches!(result, Err(StoreError::Unavailable { .. })));
    }
}
