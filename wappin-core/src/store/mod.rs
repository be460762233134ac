//! Credential store abstraction.
//!
//! This module provides:
//! - [`Secret`] - A wrapper for sensitive values that prevents accidental logging
//! - [`CredentialStore`] - Trait for the key-value cache that holds issued tokens
//! - [`MemoryStore`] - In-process implementation with per-entry TTL
//! - [`RedisStore`] - Redis implementation (with `redis-store` feature)
//! - [`create_store`] - Helper to select a backend based on availability
//!
//! The store is a capability handed to the token manager. The crate never
//! assumes anything about persistence beyond `get` / `save` with a TTL.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use wappin_core::store::{CredentialStore, MemoryStore, SaveOptions};
//!
//! let store = MemoryStore::new();
//! let options = SaveOptions::with_ttl(Duration::from_secs(60)).tagged("access_token");
//! store.save("manager:token:wappin:client-1", "{...}", &options).await.unwrap();
//!
//! let cached = store.get("manager:token:wappin:client-1").await.unwrap();
//! assert!(cached.is_some());
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

mod memory;
#[cfg(feature = "redis-store")]
mod redis;

pub use memory::MemoryStore;
#[cfg(feature = "redis-store")]
pub use self::redis::RedisStore;

/// A secret value that prevents accidental exposure in logs.
///
/// The inner value is only accessible via [`expose()`](Secret::expose).
/// Debug and Display implementations show `[REDACTED]` instead of the value,
/// and the buffer is wiped when the secret is dropped.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Create a new secret from a string value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the secret value.
    ///
    /// Use sparingly and never log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret([REDACTED])")
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Secret {}

/// Error type for credential store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage backend encountered an error.
    #[error("backend error: {message}")]
    BackendError { message: String },

    /// Serialization or deserialization of a cached value failed.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The configured backend could not be reached.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

/// Options attached to a single [`CredentialStore::save`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// How long the entry stays readable. `None` keeps it until deleted.
    pub ttl: Option<Duration>,

    /// Tags used for bulk invalidation through [`CredentialStore::invalidate_tag`].
    pub tags: Vec<String>,
}

impl SaveOptions {
    /// Options with a TTL and no tags.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            tags: Vec::new(),
        }
    }

    /// Add a tag to these options.
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// Key-value cache that holds serialized tokens.
///
/// Implementations include:
/// - [`MemoryStore`] - in-process map, used by default and in tests
/// - [`RedisStore`] (with `redis-store` feature) - shared Redis cache
///
/// No exclusivity is provided: two writers racing on the same key both
/// succeed and the later write wins.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Retrieve a value by key.
    ///
    /// Returns `Ok(None)` if the key doesn't exist or its TTL has elapsed.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store a value at the given key, overwriting any existing entry.
    async fn save(&self, key: &str, value: &str, options: &SaveOptions) -> Result<(), StoreError>;

    /// Delete a value by key.
    ///
    /// Returns `Ok(())` even if the key didn't exist.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Delete every entry saved with `tag`. Returns how many entries were removed.
    async fn invalidate_tag(&self, tag: &str) -> Result<usize, StoreError>;

    /// Check if a key exists without returning the value.
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key).await?.is_some())
    }
}

#[async_trait]
impl<S: CredentialStore + ?Sized> CredentialStore for Box<S> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }

    async fn save(&self, key: &str, value: &str, options: &SaveOptions) -> Result<(), StoreError> {
        (**self).save(key, value, options).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key).await
    }

    async fn invalidate_tag(&self, tag: &str) -> Result<usize, StoreError> {
        (**self).invalidate_tag(tag).await
    }
}

#[async_trait]
impl<S: CredentialStore + ?Sized> CredentialStore for Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }

    async fn save(&self, key: &str, value: &str, options: &SaveOptions) -> Result<(), StoreError> {
        (**self).save(key, value, options).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key).await
    }

    async fn invalidate_tag(&self, tag: &str) -> Result<usize, StoreError> {
        (**self).invalidate_tag(tag).await
    }
}

/// Create a credential store with automatic backend selection.
///
/// # Backend Selection Logic
///
/// - If `redis_url` is set and the `redis-store` feature is enabled:
///   - Attempts to connect a [`RedisStore`]
///   - Falls back to [`MemoryStore`] with a warning if Redis is unreachable
/// - Otherwise: Returns [`MemoryStore`]
///
/// A memory store is private to the process, so every process fetches its
/// own token from the gateway.
pub async fn create_store(redis_url: Option<&str>) -> Arc<dyn CredentialStore> {
    #[cfg(feature = "redis-store")]
    if let Some(url) = redis_url {
        match RedisStore::connect(url).await {
            Ok(store) => {
                tracing::info!("Using Redis for token cache");
                return Arc::new(store);
            }
            Err(e) => {
                tracing::warn!(
                    "Redis unavailable ({}), falling back to memory store. \
                     Tokens will not be shared across processes.",
                    e
                );
            }
        }
    }

    #[cfg(not(feature = "redis-store"))]
    if redis_url.is_some() {
        tracing::warn!(
            "Redis cache requested but redis-store feature not enabled. \
             Using memory store."
        );
    }

    tracing::debug!("Using in-memory token cache");
    Arc::new(MemoryStore::new())
}
