//! Cache-backed implementation of the [`TokenManager`] trait.
//!
//! This module provides [`CachedTokenManager`], which serves gateway tokens
//! from a [`CredentialStore`] and falls back to a [`TokenFetcher`] when the
//! cache has nothing usable.
//!
//! # Behavior
//!
//! - A cache hit returns the stored token without contacting the gateway
//! - A miss, an undecodable entry or a failed read triggers one fetch
//! - Fresh tokens are written back with a TTL equal to the time remaining
//!   until their expiry, tagged [`ACCESS_TOKEN_TAG`]
//! - A failed write is returned as [`TokenError::Storage`]
//! - A token whose TTL is zero is handed out but not cached
//!
//! # Concurrency
//!
//! There is no locking around the miss path. Two callers that miss at the
//! same time both fetch and both write; the later write wins. Tokens issued
//! by the gateway stay valid until their own expiry, so the loser's token
//! is still usable for the call that fetched it.
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn example(fetcher: impl wappin_core::TokenFetcher + 'static) -> Result<(), Box<dyn std::error::Error>> {
//! use wappin_core::{CachedTokenManager, Credential, MemoryStore, TokenManager};
//!
//! let manager = CachedTokenManager::new(MemoryStore::new(), fetcher);
//! let credential = Credential::new("client-id", "secret-key");
//!
//! let token = manager.obtain_token(&credential).await?;
//! println!("Authorization: {}", token.authorization_header());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::{
    expiry::ttl_until,
    model::Credential,
    store::{CredentialStore, SaveOptions, StoreError},
    token::{Token, TokenError, TokenFetcher, TokenManager},
};

/// Tag attached to every cached token, for bulk invalidation.
pub const ACCESS_TOKEN_TAG: &str = "access_token";

/// Token manager that caches tokens in a [`CredentialStore`].
///
/// # Type Parameters
///
/// * `S` - The credential store holding serialized tokens
/// * `F` - The fetcher used on a cache miss
pub struct CachedTokenManager<S, F> {
    store: S,
    fetcher: F,
    cache_key: Option<String>,
    expiry_buffer: Duration,
}

impl<S: CredentialStore, F: TokenFetcher> CachedTokenManager<S, F> {
    /// Create a manager whose cache keys are derived from each credential.
    pub fn new(store: S, fetcher: F) -> Self {
        Self {
            store,
            fetcher,
            cache_key: None,
            expiry_buffer: Duration::zero(),
        }
    }

    /// Cache every token under a fixed key instead of a derived one.
    ///
    /// Only safe when the manager serves a single credential.
    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    /// Shorten the cached lifetime of each token by `buffer`.
    pub fn with_expiry_buffer(mut self, buffer: Duration) -> Self {
        self.expiry_buffer = buffer;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The key a credential's token is cached under.
    pub fn key_for(&self, credential: &Credential) -> String {
        self.cache_key
            .clone()
            .unwrap_or_else(|| credential.cache_key())
    }

    /// TTL a token would be cached with at `now`, floored at zero.
    pub fn ttl_for(&self, token: &Token, now: DateTime<Utc>) -> std::time::Duration {
        ttl_until(token.expires_at - self.expiry_buffer, now)
    }

    /// Read and decode the cached token, treating any failure as a miss.
    ///
    /// A decoded token past its expiry is also a miss, for stores that keep
    /// entries longer than the TTL they were saved with.
    async fn read_cached(&self, key: &str) -> Option<Token> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Token cache read failed for {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str::<Token>(&raw) {
            Ok(token) if token.is_expired() => {
                tracing::debug!("Cached token for {} expired at {}", key, token.expires_at);
                None
            }
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!("Discarding undecodable cached token for {}: {}", key, e);
                None
            }
        }
    }

    /// Fetch a token from the gateway and write it back to the cache.
    async fn fetch_and_store(
        &self,
        credential: &Credential,
        key: &str,
    ) -> Result<Token, TokenError> {
        let token = self.fetcher.fetch_token(credential).await?;

        let ttl = self.ttl_for(&token, Utc::now());
        if ttl.is_zero() {
            tracing::warn!(
                "Token for {} expires at {}, not caching it",
                credential.identifier(),
                token.expires_at
            );
            return Ok(token);
        }

        let raw = serde_json::to_string(&token).map_err(StoreError::from)?;
        let options = SaveOptions::with_ttl(ttl).tagged(ACCESS_TOKEN_TAG);
        self.store.save(key, &raw, &options).await?;

        tracing::debug!(
            "Cached token for {} for {}s",
            credential.identifier(),
            ttl.as_secs()
        );

        Ok(token)
    }
}

#[async_trait]
impl<S, F> TokenManager for CachedTokenManager<S, F>
where
    S: CredentialStore + 'static,
    F: TokenFetcher + 'static,
{
    async fn obtain_token(&self, credential: &Credential) -> Result<Token, TokenError> {
        let key = self.key_for(credential);

        if let Some(token) = self.read_cached(&key).await {
            tracing::debug!("Using cached token for {}", credential.identifier());
            return Ok(token);
        }

        tracing::info!("No cached token for {}, fetching", credential.identifier());
        self.fetch_and_store(credential, &key).await
    }

    async fn refresh_token(&self, credential: &Credential) -> Result<Token, TokenError> {
        let key = self.key_for(credential);

        tracing::info!("Forcing token refresh for {}", credential.identifier());
        self.fetch_and_store(credential, &key).await
    }

    async fn invalidate(&self, credential: &Credential) -> Result<(), TokenError> {
        let key = self.key_for(credential);
        self.store.delete(&key).await?;

        tracing::info!("Invalidated cached token for {}", credential.identifier());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryStore;

    /// Store wrapper that counts reads and writes.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        reads: AtomicUsize,
        writes: AtomicUsize,
        fail_reads: bool,
        fail_writes: bool,
    }

    #[async_trait]
    impl CredentialStore for CountingStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail_reads {
                return Err(StoreError::BackendError {
                    message: "read refused".to_string(),
                });
            }
            self.inner.get(key).await
        }

        async fn save(
            &self,
            key: &str,
            value: &str,
            options: &SaveOptions,
        ) -> Result<(), StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes {
                return Err(StoreError::BackendError {
                    message: "write refused".to_string(),
                });
            }
            self.inner.save(key, value, options).await
        }

        async fn delete(&self, key: &str) -> Result<(), StoreError> {
            self.inner.delete(key).await
        }

        async fn invalidate_tag(&self, tag: &str) -> Result<usize, StoreError> {
            self.inner.invalidate_tag(tag).await
        }
    }

    /// Fetcher that hands out numbered tokens.
    struct StubFetcher {
        calls: Arc<AtomicUsize>,
        lifetime: Duration,
        fail: bool,
    }

    impl StubFetcher {
        fn new(lifetime: Duration) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    calls: calls.clone(),
                    lifetime,
                    fail: false,
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl TokenFetcher for StubFetcher {
        async fn fetch_token(&self, _credential: &Credential) -> Result<Token, TokenError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(TokenError::Authentication {
                    status: "401".to_string(),
                    message: "Invalid credential".to_string(),
                });
            }
            Ok(Token::new(format!("token-{}", n), Utc::now() + self.lifetime))
        }
    }

    fn credential() -> Credential {
        Credential::new("client-1", "secret-key")
    }

    #[tokio::test]
    async fn test_hit_reads_once_and_skips_gateway() {
        let (fetcher, calls) = StubFetcher::new(Duration::hours(1));
        let manager = CachedTokenManager::new(CountingStore::default(), fetcher);

        let cached = Token::new("cached-token", Utc::now() + Duration::hours(1));
        manager
            .store()
            .inner
            .save(
                &credential().cache_key(),
                &serde_json::to_string(&cached).unwrap(),
                &SaveOptions::default(),
            )
            .await
            .unwrap();

        let token = manager.obtain_token(&credential()).await.unwrap();

        assert_eq!(token, cached);
        assert_eq!(manager.store().reads.load(Ordering::SeqCst), 1);
        assert_eq!(manager.store().writes.load(Ordering::SeqCst), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_miss_fetches_once_and_writes_once() {
        let (fetcher, calls) = StubFetcher::new(Duration::hours(1));
        let manager = CachedTokenManager::new(CountingStore::default(), fetcher);

        let token = manager.obtain_token(&credential()).await.unwrap();

        assert_eq!(token.access_token.expose(), "token-1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(manager.store().writes.load(Ordering::SeqCst), 1);

        // second call is served from the cache
        let again = manager.obtain_token(&credential()).await.unwrap();
        assert_eq!(again, token);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cached_entry_carries_ttl_and_tag() {
        let (fetcher, _) = StubFetcher::new(Duration::hours(1));
        let manager = CachedTokenManager::new(MemoryStore::new(), fetcher);

        manager.obtain_token(&credential()).await.unwrap();
        assert!(manager.store().exists(&credential().cache_key()).await.unwrap());

        let removed = manager.store().invalidate_tag(ACCESS_TOKEN_TAG).await.unwrap();
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss() {
        let (fetcher, calls) = StubFetcher::new(Duration::hours(1));
        let manager = CachedTokenManager::new(MemoryStore::new(), fetcher);

        manager
            .store()
            .save(&credential().cache_key(), "not json", &SaveOptions::default())
            .await
            .unwrap();

        let token = manager.obtain_token(&credential()).await.unwrap();
        assert_eq!(token.access_token.expose(), "token-1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let (fetcher, calls) = StubFetcher::new(Duration::hours(1));
        let manager = CachedTokenManager::new(MemoryStore::new(), fetcher);

        // saved without a TTL, so only the token's own expiry applies
        let stale = Token::new("stale-token", Utc::now() - Duration::minutes(1));
        manager
            .store()
            .save(
                &credential().cache_key(),
                &serde_json::to_string(&stale).unwrap(),
                &SaveOptions::default(),
            )
            .await
            .unwrap();

        let token = manager.obtain_token(&credential()).await.unwrap();
        assert_eq!(token.access_token.expose(), "token-1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_read_error_is_a_miss() {
        let (fetcher, calls) = StubFetcher::new(Duration::hours(1));
        let store = CountingStore {
            fail_reads: true,
            ..Default::default()
        };
        let manager = CachedTokenManager::new(store, fetcher);

        let token = manager.obtain_token(&credential()).await.unwrap();
        assert_eq!(token.access_token.expose(), "token-1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_write_error_is_surfaced() {
        let (fetcher, _) = StubFetcher::new(Duration::hours(1));
        let store = CountingStore {
            fail_writes: true,
            ..Default::default()
        };
        let manager = CachedTokenManager::new(store, fetcher);

        let result = manager.obtain_token(&credential()).await;
        assert!(matches!(result, Err(TokenError::Storage(_))));
    }

    #[tokio::test]
    async fn test_expired_token_is_returned_but_not_cached() {
        let (fetcher, calls) = StubFetcher::new(Duration::seconds(-30));
        let manager = CachedTokenManager::new(CountingStore::default(), fetcher);

        let token = manager.obtain_token(&credential()).await.unwrap();
        assert_eq!(token.access_token.expose(), "token-1");
        assert_eq!(manager.store().writes.load(Ordering::SeqCst), 0);

        manager.obtain_token(&credential()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_error_propagates_without_write() {
        let (mut fetcher, _) = StubFetcher::new(Duration::hours(1));
        fetcher.fail = true;
        let manager = CachedTokenManager::new(CountingStore::default(), fetcher);

        let result = manager.obtain_token(&credential()).await;
        assert!(matches!(result, Err(TokenError::Authentication { .. })));
        assert_eq!(manager.store().writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_refresh_bypasses_cache_and_overwrites() {
        let (fetcher, calls) = StubFetcher::new(Duration::hours(1));
        let manager = CachedTokenManager::new(CountingStore::default(), fetcher);

        let first = manager.obtain_token(&credential()).await.unwrap();
        let refreshed = manager.refresh_token(&credential()).await.unwrap();

        assert_ne!(first, refreshed);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(manager.store().reads.load(Ordering::SeqCst), 1);

        let served = manager.obtain_token(&credential()).await.unwrap();
        assert_eq!(served, refreshed);
    }

    #[tokio::test]
    async fn test_invalidate_forces_next_fetch() {
        let (fetcher, calls) = StubFetcher::new(Duration::hours(1));
        let manager = CachedTokenManager::new(MemoryStore::new(), fetcher);

        manager.obtain_token(&credential()).await.unwrap();
        manager.invalidate(&credential()).await.unwrap();
        manager.obtain_token(&credential()).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fixed_cache_key_overrides_derived_key() {
        let (fetcher, _) = StubFetcher::new(Duration::hours(1));
        let manager =
            CachedTokenManager::new(MemoryStore::new(), fetcher).with_cache_key("custom:key");

        manager.obtain_token(&credential()).await.unwrap();

        assert!(manager.store().exists("custom:key").await.unwrap());
        assert!(!manager.store().exists(&credential().cache_key()).await.unwrap());
    }

    #[test]
    fn test_expiry_buffer_shortens_ttl() {
        let (fetcher, _) = StubFetcher::new(Duration::hours(1));
        let manager = CachedTokenManager::new(MemoryStore::new(), fetcher)
            .with_expiry_buffer(Duration::hours(36));

        let now = Utc::now();
        let long_lived = Token::new("t", now + Duration::hours(48));
        let short_lived = Token::new("t", now + Duration::hours(24));

        assert_eq!(
            manager.ttl_for(&long_lived, now),
            std::time::Duration::from_secs(12 * 3600)
        );
        assert!(manager.ttl_for(&short_lived, now).is_zero());
    }
}
