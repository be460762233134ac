//! In-memory credential store implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::time::Instant;

use super::{CredentialStore, SaveOptions, StoreError};

struct Entry {
    value: String,
    deadline: Option<Instant>,
    tags: Vec<String>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.deadline.map(|deadline| now < deadline).unwrap_or(true)
    }
}

/// In-memory credential store.
///
/// This store is not persistent; data is lost when the process exits.
/// Expired entries are dropped lazily on the next access to their key.
///
/// # Thread Safety
///
/// This implementation uses interior mutability via `RwLock` and is
/// safe to share across threads.
pub struct MemoryStore {
    data: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.data.read().values().filter(|e| e.is_live(now)).count()
    }

    /// Whether the store holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("keys_count", &self.data.read().len())
            .finish()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        {
            let data = self.data.read();
            match data.get(key) {
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // expired
        self.data.write().retain(|k, e| k != key || e.is_live(now));
        Ok(None)
    }

    async fn save(&self, key: &str, value: &str, options: &SaveOptions) -> Result<(), StoreError> {
        let deadline = options.ttl.map(|ttl| Instant::now() + ttl);
        self.data.write().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                deadline,
                tags: options.tags.clone(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.data.write().remove(key);
        Ok(())
    }

    async fn invalidate_tag(&self, tag: &str) -> Result<usize, StoreError> {
        let now = Instant::now();
        let mut data = self.data.write();
        data.retain(|_, entry| entry.is_live(now));
        let before = data.len();
        data.retain(|_, entry| !entry.tags.iter().any(|t| t == tag));
        Ok(before - data.len())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_memory_store_save_get() {
        let store = MemoryStore::new();

        store
            .save("test-key", "test-value", &SaveOptions::default())
            .await
            .unwrap();
        let retrieved = store.get("test-key").await.unwrap();

        assert_eq!(retrieved.as_deref(), Some("test-value"));
    }

    #[tokio::test]
    async fn test_memory_store_get_nonexistent() {
        let store = MemoryStore::new();
        let result = store.get("nonexistent").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_store_entry_expires_after_ttl() {
        let store = MemoryStore::new();
        let options = SaveOptions::with_ttl(Duration::from_secs(10));

        store.save("token", "abc", &options).await.unwrap();
        assert!(store.exists("token").await.unwrap());

        tokio::time::advance(Duration::from_secs(9)).await;
        assert_eq!(store.get("token").await.unwrap().as_deref(), Some("abc"));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(store.get("token").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_store_zero_ttl_is_never_readable() {
        let store = MemoryStore::new();
        let options = SaveOptions::with_ttl(Duration::ZERO);

        store.save("token", "abc", &options).await.unwrap();
        assert!(store.get("token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_overwrite_last_write_wins() {
        let store = MemoryStore::new();
        let options = SaveOptions::default();

        store.save("token", "first", &options).await.unwrap();
        store.save("token", "second", &options).await.unwrap();

        assert_eq!(store.get("token").await.unwrap().as_deref(), Some("second"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_delete() {
        let store = MemoryStore::new();

        store
            .save("test-key", "test-value", &SaveOptions::default())
            .await
            .unwrap();
        store.delete("test-key").await.unwrap();

        assert!(store.get("test-key").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_invalidate_tag() {
        let store = MemoryStore::new();
        let tagged = SaveOptions::default().tagged("access_token");

        store.save("a", "1", &tagged).await.unwrap();
        store.save("b", "2", &tagged).await.unwrap();
        store.save("c", "3", &SaveOptions::default()).await.unwrap();

        let removed = store.invalidate_tag("access_token").await.unwrap();
        assert_eq!(removed, 2);
        assert!(store.get("a").await.unwrap().is_none());
        assert!(store.get("b").await.unwrap().is_none());
        assert_eq!(store.get("c").await.unwrap().as_deref(), Some("3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_store_invalidate_tag_skips_expired_entries() {
        let store = MemoryStore::new();
        let short = SaveOptions::with_ttl(Duration::from_secs(5)).tagged("access_token");
        let long = SaveOptions::with_ttl(Duration::from_secs(60)).tagged("access_token");

        store.save("a", "1", &short).await.unwrap();
        store.save("b", "2", &long).await.unwrap();

        tokio::time::advance(Duration::from_secs(10)).await;

        let removed = store.invalidate_tag("access_token").await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.is_empty());
    }
}
