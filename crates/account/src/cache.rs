//! Local key-value cache for the customer snapshot.
//!
//! Each entry carries its own time-to-live, set by the writer. Entries are
//! only ever overwritten or expired, never invalidated by the actions.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use serde_json::Value;

/// Persistent key-value cache used for optimistic rendering.
#[async_trait]
pub trait LocalCache: Send + Sync {
    /// The value stored under `key`, if present and not expired.
    async fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key` for `ttl`, replacing any previous entry.
    async fn set(&self, value: Value, key: &str, ttl: Duration);
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    ttl: Duration,
}

/// Applies each entry's own TTL, restarting it on overwrite.
struct EntryTtl;

impl Expiry<String, CacheEntry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// [`LocalCache`] backed by a `moka` future cache.
#[derive(Clone)]
pub struct MokaLocalCache {
    cache: Cache<String, CacheEntry>,
}

impl MokaLocalCache {
    /// Create a cache holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .expire_after(EntryTtl)
            .build();

        Self { cache }
    }
}

impl std::fmt::Debug for MokaLocalCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaLocalCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

#[async_trait]
impl LocalCache for MokaLocalCache {
    async fn get(&self, key: &str) -> Option<Value> {
        self.cache.get(key).await.map(|entry| entry.value)
    }

    async fn set(&self, value: Value, key: &str, ttl: Duration) {
        self.cache
            .insert(key.to_string(), CacheEntry { value, ttl })
            .await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = MokaLocalCache::new(8);
        assert!(cache.get("customer").await.is_none());

        cache
            .set(json!({ "id": 1 }), "customer", Duration::from_secs(60))
            .await;
        assert_eq!(cache.get("customer").await, Some(json!({ "id": 1 })));
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let cache = MokaLocalCache::new(8);
        cache
            .set(json!({ "name": "A" }), "customer", Duration::from_secs(60))
            .await;
        cache
            .set(json!({ "name": "B" }), "customer", Duration::from_secs(60))
            .await;

        assert_eq!(cache.get("customer").await, Some(json!({ "name": "B" })));
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = MokaLocalCache::new(8);
        cache
            .set(json!(true), "short", Duration::from_millis(50))
            .await;
        cache
            .set(json!(true), "long", Duration::from_secs(60))
            .await;

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(cache.get("short").await.is_none());
        assert_eq!(cache.get("long").await, Some(json!(true)));
    }
}
