//! Watering scale cache backends
//!
//! Entries live until local midnight at the watering site. Writes replace
//! whole entries; concurrent misses for the same key may both compute and
//! both write the same value.

use std::time::{Duration, Instant};

use moka::{future::Cache, Expiry};
use shared::CachedScaleEntry;

/// Key/value store for computed scales
#[axum::async_trait]
pub trait ScaleCacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<CachedScaleEntry>;

    async fn put(&self, key: String, entry: CachedScaleEntry, ttl: Duration);
}

#[derive(Clone)]
struct ExpiringEntry {
    entry: CachedScaleEntry,
    ttl: Duration,
}

struct PerEntryExpiry;

impl Expiry<String, ExpiringEntry> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &ExpiringEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &ExpiringEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process cache backed by moka
#[derive(Clone)]
pub struct MokaScaleCache {
    cache: Cache<String, ExpiringEntry>,
}

impl MokaScaleCache {
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryExpiry)
            .build();
        Self { cache }
    }
}

#[axum::async_trait]
impl ScaleCacheStore for MokaScaleCache {
    async fn get(&self, key: &str) -> Option<CachedScaleEntry> {
        self.cache.get(key).await.map(|cached| cached.entry)
    }

    async fn put(&self, key: String, entry: CachedScaleEntry, ttl: Duration) {
        self.cache.insert(key, ExpiringEntry { entry, ttl }).await;
    }
}

/// Cache used when caching is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NullScaleCache;

#[axum::async_trait]
impl ScaleCacheStore for NullScaleCache {
    async fn get(&self, _key: &str) -> Option<CachedScaleEntry> {
        None
    }

    async fn put(&self, _key: String, _entry: CachedScaleEntry, _ttl: Duration) {}
}
