//! Cache-aside support for the typeahead and resolver flows.
//!
//! A [`CacheStore`] only moves opaque text around. [`CacheAside`] sits on
//! top of it and guarantees that a slow or broken cache never fails a
//! request: every error and every timeout turns into a miss or a no-op.

use moka::Expiry;
use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Cache operation timed out after {0:?}")]
    Timeout(Duration),
}

impl From<sea_orm::DbErr> for CacheError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Key/value store with per-entry expiry.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the value unless absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Re-applies `ttl` from now to a live entry. Missing keys are ignored.
    async fn touch(&self, key: &str, ttl: Duration) -> Result<(), CacheError>;
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    ttl: Duration,
}

/// Each entry lives for the TTL it was last written with.
struct PerEntryTtl;

impl Expiry<String, MemoryEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &MemoryEntry,
        _created_at: std::time::Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &MemoryEntry,
        _updated_at: std::time::Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-process backend, the default when no cache database is configured.
/// Bounded to `max_entries`; least useful entries are evicted first.
#[derive(Clone)]
pub struct MemoryCache {
    entries: Cache<String, MemoryEntry>,
}

impl MemoryCache {
    #[must_use]
    pub fn new(max_entries: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();

        Self { entries }
    }
}

#[async_trait::async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.get(key).await.map(|e| e.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.entries
            .insert(
                key.to_string(),
                MemoryEntry {
                    value: value.to_string(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn touch(&self, key: &str, ttl: Duration) -> Result<(), CacheError> {
        if let Some(entry) = self.entries.get(key).await {
            self.entries
                .insert(
                    key.to_string(),
                    MemoryEntry {
                        value: entry.value,
                        ttl,
                    },
                )
                .await;
        }
        Ok(())
    }
}

/// Cache domain, used for key separation in logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDomain {
    Location,
    Weather,
}

impl CacheDomain {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Weather => "weather",
        }
    }
}

#[derive(Clone)]
pub struct CacheAside {
    store: Arc<dyn CacheStore>,
    operation_timeout: Duration,
}

impl CacheAside {
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>, operation_timeout: Duration) -> Self {
        Self {
            store,
            operation_timeout,
        }
    }

    async fn bounded<T>(
        &self,
        op: impl Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        tokio::time::timeout(self.operation_timeout, op)
            .await
            .map_err(|_| CacheError::Timeout(self.operation_timeout))?
    }

    /// Any failure, including an entry that no longer deserializes, is a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.bounded(self.store.get(key)).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(key, error = %e, "Discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key, error = %e, "Cache lookup failed, treating as miss");
                None
            }
        }
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "Failed to encode cache entry");
                return;
            }
        };

        if let Err(e) = self.bounded(self.store.set(key, &raw, ttl)).await {
            warn!(key, error = %e, "Cache store failed");
        }
    }

    pub async fn touch(&self, key: &str, ttl: Duration) {
        if let Err(e) = self.bounded(self.store.touch(key, ttl)).await {
            warn!(key, error = %e, "Cache touch failed");
        }
    }

    /// Returns the cached value (refreshing its TTL) or computes, stores and
    /// returns a fresh one.
    pub async fn get_or_compute<T, F, Fut>(
        &self,
        domain: CacheDomain,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if let Some(cached) = self.get_json::<T>(key).await {
            debug!(domain = domain.as_str(), key, "Cache hit");
            record_lookup(domain, "hit");
            self.touch(key, ttl).await;
            return cached;
        }

        record_lookup(domain, "miss");
        let value = compute().await;
        self.set_json(key, &value, ttl).await;
        debug!(domain = domain.as_str(), key, "Cached fresh value");
        value
    }
}

fn record_lookup(domain: CacheDomain, outcome: &'static str) {
    metrics::counter!("cache_lookups_total", "domain" => domain.as_str(), "outcome" => outcome)
        .increment(1);
}
