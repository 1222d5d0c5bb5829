//! # Identity Cache
//!
//! Maps a catalog item key to the remote identifier it resolved to.
//!
//! Two implementations are chosen between once at startup:
//! - [`BackedIdentityCache`] over any [`CacheBackend`]
//! - [`NullIdentityCache`], which always misses
//!
//! Neither ever fails. A backend error on `get` is a miss and on `set` a
//! no-op; the run only gets slower.

use async_trait::async_trait;
use bridge_traits::cache::CacheBackend;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Namespace for cache keys
pub const DEFAULT_KEY_PREFIX: &str = "lr2immich:asset:";

#[async_trait]
pub trait IdentityCache: Send + Sync {
    /// Cached remote identifier for `item_key`, if any.
    async fn get(&self, item_key: &str) -> Option<String>;

    /// Remember `remote_id` for `item_key`.
    async fn set(&self, item_key: &str, remote_id: &str);

    /// Whether lookups can ever hit.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Permanent-miss cache used when no backend is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullIdentityCache;

#[async_trait]
impl IdentityCache for NullIdentityCache {
    async fn get(&self, _item_key: &str) -> Option<String> {
        None
    }

    async fn set(&self, _item_key: &str, _remote_id: &str) {}

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Cache over a key-value backend with a key prefix and entry TTL.
pub struct BackedIdentityCache {
    backend: Arc<dyn CacheBackend>,
    ttl: Option<Duration>,
    prefix: String,
    degraded: AtomicBool,
}

impl BackedIdentityCache {
    /// `ttl` of `None` stores entries without expiry.
    pub fn new(backend: Arc<dyn CacheBackend>, ttl: Option<Duration>) -> Self {
        Self {
            backend,
            ttl: ttl.filter(|d| !d.is_zero()),
            prefix: DEFAULT_KEY_PREFIX.to_string(),
            degraded: AtomicBool::new(false),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    fn key(&self, item_key: &str) -> String {
        format!("{}{}", self.prefix, item_key)
    }

    fn note_failure(&self, operation: &str, error: &dyn std::error::Error) {
        if !self.degraded.swap(true, Ordering::Relaxed) {
            warn!(operation, error = %error, "Identity cache unavailable; continuing without it");
        } else {
            debug!(operation, error = %error, "Identity cache call failed");
        }
    }
}

#[async_trait]
impl IdentityCache for BackedIdentityCache {
    async fn get(&self, item_key: &str) -> Option<String> {
        match self.backend.get(&self.key(item_key)).await {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                self.note_failure("get", &e);
                None
            }
        }
    }

    async fn set(&self, item_key: &str, remote_id: &str) {
        if let Err(e) = self.backend.set(&self.key(item_key), remote_id, self.ttl).await {
            self.note_failure("set", &e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result};
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        Backend {}

        #[async_trait]
        impl CacheBackend for Backend {
            async fn get(&self, key: &str) -> Result<Option<String>>;
            async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;
            async fn ping(&self) -> Result<()>;
        }
    }

    #[tokio::test]
    async fn test_null_cache_always_misses() {
        let cache = NullIdentityCache;
        cache.set("uuid-1", "asset-1").await;
        assert_eq!(cache.get("uuid-1").await, None);
        assert!(!cache.is_enabled());
    }

    #[tokio::test]
    async fn test_keys_are_prefixed_and_ttl_passed() {
        let mut backend = MockBackend::new();
        backend
            .expect_set()
            .withf(|key, value, ttl| {
                key == "lr2immich:asset:uuid-1"
                    && value == "asset-1"
                    && *ttl == Some(Duration::from_secs(60))
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        backend
            .expect_get()
            .with(eq("lr2immich:asset:uuid-1"))
            .times(1)
            .returning(|_| Ok(Some("asset-1".to_string())));

        let cache = BackedIdentityCache::new(Arc::new(backend), Some(Duration::from_secs(60)));
        cache.set("uuid-1", "asset-1").await;
        assert_eq!(cache.get("uuid-1").await.as_deref(), Some("asset-1"));
    }

    #[tokio::test]
    async fn test_zero_ttl_means_no_expiry() {
        let mut backend = MockBackend::new();
        backend
            .expect_set()
            .withf(|_, _, ttl| ttl.is_none())
            .times(1)
            .returning(|_, _, _| Ok(()));

        let cache = BackedIdentityCache::new(Arc::new(backend), Some(Duration::ZERO));
        cache.set("uuid-1", "asset-1").await;
    }

    #[tokio::test]
    async fn test_backend_errors_are_swallowed() {
        let mut backend = MockBackend::new();
        backend
            .expect_get()
            .returning(|_| Err(BridgeError::NotAvailable("connection refused".into())));
        backend
            .expect_set()
            .returning(|_, _, _| Err(BridgeError::DatabaseError("disk full".into())));

        let cache = BackedIdentityCache::new(Arc::new(backend), None);
        assert_eq!(cache.get("uuid-1").await, None);
        cache.set("uuid-1", "asset-1").await;
        assert_eq!(cache.get("uuid-2").await, None);
    }

    #[tokio::test]
    async fn test_custom_prefix() {
        let mut backend = MockBackend::new();
        backend
            .expect_get()
            .with(eq("test:uuid-9"))
            .returning(|_| Ok(None));

        let cache = BackedIdentityCache::new(Arc::new(backend), None).with_prefix("test:");
        assert_eq!(cache.get("uuid-9").await, None);
    }
}
