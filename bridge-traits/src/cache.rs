//! Cache Backend Abstraction
//!
//! A process-external key-value store with per-entry expiry. The core treats
//! it as advisory: losing entries only causes repeated lookups.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Key-value cache backend
///
/// # Example
///
/// ```ignore
/// use bridge_traits::cache::CacheBackend;
/// use std::time::Duration;
///
/// async fn remember(cache: &dyn CacheBackend) -> Result<()> {
///     cache.ping().await?;
///     cache.set("key", "value", Some(Duration::from_secs(60))).await?;
///     assert_eq!(cache.get("key").await?, Some("value".to_string()));
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Read a value; expired entries are reported as absent
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value. `None` means the entry never expires.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Connectivity check performed once at startup
    async fn ping(&self) -> Result<()>;
}
