//! Identity Cache Storage using SQLite

use async_trait::async_trait;
use bridge_traits::{
    cache::CacheBackend,
    error::{BridgeError, Result},
    time::{Clock, SystemClock},
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS identity_cache (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        expires_at INTEGER,
        updated_at INTEGER NOT NULL
    )
"#;

/// SQLite-backed cache backend
///
/// Persists key → value mappings in a standalone SQLite file that outlives
/// the process:
/// - Per-entry expiry (`expires_at`, NULL = never)
/// - Expired rows read as absent and are overwritten on the next `set`
/// - Async operations via sqlx
pub struct SqliteCacheBackend {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteCacheBackend {
    /// Open (or create) the cache database at the given path
    pub async fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(BridgeError::Io)?;
            }
        }

        // Convert path to string, replacing backslashes with forward slashes for SQLite URL
        let path_str = db_path.to_string_lossy().replace('\\', "/");
        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path_str))
            .map_err(|e| BridgeError::DatabaseError(format!("Invalid cache path: {}", e)))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(3));

        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to open cache: {}", e)))?;

        Self::initialize(pool, Arc::new(SystemClock)).await
    }

    /// Create an in-memory cache (for testing)
    pub async fn in_memory() -> Result<Self> {
        Self::in_memory_with_clock(Arc::new(SystemClock)).await
    }

    /// Create an in-memory cache driven by the given clock (for expiry tests)
    pub async fn in_memory_with_clock(clock: Arc<dyn Clock>) -> Result<Self> {
        // A single connection keeps every query on the same in-memory database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to open cache: {}", e)))?;

        Self::initialize(pool, clock).await
    }

    async fn initialize(pool: SqlitePool, clock: Arc<dyn Clock>) -> Result<Self> {
        sqlx::query(CREATE_TABLE)
            .execute(&pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to create table: {}", e)))?;

        debug!("Initialized identity cache store");

        Ok(Self { pool, clock })
    }

    /// Remove expired rows, returning how many were deleted
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM identity_cache WHERE expires_at IS NOT NULL AND expires_at <= ?")
            .bind(self.clock.unix_timestamp())
            .execute(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to purge cache: {}", e)))?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl CacheBackend for SqliteCacheBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value, expires_at FROM identity_cache WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to read cache: {}", e)))?;

        match row {
            Some(row) => {
                let value: String = row.get(0);
                let expires_at: Option<i64> = row.get(1);

                if matches!(expires_at, Some(at) if at <= self.clock.unix_timestamp()) {
                    debug!(key = key, "Cache entry expired");
                    return Ok(None);
                }

                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let now = self.clock.unix_timestamp();
        let expires_at = ttl.map(|ttl| {
            now.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX))
        });

        sqlx::query(
            r#"
            INSERT INTO identity_cache (key, value, expires_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                expires_at = excluded.expires_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(expires_at)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| BridgeError::DatabaseError(format!("Failed to write cache: {}", e)))?;

        debug!(key = key, expires_at = ?expires_at, "Stored cache entry");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| BridgeError::NotAvailable(format!("Cache unreachable: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Mutex;

    struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                now: Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            }
        }

        fn advance(&self, secs: i64) {
            let mut now = self.now.lock().unwrap();
            *now += chrono::Duration::seconds(secs);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    #[tokio::test]
    async fn test_cache_store_creation() {
        let store = SqliteCacheBackend::in_memory().await.unwrap();
        store.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_get_set_overwrite() {
        let store = SqliteCacheBackend::in_memory().await.unwrap();

        assert_eq!(store.get("lr2immich:asset:a").await.unwrap(), None);

        store.set("lr2immich:asset:a", "remote-1", None).await.unwrap();
        assert_eq!(
            store.get("lr2immich:asset:a").await.unwrap(),
            Some("remote-1".to_string())
        );

        store.set("lr2immich:asset:a", "remote-2", None).await.unwrap();
        assert_eq!(
            store.get("lr2immich:asset:a").await.unwrap(),
            Some("remote-2".to_string())
        );
    }

    #[tokio::test]
    async fn test_huge_ttl_does_not_wrap_into_the_past() {
        let store = SqliteCacheBackend::in_memory().await.unwrap();

        store
            .set("lr2immich:asset:k", "v", Some(Duration::from_secs(u64::MAX)))
            .await
            .unwrap();
        assert_eq!(
            store.get("lr2immich:asset:k").await.unwrap(),
            Some("v".to_string())
        );
        assert_eq!(store.purge_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let clock = Arc::new(ManualClock::new());
        let store = SqliteCacheBackend::in_memory_with_clock(clock.clone())
            .await
            .unwrap();

        store
            .set("short", "remote-1", Some(Duration::from_secs(60)))
            .await
            .unwrap();
        store.set("forever", "remote-2", None).await.unwrap();

        clock.advance(59);
        assert_eq!(store.get("short").await.unwrap(), Some("remote-1".to_string()));

        clock.advance(1);
        assert_eq!(store.get("short").await.unwrap(), None);
        assert_eq!(store.get("forever").await.unwrap(), Some("remote-2".to_string()));

        assert_eq!(store.purge_expired().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_open_creates_file() {
        let dir = std::env::temp_dir().join(format!("lr2immich-cache-{}", std::process::id()));
        let path = dir.join("nested").join("cache.db");

        let store = SqliteCacheBackend::open(&path).await.unwrap();
        store.set("k", "v", None).await.unwrap();
        assert!(path.exists());

        drop(store);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
