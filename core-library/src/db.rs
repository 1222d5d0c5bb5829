//! # Catalog Connection Pool Module
//!
//! Opens a Lightroom Classic catalog (`.lrcat`, a SQLite file) for reading.
//!
//! ## Features
//!
//! - **Read-only**: The catalog is never written; no file is created when the
//!   path is wrong
//! - **Busy timeout**: Lightroom may hold the catalog open; reads wait instead
//!   of failing immediately
//! - **Statement Caching**: Automatic prepared statement caching
//! - **Schema Check**: Verifies the file looks like a catalog before use
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_library::db::{CatalogDbConfig, open_catalog_pool};
//!
//! let pool = open_catalog_pool(CatalogDbConfig::new("/photos/Master.lrcat")).await?;
//! ```

use crate::{LibraryError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Tables every supported catalog must contain
const REQUIRED_TABLES: &[&str] = &[
    "AgLibraryCollection",
    "AgLibraryCollectionImage",
    "Adobe_images",
    "AgLibraryFile",
];

/// Connection configuration for a catalog file
#[derive(Debug, Clone)]
pub struct CatalogDbConfig {
    /// Path to the `.lrcat` file
    pub path: PathBuf,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Maximum time to wait for a connection from the pool
    pub acquire_timeout: Duration,

    /// How long a statement waits on a lock held by Lightroom
    pub busy_timeout: Duration,

    /// Enable statement caching (number of statements to cache)
    pub statement_cache_capacity: usize,
}

impl CatalogDbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_connections: 2,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            statement_cache_capacity: 50,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }
}

/// Open a read-only pool over the catalog and verify its schema.
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist
/// - SQLite cannot open it
/// - Any of the catalog tables is missing
pub async fn open_catalog_pool(config: CatalogDbConfig) -> Result<SqlitePool> {
    if !config.path.is_file() {
        return Err(LibraryError::CatalogNotFound(config.path));
    }

    info!(
        catalog = %config.path.display(),
        max_connections = config.max_connections,
        "Opening catalog"
    );

    let connect_options = SqliteConnectOptions::new()
        .filename(&config.path)
        .read_only(true)
        .create_if_missing(false)
        .busy_timeout(config.busy_timeout)
        .statement_cache_capacity(config.statement_cache_capacity);

    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_with(connect_options)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to open catalog");
            LibraryError::Database(e)
        })?;

    verify_schema(&pool).await?;

    Ok(pool)
}

/// Check that the catalog tables this crate reads are present.
pub async fn verify_schema(pool: &SqlitePool) -> Result<()> {
    debug!("Verifying catalog schema");

    for table in REQUIRED_TABLES {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(table)
                .fetch_one(pool)
                .await?;

        if count == 0 {
            warn!(table, "Catalog table missing");
            return Err(LibraryError::InvalidCatalog(format!(
                "missing table {}",
                table
            )));
        }
    }

    debug!("Catalog schema check passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_reported() {
        let path = std::env::temp_dir().join("lr2immich-does-not-exist.lrcat");
        let err = open_catalog_pool(CatalogDbConfig::new(&path)).await.unwrap_err();
        assert!(matches!(err, LibraryError::CatalogNotFound(p) if p == path));
    }

    #[tokio::test]
    async fn test_schema_check_rejects_foreign_database() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query("CREATE TABLE notes (id TEXT PRIMARY KEY)")
            .execute(&pool)
            .await
            .unwrap();

        let err = verify_schema(&pool).await.unwrap_err();
        assert!(matches!(err, LibraryError::InvalidCatalog(msg) if msg.contains("AgLibraryCollection")));
    }

    #[test]
    fn test_config_builder() {
        let config = CatalogDbConfig::new("/photos/Master.lrcat")
            .max_connections(4)
            .busy_timeout(Duration::from_secs(1));

        assert_eq!(config.max_connections, 4);
        assert_eq!(config.busy_timeout, Duration::from_secs(1));
        assert_eq!(config.path, PathBuf::from("/photos/Master.lrcat"));
    }
}
