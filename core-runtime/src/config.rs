//! # Sync Configuration Module
//!
//! Provides the settings model for a catalog → photo service mirror run.
//!
//! ## Overview
//!
//! Settings are assembled with a builder, either from scratch or seeded from
//! the process environment with [`SyncSettingsBuilder::from_env`]. Command
//! line flags are applied on top of the environment before
//! [`build()`](SyncSettingsBuilder::build) validates everything at once, so
//! a misconfigured run reports every problem in a single error.
//!
//! ## Environment
//!
//! | Variable              | Meaning                                   | Default        |
//! |-----------------------|-------------------------------------------|----------------|
//! | `LIGHTROOM_CATALOG`   | Path to the `.lrcat` file                 | required       |
//! | `IMMICH_API_URL`      | API base URL (`https://host/api`)         | required       |
//! | `IMMICH_API_KEY`      | API key                                   | required       |
//! | `IDENTITY_CACHE_PATH` | SQLite file for the identity cache        | user cache dir |
//! | `IDENTITY_CACHE_TTL`  | Entry lifetime in seconds, `0` = forever  | `604800`       |
//! | `BATCH_SIZE`          | Max assets per membership-add call        | `500`          |
//! | `DRY_RUN`             | `1` previews without writing              | `0`            |
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::SyncSettingsBuilder;
//!
//! let settings = SyncSettingsBuilder::from_env()
//!     .dry_run(true)
//!     .collection_filter("family")
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::logging::redact_if_sensitive;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_CATALOG: &str = "LIGHTROOM_CATALOG";
pub const ENV_API_URL: &str = "IMMICH_API_URL";
pub const ENV_API_KEY: &str = "IMMICH_API_KEY";
pub const ENV_CACHE_PATH: &str = "IDENTITY_CACHE_PATH";
pub const ENV_CACHE_TTL: &str = "IDENTITY_CACHE_TTL";
/// Older name for [`ENV_CACHE_TTL`]; read only when that one is unset.
pub const ENV_CACHE_TTL_ALIAS: &str = "REDIS_CACHE_TTL";
pub const ENV_BATCH_SIZE: &str = "BATCH_SIZE";
pub const ENV_DRY_RUN: &str = "DRY_RUN";

/// 7 days
pub const DEFAULT_CACHE_TTL_SECS: u64 = 604_800;
pub const DEFAULT_BATCH_SIZE: usize = 500;
pub const DEFAULT_SEARCH_PAGE_SIZE: u32 = 100;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Validated settings for one mirror run.
#[derive(Clone)]
pub struct SyncSettings {
    /// Path to the Lightroom catalog (`.lrcat`)
    pub catalog_path: PathBuf,

    /// Immich API base URL without trailing slash
    pub api_url: String,

    /// Immich API key
    pub api_key: String,

    /// SQLite file backing the identity cache
    pub cache_path: PathBuf,

    /// Cache entry lifetime; `None` means entries never expire
    pub cache_ttl: Option<Duration>,

    /// Run without the identity cache when it cannot be reached
    pub allow_missing_cache: bool,

    /// Max asset ids per membership-add call
    pub batch_size: usize,

    /// Page size for filename searches
    pub search_page_size: u32,

    /// Preview changes without writing to the remote service
    pub dry_run: bool,

    /// Case-insensitive substring filter on album names
    pub collection_filter: Option<String>,

    /// Per-request HTTP timeout
    pub http_timeout: Duration,
}

impl std::fmt::Debug for SyncSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSettings")
            .field("catalog_path", &self.catalog_path)
            .field("api_url", &self.api_url)
            .field("api_key", &redact_if_sensitive("api_key", &self.api_key))
            .field("cache_path", &self.cache_path)
            .field("cache_ttl", &self.cache_ttl)
            .field("allow_missing_cache", &self.allow_missing_cache)
            .field("batch_size", &self.batch_size)
            .field("search_page_size", &self.search_page_size)
            .field("dry_run", &self.dry_run)
            .field("collection_filter", &self.collection_filter)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl SyncSettings {
    /// Creates a new builder for constructing `SyncSettings`.
    pub fn builder() -> SyncSettingsBuilder {
        SyncSettingsBuilder::default()
    }

    /// Cache TTL from seconds; `0` disables expiry.
    pub fn ttl_from_secs(secs: u64) -> Option<Duration> {
        if secs == 0 {
            None
        } else {
            Some(Duration::from_secs(secs))
        }
    }
}

/// Builder for [`SyncSettings`].
///
/// Values that fail to parse from the environment are remembered and
/// reported by [`build()`](SyncSettingsBuilder::build) alongside any
/// missing required values.
#[derive(Debug, Default, Clone)]
pub struct SyncSettingsBuilder {
    catalog_path: Option<PathBuf>,
    api_url: Option<String>,
    api_key: Option<String>,
    cache_path: Option<PathBuf>,
    cache_ttl_secs: Option<u64>,
    allow_missing_cache: bool,
    batch_size: Option<usize>,
    search_page_size: Option<u32>,
    dry_run: bool,
    collection_filter: Option<String>,
    http_timeout: Option<Duration>,
    parse_errors: Vec<String>,
}

impl SyncSettingsBuilder {
    /// Seed a builder from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Seed a builder from an arbitrary variable lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = get(ENV_CATALOG) {
            builder.catalog_path = Some(PathBuf::from(path));
        }
        builder.api_url = get(ENV_API_URL);
        builder.api_key = get(ENV_API_KEY);
        if let Some(path) = get(ENV_CACHE_PATH) {
            builder.cache_path = Some(PathBuf::from(path));
        }
        let ttl = get(ENV_CACHE_TTL)
            .map(|raw| (ENV_CACHE_TTL, raw))
            .or_else(|| get(ENV_CACHE_TTL_ALIAS).map(|raw| (ENV_CACHE_TTL_ALIAS, raw)));
        if let Some((name, raw)) = ttl {
            match raw.trim().parse::<u64>() {
                Ok(secs) => builder.cache_ttl_secs = Some(secs),
                Err(_) => builder
                    .parse_errors
                    .push(format!("{} must be a non-negative integer, got '{}'", name, raw)),
            }
        }
        if let Some(raw) = get(ENV_BATCH_SIZE) {
            match raw.trim().parse::<usize>() {
                Ok(size) => builder.batch_size = Some(size),
                Err(_) => builder
                    .parse_errors
                    .push(format!("{} must be a positive integer, got '{}'", ENV_BATCH_SIZE, raw)),
            }
        }
        builder.dry_run = get(ENV_DRY_RUN).map(|v| v.trim() == "1").unwrap_or(false);

        builder
    }

    pub fn catalog_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.catalog_path = Some(path.into());
        self
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn cache_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Cache TTL in seconds; `0` disables expiry.
    pub fn cache_ttl_secs(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = Some(secs);
        self
    }

    pub fn allow_missing_cache(mut self, allow: bool) -> Self {
        self.allow_missing_cache = allow;
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }

    pub fn search_page_size(mut self, size: u32) -> Self {
        self.search_page_size = Some(size);
        self
    }

    /// Enables preview mode. Never turns off a preview requested by the environment.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = self.dry_run || dry_run;
        self
    }

    pub fn collection_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        self.collection_filter = if filter.trim().is_empty() {
            None
        } else {
            Some(filter)
        };
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    /// Builds the final `SyncSettings` instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSettings`] listing every problem found:
    /// - Catalog path, API URL or API key missing
    /// - API URL not http(s)
    /// - Batch size or page size of zero
    /// - Unparseable numeric environment values
    /// - No cache path given and no user cache directory available
    pub fn build(self) -> Result<SyncSettings> {
        let mut errors = self.parse_errors;

        let catalog_path = self.catalog_path.filter(|p| !p.as_os_str().is_empty());
        if catalog_path.is_none() {
            errors.push(format!(
                "Lightroom catalog path is required (set {} or use --catalog)",
                ENV_CATALOG
            ));
        }

        let api_url = self
            .api_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        match &api_url {
            None => errors.push(format!("{} environment variable is required", ENV_API_URL)),
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                errors.push(format!("{} must start with http:// or https://", ENV_API_URL))
            }
            Some(_) => {}
        }

        let api_key = self.api_key.filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            errors.push(format!("{} environment variable is required", ENV_API_KEY));
        }

        let batch_size = self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
        if batch_size == 0 {
            errors.push("Batch size must be greater than 0".to_string());
        }

        let search_page_size = self.search_page_size.unwrap_or(DEFAULT_SEARCH_PAGE_SIZE);
        if search_page_size == 0 {
            errors.push("Search page size must be greater than 0".to_string());
        }

        let cache_path = self.cache_path.or_else(default_cache_path);
        if cache_path.is_none() {
            errors.push(format!(
                "No user cache directory available; set {} to choose a cache file",
                ENV_CACHE_PATH
            ));
        }

        match (catalog_path, api_url, api_key, cache_path) {
            (Some(catalog_path), Some(api_url), Some(api_key), Some(cache_path))
                if errors.is_empty() =>
            {
                Ok(SyncSettings {
                    catalog_path,
                    api_url,
                    api_key,
                    cache_path,
                    cache_ttl: SyncSettings::ttl_from_secs(
                        self.cache_ttl_secs.unwrap_or(DEFAULT_CACHE_TTL_SECS),
                    ),
                    allow_missing_cache: self.allow_missing_cache,
                    batch_size,
                    search_page_size,
                    dry_run: self.dry_run,
                    collection_filter: self.collection_filter,
                    http_timeout: self
                        .http_timeout
                        .unwrap_or(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)),
                })
            }
            _ => Err(Error::InvalidSettings(errors)),
        }
    }
}

fn default_cache_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("lr2immich").join("identity-cache.db"))
}
