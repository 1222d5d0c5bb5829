//! Core service façade and bootstrap helpers.
//!
//! This crate wires the catalog adapter, the remote photo service and the
//! identity cache into a [`SyncOrchestrator`]. Every check that must pass
//! before the first collection is touched happens in [`bootstrap`]:
//! - the catalog opens and carries the expected tables
//! - the HTTP client builds
//! - the identity cache answers a ping (unless `allow_missing_cache`)
//!
//! Desktop hosts enable the `desktop-shims` feature, which pulls in the
//! reqwest and SQLite bridges from `bridge-desktop`.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::{catalog::CatalogReader, photos::PhotoService};
use core_runtime::SyncSettings;
use core_sync::{IdentityCache, RunSummary, SyncOptions, SyncOrchestrator};

#[cfg(feature = "desktop-shims")]
use bridge_traits::cache::CacheBackend;
#[cfg(feature = "desktop-shims")]
use core_library::LightroomCatalog;
#[cfg(feature = "desktop-shims")]
use core_runtime::logging::strip_path;
#[cfg(feature = "desktop-shims")]
use core_sync::{BackedIdentityCache, NullIdentityCache};
#[cfg(feature = "desktop-shims")]
use provider_immich::ImmichConnector;
#[cfg(feature = "desktop-shims")]
use tracing::{debug, info, warn};

/// Aggregated handle to the collaborators a run requires.
pub struct CoreDependencies {
    pub catalog: Arc<dyn CatalogReader>,
    pub photos: Arc<dyn PhotoService>,
    pub identity_cache: Arc<dyn IdentityCache>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit handles.
    pub fn new(
        catalog: Arc<dyn CatalogReader>,
        photos: Arc<dyn PhotoService>,
        identity_cache: Arc<dyn IdentityCache>,
    ) -> Self {
        Self {
            catalog,
            photos,
            identity_cache,
        }
    }
}

/// Primary façade exposed to the binary and to embedding hosts.
#[derive(Clone)]
pub struct CoreService {
    deps: Arc<CoreDependencies>,
    options: SyncOptions,
}

impl CoreService {
    pub fn new(deps: CoreDependencies, options: SyncOptions) -> Self {
        Self {
            deps: Arc::new(deps),
            options,
        }
    }

    /// Access the collaborators being used by the service.
    pub fn dependencies(&self) -> Arc<CoreDependencies> {
        Arc::clone(&self.deps)
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Run one mirror pass.
    ///
    /// Per-collection failures are reported in the summary. Failing to list
    /// remote albums or the collection hierarchy is returned as an error.
    pub async fn run(&self) -> Result<RunSummary> {
        let orchestrator = SyncOrchestrator::new(
            self.deps.catalog.clone(),
            self.deps.photos.clone(),
            self.deps.identity_cache.clone(),
            self.options.clone(),
        )?;
        Ok(orchestrator.run().await?)
    }
}

/// Run options derived from validated settings.
pub fn sync_options(settings: &SyncSettings) -> SyncOptions {
    SyncOptions {
        dry_run: settings.dry_run,
        collection_filter: settings.collection_filter.clone(),
        batch_size: settings.batch_size,
        search_page_size: settings.search_page_size,
        ..SyncOptions::default()
    }
}

/// Open every collaborator and perform the startup checks.
///
/// ```no_run
/// # async fn example() -> core_service::Result<()> {
/// use core_runtime::SyncSettingsBuilder;
///
/// let settings = SyncSettingsBuilder::from_env().build()?;
/// let core = core_service::bootstrap(&settings).await?;
/// let summary = core.run().await?;
/// println!("{} asset(s) added", summary.assets_added);
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub async fn bootstrap(settings: &SyncSettings) -> Result<CoreService> {
    use bridge_desktop::ReqwestHttpClient;

    let catalog_path = settings.catalog_path.to_string_lossy();
    info!(catalog = strip_path(&catalog_path), "Opening catalog");
    let catalog = LightroomCatalog::open(&settings.catalog_path).await?;

    let http_client = ReqwestHttpClient::with_timeout(settings.http_timeout)
        .map_err(|e| CoreError::InitializationFailed(e.to_string()))?;
    let photos = ImmichConnector::new(
        Arc::new(http_client),
        settings.api_url.clone(),
        settings.api_key.clone(),
    )
    .with_timeout(settings.http_timeout);
    debug!(api_url = %photos.base_url(), "Remote photo service configured");

    let identity_cache = open_identity_cache(settings).await?;

    Ok(CoreService::new(
        CoreDependencies::new(Arc::new(catalog), Arc::new(photos), identity_cache),
        sync_options(settings),
    ))
}

/// Open and ping the identity cache.
///
/// An unreachable cache is fatal unless `allow_missing_cache` is set, in
/// which case the run proceeds without one and every lookup misses.
#[cfg(feature = "desktop-shims")]
pub async fn open_identity_cache(settings: &SyncSettings) -> Result<Arc<dyn IdentityCache>> {
    use bridge_desktop::SqliteCacheBackend;

    let ping = async {
        let backend = SqliteCacheBackend::open(&settings.cache_path).await?;
        backend.ping().await?;
        Ok::<_, bridge_traits::error::BridgeError>(backend)
    };

    match ping.await {
        Ok(backend) => {
            match backend.purge_expired().await {
                Ok(purged) if purged > 0 => debug!(purged, "Purged expired cache entries"),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Failed to purge expired cache entries"),
            }
            info!(
                cache = %settings.cache_path.display(),
                ttl_secs = settings.cache_ttl.map(|ttl| ttl.as_secs()),
                "Identity cache ready"
            );
            Ok(Arc::new(BackedIdentityCache::new(
                Arc::new(backend),
                settings.cache_ttl,
            )))
        }
        Err(e) if settings.allow_missing_cache => {
            warn!(
                cache = %settings.cache_path.display(),
                error = %e,
                "Identity cache unavailable; continuing without it"
            );
            Ok(Arc::new(NullIdentityCache))
        }
        Err(e) => Err(CoreError::CacheUnavailable {
            path: settings.cache_path.clone(),
            message: e.to_string(),
        }),
    }
}

#[cfg(all(test, feature = "desktop-shims"))]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lr2immich-svc-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn settings(catalog: PathBuf, cache: PathBuf) -> SyncSettings {
        SyncSettings::builder()
            .catalog_path(catalog)
            .api_url("http://localhost:2283/api")
            .api_key("secret")
            .cache_path(cache)
            .build()
            .unwrap()
    }

    #[test]
    fn test_sync_options_follow_settings() {
        let dir = scratch_dir();
        let mut s = settings(dir.join("c.lrcat"), dir.join("cache.db"));
        s.dry_run = true;
        s.batch_size = 50;
        s.collection_filter = Some("christmas".into());

        let options = sync_options(&s);
        assert!(options.dry_run);
        assert_eq!(options.batch_size, 50);
        assert_eq!(options.search_page_size, 100);
        assert_eq!(options.collection_filter.as_deref(), Some("christmas"));
    }

    #[tokio::test]
    async fn test_missing_catalog_is_fatal() {
        let dir = scratch_dir();
        let result = bootstrap(&settings(dir.join("absent.lrcat"), dir.join("cache.db"))).await;

        assert!(matches!(
            result,
            Err(CoreError::Catalog(core_library::LibraryError::CatalogNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_cache_opens_in_fresh_directory() {
        let dir = scratch_dir();
        let cache_path = dir.join("nested").join("identity-cache.db");
        let s = settings(dir.join("c.lrcat"), cache_path.clone());

        let cache = open_identity_cache(&s).await.unwrap();
        assert!(cache.is_enabled());
        cache.set("uuid-1", "asset-1").await;
        assert_eq!(cache.get("uuid-1").await.as_deref(), Some("asset-1"));
        assert!(cache_path.exists());
    }

    #[tokio::test]
    async fn test_unreachable_cache_is_fatal_without_force() {
        let dir = scratch_dir();
        let blocker = dir.join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();
        let s = settings(dir.join("c.lrcat"), blocker.join("identity-cache.db"));

        assert!(matches!(
            open_identity_cache(&s).await,
            Err(CoreError::CacheUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_force_falls_back_to_null_cache() {
        let dir = scratch_dir();
        let blocker = dir.join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();
        let mut s = settings(dir.join("c.lrcat"), blocker.join("identity-cache.db"));
        s.allow_missing_cache = true;

        let cache = open_identity_cache(&s).await.unwrap();
        assert!(!cache.is_enabled());
    }
}
