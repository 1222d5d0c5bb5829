//! # Sync Orchestrator
//!
//! Drives one mirror run over every selected collection.
//!
//! ## Workflow
//!
//! 1. Snapshot remote albums into an [`AlbumIndex`]
//! 2. Enumerate catalog collections, applying the optional name filter
//! 3. Reconcile collections one at a time, in enumeration order
//! 4. Log and count a failing collection, then continue with the next
//! 5. Log a [`RunSummary`]
//!
//! Collections are processed sequentially so that album creation and the
//! read-diff-apply sequence for an album never interleave.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_sync::{SyncOptions, SyncOrchestrator, NullIdentityCache};
//!
//! let orchestrator = SyncOrchestrator::new(catalog, photos, Arc::new(NullIdentityCache), SyncOptions::default())?;
//! let summary = orchestrator.run().await?;
//! println!("{} asset(s) added", summary.assets_added);
//! ```

use crate::album_index::AlbumIndex;
use crate::batch::BatchApplier;
use crate::enumerator::CollectionEnumerator;
use crate::identity_cache::IdentityCache;
use crate::reconciler::{AlbumReconciler, CollectionReport, ReconcileOutcome};
use crate::resolver::{AmbiguityPolicy, AssetResolver};
use crate::{Result, SyncError};
use bridge_traits::catalog::CatalogReader;
use bridge_traits::photos::PhotoService;
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Default max identifiers per membership-add call
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Default page size for filename searches
pub const DEFAULT_SEARCH_PAGE_SIZE: u32 = 100;

/// Options for one run
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Report what would change without writing
    pub dry_run: bool,

    /// Case-insensitive substring filter on album names
    pub collection_filter: Option<String>,

    /// Max identifiers per membership-add call
    pub batch_size: usize,

    /// Page size for filename searches
    pub search_page_size: u32,

    /// Tie-break for several assets sharing a file name
    pub ambiguity_policy: AmbiguityPolicy,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            collection_filter: None,
            batch_size: DEFAULT_BATCH_SIZE,
            search_page_size: DEFAULT_SEARCH_PAGE_SIZE,
            ambiguity_policy: AmbiguityPolicy::default(),
        }
    }
}

/// A collection whose reconciliation raised an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionFailure {
    pub name: String,
    pub collection_id: i64,
    pub message: String,
}

/// Totals for one run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub run_id: String,
    pub dry_run: bool,
    pub remote_albums: usize,
    pub collections_total: usize,
    pub collections_selected: usize,
    pub albums_created: usize,
    pub albums_updated: usize,
    pub up_to_date: usize,
    pub skipped: usize,
    pub previewed: usize,
    pub assets_added: usize,
    pub assets_not_found: usize,
    pub cache_hits: usize,
    pub reports: Vec<CollectionReport>,
    pub failures: Vec<CollectionFailure>,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    fn record(&mut self, report: CollectionReport) {
        self.assets_not_found += report.not_found;
        self.cache_hits += report.cache_hits;

        match &report.outcome {
            ReconcileOutcome::SkippedEmpty | ReconcileOutcome::SkippedUnresolved => {
                self.skipped += 1
            }
            ReconcileOutcome::WouldCreate { .. } | ReconcileOutcome::WouldUpdate { .. } => {
                self.previewed += 1
            }
            ReconcileOutcome::UpToDate { created, .. } => {
                if *created {
                    self.albums_created += 1;
                }
                self.up_to_date += 1;
            }
            ReconcileOutcome::Added { created, added, .. } => {
                if *created {
                    self.albums_created += 1;
                } else {
                    self.albums_updated += 1;
                }
                self.assets_added += added;
            }
        }

        self.reports.push(report);
    }

    fn log(&self) {
        info!(
            run_id = %self.run_id,
            dry_run = self.dry_run,
            collections = self.collections_selected,
            created = self.albums_created,
            updated = self.albums_updated,
            up_to_date = self.up_to_date,
            skipped = self.skipped,
            previewed = self.previewed,
            failed = self.failed(),
            added = self.assets_added,
            not_found = self.assets_not_found,
            cache_hits = self.cache_hits,
            "Sync finished"
        );
    }
}

pub struct SyncOrchestrator {
    enumerator: CollectionEnumerator,
    reconciler: AlbumReconciler,
    photos: Arc<dyn PhotoService>,
    options: SyncOptions,
}

impl SyncOrchestrator {
    /// # Errors
    ///
    /// [`SyncError::InvalidConfig`] for a zero batch or page size.
    pub fn new(
        catalog: Arc<dyn CatalogReader>,
        photos: Arc<dyn PhotoService>,
        cache: Arc<dyn IdentityCache>,
        options: SyncOptions,
    ) -> Result<Self> {
        if options.search_page_size == 0 {
            return Err(SyncError::InvalidConfig(
                "search page size must be greater than 0".to_string(),
            ));
        }

        let resolver = AssetResolver::new(photos.clone(), cache, options.search_page_size)
            .with_policy(options.ambiguity_policy);
        let applier = BatchApplier::new(photos.clone(), options.batch_size)?;
        let reconciler = AlbumReconciler::new(
            catalog.clone(),
            photos.clone(),
            resolver,
            applier,
            options.dry_run,
        );

        Ok(Self {
            enumerator: CollectionEnumerator::new(catalog),
            reconciler,
            photos,
            options,
        })
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Run once over all selected collections.
    ///
    /// # Errors
    ///
    /// Only failures before the first collection is reconciled: listing
    /// remote albums or reading the collection hierarchy. Per-collection
    /// failures are recorded in [`RunSummary::failures`].
    pub async fn run(&self) -> Result<RunSummary> {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("sync_run", run_id = %run_id, dry_run = self.options.dry_run);
        self.run_inner(run_id).instrument(span).await
    }

    async fn run_inner(&self, run_id: String) -> Result<RunSummary> {
        let mut summary = RunSummary {
            run_id,
            dry_run: self.options.dry_run,
            ..RunSummary::default()
        };

        let mut albums = AlbumIndex::from_albums(self.photos.list_albums().await?);
        summary.remote_albums = albums.len();
        info!(albums = albums.len(), "Fetched existing remote albums");

        let mut targets = self.enumerator.enumerate().await?;
        summary.collections_total = targets.len();

        if let Some(filter) = self.options.collection_filter.as_deref() {
            targets.retain(|t| t.name.matches_filter(filter));
            info!(
                filter,
                selected = targets.len(),
                total = summary.collections_total,
                "Applied collection filter"
            );
        }
        summary.collections_selected = targets.len();
        info!(collections = targets.len(), "Syncing collections");

        for target in &targets {
            match self.reconciler.reconcile(target, &mut albums).await {
                Ok(report) => summary.record(report),
                Err(e) => {
                    error!(
                        album = %target.name,
                        collection_id = target.handle.id(),
                        error = %e,
                        "Collection failed; continuing"
                    );
                    summary.failures.push(CollectionFailure {
                        name: target.name.to_string(),
                        collection_id: target.handle.id(),
                        message: e.to_string(),
                    });
                }
            }
        }

        summary.log();
        Ok(summary)
    }
}
