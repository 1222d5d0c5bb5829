//! # Album Reconciler
//!
//! Brings one remote album up to date with one catalog collection.
//!
//! ## Workflow
//!
//! 1. Read the collection's media; a catalog failure counts as empty
//! 2. Resolve every reference, counting cache hits and misses
//! 3. Deduplicate identifiers, first occurrence wins
//! 4. Preview mode stops here and reports what would happen
//! 5. Create the album when the index has no album of that name
//! 6. Re-read the album and diff against its members
//! 7. Add the missing identifiers through the [`BatchApplier`]
//!
//! Albums are only ever added to. Nothing is removed.

use crate::album_index::AlbumIndex;
use crate::batch::BatchApplier;
use crate::enumerator::CollectionTarget;
use crate::model::{dedup_preserving_order, AlbumState, SyncDelta};
use crate::resolver::AssetResolver;
use crate::Result;
use bridge_traits::catalog::CatalogReader;
use bridge_traits::error::BridgeError;
use bridge_traits::photos::{PhotoService, RemoteAlbum};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// What reconciling one collection did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Collection has no media (or its media could not be read)
    SkippedEmpty,
    /// No media resolved to a remote asset
    SkippedUnresolved,
    /// Preview: album would be created with this many assets
    WouldCreate { assets: usize },
    /// Preview: existing album would receive up to this many assets
    WouldUpdate { assets: usize },
    /// Every resolved asset already in the album
    UpToDate { album_id: String, created: bool },
    /// Delta applied; `added` of `attempted` reported as successful
    Added {
        album_id: String,
        created: bool,
        added: usize,
        attempted: usize,
    },
}

impl ReconcileOutcome {
    pub fn created_album(&self) -> bool {
        matches!(
            self,
            ReconcileOutcome::UpToDate { created: true, .. }
                | ReconcileOutcome::Added { created: true, .. }
        )
    }

    pub fn added(&self) -> usize {
        match self {
            ReconcileOutcome::Added { added, .. } => *added,
            _ => 0,
        }
    }
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileOutcome::SkippedEmpty => f.write_str("skipped (empty collection)"),
            ReconcileOutcome::SkippedUnresolved => f.write_str("skipped (nothing resolved)"),
            ReconcileOutcome::WouldCreate { assets } => {
                write!(f, "would create album with {} asset(s)", assets)
            }
            ReconcileOutcome::WouldUpdate { assets } => {
                write!(f, "would update album with {} asset(s)", assets)
            }
            ReconcileOutcome::UpToDate { .. } => f.write_str("already up to date"),
            ReconcileOutcome::Added {
                added, attempted, ..
            } => write!(f, "added {} of {}", added, attempted),
        }
    }
}

/// Per-collection counters and outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionReport {
    pub name: String,
    pub collection_id: i64,
    pub media_count: usize,
    /// Distinct remote identifiers after dedup
    pub resolved: usize,
    pub not_found: usize,
    pub cache_hits: usize,
    pub outcome: ReconcileOutcome,
}

pub struct AlbumReconciler {
    catalog: Arc<dyn CatalogReader>,
    photos: Arc<dyn PhotoService>,
    resolver: AssetResolver,
    applier: BatchApplier,
    dry_run: bool,
}

impl AlbumReconciler {
    pub fn new(
        catalog: Arc<dyn CatalogReader>,
        photos: Arc<dyn PhotoService>,
        resolver: AssetResolver,
        applier: BatchApplier,
        dry_run: bool,
    ) -> Self {
        Self {
            catalog,
            photos,
            resolver,
            applier,
            dry_run,
        }
    }

    /// Reconcile one collection. Remote failures are returned to the caller.
    #[instrument(skip(self, target, albums), fields(album = %target.name, collection_id = target.handle.id()))]
    pub async fn reconcile(
        &self,
        target: &CollectionTarget,
        albums: &mut AlbumIndex,
    ) -> Result<CollectionReport> {
        let mut report = CollectionReport {
            name: target.name.to_string(),
            collection_id: target.handle.id(),
            media_count: 0,
            resolved: 0,
            not_found: 0,
            cache_hits: 0,
            outcome: ReconcileOutcome::SkippedEmpty,
        };

        let media = match self.catalog.list_media(target.handle.id()).await {
            Ok(media) => media,
            Err(BridgeError::Unsupported(reason)) => {
                warn!(%reason, "Collection membership not readable; skipping");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "Failed to read collection media; treating as empty");
                Vec::new()
            }
        };

        report.media_count = media.len();
        if media.is_empty() {
            info!("Empty collection; skipping");
            return Ok(report);
        }

        let mut resolved = Vec::with_capacity(media.len());
        for reference in &media {
            let resolution = self.resolver.resolve(reference).await?;
            if resolution.is_cache_hit() {
                report.cache_hits += 1;
            }
            match resolution.into_remote_id() {
                Some(id) => resolved.push(id),
                None => report.not_found += 1,
            }
        }

        let resolved = dedup_preserving_order(resolved);
        report.resolved = resolved.len();
        info!(
            media = report.media_count,
            resolved = report.resolved,
            not_found = report.not_found,
            cache_hits = report.cache_hits,
            "Resolved collection media"
        );

        if resolved.is_empty() {
            warn!("No remote assets resolved; skipping album");
            report.outcome = ReconcileOutcome::SkippedUnresolved;
            return Ok(report);
        }

        if self.dry_run {
            report.outcome = if albums.contains(&target.name) {
                ReconcileOutcome::WouldUpdate {
                    assets: resolved.len(),
                }
            } else {
                ReconcileOutcome::WouldCreate {
                    assets: resolved.len(),
                }
            };
            info!(outcome = %report.outcome, "Dry run");
            return Ok(report);
        }

        let (album_id, created) = match albums.get(&target.name) {
            Some(album) => {
                debug!(album_id = %album.id, "Album exists");
                (album.id.clone(), false)
            }
            None => {
                let album = self.photos.create_album(target.name.as_str()).await?;
                info!(album_id = %album.id, "Created album");
                albums.insert(RemoteAlbum {
                    id: album.id.clone(),
                    name: target.name.to_string(),
                });
                (album.id, true)
            }
        };

        let state = AlbumState::from(self.photos.get_album(&album_id).await?);
        let delta = SyncDelta::compute(&resolved, &state);

        if delta.is_empty() {
            info!("Album already up to date");
            report.outcome = ReconcileOutcome::UpToDate { album_id, created };
            return Ok(report);
        }

        info!(
            new = delta.len(),
            existing = state.members.len(),
            batch_size = self.applier.chunk_size(),
            "Adding assets"
        );
        let applied = self.applier.apply(&album_id, &delta).await?;

        report.outcome = ReconcileOutcome::Added {
            album_id,
            created,
            added: applied.succeeded,
            attempted: applied.attempted,
        };
        info!(outcome = %report.outcome, "Album updated");
        Ok(report)
    }
}
