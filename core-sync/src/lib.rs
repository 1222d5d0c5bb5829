//! # Sync & Reconciliation Module
//!
//! Mirrors catalog collections into remote albums.
//!
//! ## Overview
//!
//! This module owns the reconciliation rules:
//! - Mapping each collection's hierarchy path to a unique album name
//! - Resolving catalog items to remote assets, cache first
//! - Diffing desired membership against the album's current members
//! - Adding only what is missing, in bounded chunks
//! - Isolating a failing collection from the rest of the run
//!
//! ## Components
//!
//! - **Identity Cache** (`identity_cache`): Item key → remote id, degrades to always-miss
//! - **Asset Resolver** (`resolver`): Cache lookup, paginated filename search, tie-breaks
//! - **Collection Enumerator** (`enumerator`): Non-grouping collections with their album names
//! - **Album Reconciler** (`reconciler`): One collection against one album
//! - **Batch Applier** (`batch`): Chunked membership-add
//! - **Sync Orchestrator** (`orchestrator`): The whole run, with filter and preview mode

pub mod album_index;
pub mod batch;
pub mod enumerator;
pub mod error;
pub mod identity_cache;
pub mod model;
pub mod orchestrator;
pub mod reconciler;
pub mod resolver;

pub use album_index::AlbumIndex;
pub use batch::{BatchApplier, BatchReport};
pub use enumerator::{CollectionEnumerator, CollectionTarget};
pub use error::{Result, SyncError};
pub use identity_cache::{BackedIdentityCache, IdentityCache, NullIdentityCache};
pub use model::{AlbumState, CollectionHandle, SyncDelta, TargetAlbumName, HIERARCHY_SEPARATOR};
pub use orchestrator::{CollectionFailure, RunSummary, SyncOptions, SyncOrchestrator};
pub use reconciler::{AlbumReconciler, CollectionReport, ReconcileOutcome};
pub use resolver::{AmbiguityPolicy, AssetResolver, Resolution};
