//! # Host Bridge Traits
//!
//! Contracts between the reconciliation core and its external collaborators.
//!
//! ## Overview
//!
//! The core never talks to a catalog file, an HTTP endpoint, or a cache
//! server directly. Each collaborator is reached through one of the traits
//! below, so adapters can be swapped (desktop implementations live in
//! `bridge-desktop`, `core-library` and `provider-immich`) and tests can use
//! in-memory fakes.
//!
//! ## Traits
//!
//! ### Collaborators
//! - [`CatalogReader`](catalog::CatalogReader) - Collection hierarchy and per-collection media
//! - [`PhotoService`](photos::PhotoService) - Album CRUD, membership add, filename search
//! - [`CacheBackend`](cache::CacheBackend) - Key-value store with expiry
//!
//! ### Transport & Utilities
//! - [`HttpClient`](http::HttpClient) - Async HTTP with retry policy
//! - [`Clock`](time::Clock) - Time source for deterministic expiry tests
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Implementations should convert their native errors to `BridgeError` and
//! include context (URL, status code, file path) in the message.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so they can be shared behind
//! `Arc<dyn Trait>`.

pub mod cache;
pub mod catalog;
pub mod error;
pub mod http;
pub mod photos;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use cache::CacheBackend;
pub use catalog::{CatalogCollection, CatalogReader, MediaReference, NodeKind};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use photos::{
    AlbumDetails, AssetPage, AssetSearch, MemberAddResult, PhotoService, RemoteAlbum, RemoteAsset,
};
pub use time::{Clock, LogLevel, SystemClock};
