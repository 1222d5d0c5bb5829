//! # Catalog Library Module
//!
//! Read-only access to a Lightroom Classic catalog.
//!
//! ## Overview
//!
//! This crate provides:
//! - A read-only SQLite connection pool over the `.lrcat` file
//! - [`LightroomCatalog`], the [`CatalogReader`](bridge_traits::CatalogReader)
//!   implementation yielding the collection hierarchy and per-collection media
//! - Evaluation of smart collection rules ([`smart_collection`])

pub mod catalog;
pub mod db;
pub mod error;
pub mod smart_collection;

pub use catalog::LightroomCatalog;
pub use db::{open_catalog_pool, CatalogDbConfig};
pub use error::{LibraryError, Result};
pub use smart_collection::{Combine, RuleGroup};
