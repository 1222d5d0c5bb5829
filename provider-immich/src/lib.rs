//! # Immich Provider
//!
//! Implements `PhotoService` for the Immich REST API.
//!
//! ## Overview
//!
//! This module provides:
//! - API-key authentication (`x-api-key` header)
//! - Album listing, lookup with members, and creation
//! - Bulk membership add with per-asset results
//! - Paginated metadata search by original file name

pub mod connector;
pub mod error;
pub mod types;

pub use connector::ImmichConnector;
pub use error::{ImmichError, Result};
