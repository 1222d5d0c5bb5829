//! Workspace placeholder crate.
//!
//! This crate exists to expose a single dependency entry point for hosts that
//! embed the Lightroom → Immich mirror (`core-service`) without wiring each
//! workspace crate individually. The `desktop-shims` feature pulls in the
//! reqwest/sqlx-backed bridges through `core-service`.

#[cfg(feature = "desktop-shims")]
pub use core_service;
#[cfg(feature = "desktop-shims")]
pub use core_sync;
