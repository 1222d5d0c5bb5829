//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the catalog mirror:
//! - Logging and tracing infrastructure
//! - Configuration management (environment, builder, validation)
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the other crates depend
//! on. It establishes the logging conventions and the settings model used
//! by the bootstrap in `core-service`.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{SyncSettings, SyncSettingsBuilder};
pub use error::{Error, Result};
