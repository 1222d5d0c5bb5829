use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop a run before or at startup.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Catalog error: {0}")]
    Catalog(#[from] core_library::LibraryError),

    #[error("Identity cache unavailable at {path}: {message} (use --force to run without it)")]
    CacheUnavailable { path: PathBuf, message: String },

    #[error("Remote service error: {0}")]
    Remote(#[from] bridge_traits::error::BridgeError),

    #[error("Sync error: {0}")]
    Sync(#[from] core_sync::SyncError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
