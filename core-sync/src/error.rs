use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Catalog error: {0}")]
    Catalog(#[source] BridgeError),

    #[error("Remote service error: {0}")]
    Remote(#[from] BridgeError),

    #[error(
        "Adding to album {album_id} failed at chunk {chunk_index} \
         ({added_before_failure} added before the failure): {message}"
    )]
    BatchFailed {
        album_id: String,
        chunk_index: usize,
        added_before_failure: usize,
        message: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
