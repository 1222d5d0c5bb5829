//! Error types for the Immich provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Immich provider errors
#[derive(Error, Debug)]
pub enum ImmichError {
    /// API key rejected
    #[error("Authentication failed (status {status_code}): {message}")]
    AuthenticationFailed { status_code: u16, message: String },

    /// API request returned an error
    #[error("Immich API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Album not found
    #[error("Album not found: {album_id}")]
    AlbumNotFound { album_id: String },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for Immich operations
pub type Result<T> = std::result::Result<T, ImmichError>;

impl ImmichError {
    /// Classify a non-2xx response.
    pub fn from_status(status_code: u16, message: String, album_id: Option<&str>) -> Self {
        match (status_code, album_id) {
            (401 | 403, _) => ImmichError::AuthenticationFailed {
                status_code,
                message,
            },
            (404, Some(album_id)) => ImmichError::AlbumNotFound {
                album_id: album_id.to_string(),
            },
            _ => ImmichError::ApiError {
                status_code,
                message,
            },
        }
    }
}

impl From<ImmichError> for BridgeError {
    fn from(error: ImmichError) -> Self {
        match error {
            ImmichError::BridgeError(e) => e,
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}
