use bridge_traits::error::BridgeError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Catalog not found: {}", .0.display())]
    CatalogNotFound(PathBuf),

    #[error("Not a Lightroom catalog: {0}")]
    InvalidCatalog(String),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Unsupported: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, LibraryError>;

impl From<LibraryError> for BridgeError {
    fn from(error: LibraryError) -> Self {
        match error {
            LibraryError::Bridge(inner) => inner,
            LibraryError::Database(e) => BridgeError::DatabaseError(e.to_string()),
            LibraryError::Unsupported(message) => BridgeError::Unsupported(message),
            LibraryError::CatalogNotFound(path) => {
                BridgeError::NotAvailable(format!("Catalog not found: {}", path.display()))
            }
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}
