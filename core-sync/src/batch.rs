//! Chunked membership-add.

use crate::model::SyncDelta;
use crate::{Result, SyncError};
use bridge_traits::photos::PhotoService;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Counts from one [`BatchApplier::apply`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Identifiers sent
    pub attempted: usize,
    /// Identifiers the service reported as added
    pub succeeded: usize,
    /// Membership-add calls issued
    pub chunks: usize,
}

/// Applies a [`SyncDelta`] in chunks of at most `chunk_size` identifiers.
///
/// Per-item failures reported by the service are counted, not raised. A
/// transport failure stops at the failing chunk with
/// [`SyncError::BatchFailed`]; nothing is retried here.
pub struct BatchApplier {
    photos: Arc<dyn PhotoService>,
    chunk_size: usize,
}

impl BatchApplier {
    pub fn new(photos: Arc<dyn PhotoService>, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(SyncError::InvalidConfig(
                "batch size must be greater than 0".to_string(),
            ));
        }
        Ok(Self { photos, chunk_size })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[instrument(skip(self, delta), fields(delta = delta.len(), chunk_size = self.chunk_size))]
    pub async fn apply(&self, album_id: &str, delta: &SyncDelta) -> Result<BatchReport> {
        let mut report = BatchReport::default();

        for (chunk_index, chunk) in delta.ids().chunks(self.chunk_size).enumerate() {
            let results = self
                .photos
                .add_members(album_id, chunk)
                .await
                .map_err(|e| SyncError::BatchFailed {
                    album_id: album_id.to_string(),
                    chunk_index,
                    added_before_failure: report.succeeded,
                    message: e.to_string(),
                })?;

            let succeeded = results.iter().filter(|r| r.success).count();
            for failed in results.iter().filter(|r| !r.success) {
                debug!(
                    asset_id = %failed.id,
                    reason = failed.error.as_deref().unwrap_or("unknown"),
                    "Asset not added"
                );
            }
            if succeeded < chunk.len() {
                warn!(
                    chunk_index,
                    sent = chunk.len(),
                    added = succeeded,
                    "Chunk partially applied"
                );
            }

            report.attempted += chunk.len();
            report.succeeded += succeeded;
            report.chunks += 1;
        }

        Ok(report)
    }
}
