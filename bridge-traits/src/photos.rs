//! Remote Photo Service Abstraction
//!
//! Album and asset operations the core needs from the remote photo-management
//! service. Albums are flat, named containers of asset identifiers.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::Result;

/// Album summary as listed by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAlbum {
    pub id: String,
    pub name: String,
}

/// Album with its current membership
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumDetails {
    pub id: String,
    pub name: String,
    pub member_ids: HashSet<String>,
}

/// Asset returned by a metadata search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAsset {
    pub id: String,
    /// Original file name stored by the remote service
    pub original_file_name: Option<String>,
    /// Capture time in the asset's local time zone, when exposed
    pub local_date_time: Option<NaiveDateTime>,
}

impl RemoteAsset {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            original_file_name: None,
            local_date_time: None,
        }
    }
}

/// Per-item outcome of a membership-add call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberAddResult {
    pub id: String,
    pub success: bool,
    /// Reason reported by the service for a rejected item (e.g. `duplicate`)
    pub error: Option<String>,
}

/// Paginated search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSearch {
    pub original_file_name: String,
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
}

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetPage {
    pub items: Vec<RemoteAsset>,
    /// Present when the service reports another page
    pub next_page: Option<String>,
}

impl AssetPage {
    /// Whether another page should be requested
    pub fn has_more(&self) -> bool {
        self.next_page.is_some() && !self.items.is_empty()
    }
}

/// Remote photo service trait
#[async_trait]
pub trait PhotoService: Send + Sync {
    /// List all albums owned by the authenticated user
    async fn list_albums(&self) -> Result<Vec<RemoteAlbum>>;

    /// Fetch an album together with its member identifiers
    async fn get_album(&self, album_id: &str) -> Result<AlbumDetails>;

    /// Create an empty album
    async fn create_album(&self, name: &str) -> Result<RemoteAlbum>;

    /// Add assets to an album, reporting success per item
    async fn add_members(&self, album_id: &str, asset_ids: &[String]) -> Result<Vec<MemberAddResult>>;

    /// Search assets by original file name (one page)
    async fn search_by_filename(&self, search: &AssetSearch) -> Result<AssetPage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_has_more() {
        let page = AssetPage {
            items: vec![RemoteAsset::new("a")],
            next_page: Some("2".to_string()),
        };
        assert!(page.has_more());

        let empty = AssetPage {
            items: Vec::new(),
            next_page: Some("2".to_string()),
        };
        assert!(!empty.has_more());

        let last = AssetPage {
            items: vec![RemoteAsset::new("a")],
            next_page: None,
        };
        assert!(!last.has_more());
    }
}
