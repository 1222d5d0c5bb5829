//! Catalog Reader Abstraction
//!
//! Read-only view over the source catalog: a hierarchy of collection nodes
//! and the media rows held by each collection. The catalog's storage format
//! is an adapter concern; the core only sees these types.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Kind of a node in the collection hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Organizes child nodes, holds no media directly
    Group,
    /// Manually curated collection
    Collection,
    /// Rule-derived collection
    SmartCollection,
    /// Any other node type the catalog exposes (kept verbatim)
    Other(String),
}

impl NodeKind {
    /// Whether the node only organizes descendants
    pub fn is_grouping(&self) -> bool {
        matches!(self, NodeKind::Group)
    }
}

/// One node of the collection hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCollection {
    /// Catalog-local identifier
    pub id: i64,
    /// Names from the root down to (and including) this node
    pub path: Vec<String>,
    /// Node type
    pub kind: NodeKind,
}

/// A media row drawn from one collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaReference {
    /// File name including extension (e.g. `IMG_0001.CR3`)
    pub file_name: String,
    /// Stable catalog-item key
    pub item_key: String,
    /// Capture timestamp recorded by the catalog, if known
    pub capture_time: Option<NaiveDateTime>,
}

impl MediaReference {
    pub fn new(file_name: impl Into<String>, item_key: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            item_key: item_key.into(),
            capture_time: None,
        }
    }

    pub fn with_capture_time(mut self, capture_time: NaiveDateTime) -> Self {
        self.capture_time = Some(capture_time);
        self
    }
}

/// Catalog reader trait
///
/// Implementations must distinguish grouping nodes from leaf collections via
/// [`NodeKind`] and must return nodes in a deterministic order.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// List every node of the collection hierarchy
    async fn list_collections(&self) -> Result<Vec<CatalogCollection>>;

    /// List media held by one collection
    async fn list_media(&self, collection_id: i64) -> Result<Vec<MediaReference>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_only_groups_are_grouping_nodes() {
        assert!(NodeKind::Group.is_grouping());
        assert!(!NodeKind::Collection.is_grouping());
        assert!(!NodeKind::SmartCollection.is_grouping());
        assert!(!NodeKind::Other("com.adobe.ag.webGallery".to_string()).is_grouping());
    }

    #[test]
    fn test_media_reference_builder() {
        let taken = NaiveDate::from_ymd_opt(2023, 12, 24)
            .unwrap()
            .and_hms_opt(18, 3, 12)
            .unwrap();
        let media = MediaReference::new("IMG_0001.CR3", "uuid-1").with_capture_time(taken);

        assert_eq!(media.file_name, "IMG_0001.CR3");
        assert_eq!(media.item_key, "uuid-1");
        assert_eq!(media.capture_time, Some(taken));
    }
}
