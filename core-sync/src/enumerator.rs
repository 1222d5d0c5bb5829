//! Collection enumeration: catalog hierarchy → reconcilable targets.

use crate::model::{CollectionHandle, TargetAlbumName};
use crate::{Result, SyncError};
use bridge_traits::catalog::CatalogReader;
use std::sync::Arc;
use tracing::{debug, warn};

/// A collection paired with the album name it mirrors into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionTarget {
    pub name: TargetAlbumName,
    pub handle: CollectionHandle,
}

pub struct CollectionEnumerator {
    catalog: Arc<dyn CatalogReader>,
}

impl CollectionEnumerator {
    pub fn new(catalog: Arc<dyn CatalogReader>) -> Self {
        Self { catalog }
    }

    /// Every non-grouping collection, in the reader's traversal order.
    pub async fn enumerate(&self) -> Result<Vec<CollectionTarget>> {
        let collections = self
            .catalog
            .list_collections()
            .await
            .map_err(SyncError::Catalog)?;

        let total = collections.len();
        let targets: Vec<CollectionTarget> = collections
            .into_iter()
            .filter(|c| !c.kind.is_grouping())
            .filter_map(|c| match CollectionHandle::new(c.id, c.path) {
                Some(handle) => Some(CollectionTarget {
                    name: handle.target_name(),
                    handle,
                }),
                None => {
                    warn!(collection_id = c.id, "Collection without a path skipped");
                    None
                }
            })
            .collect();

        debug!(
            total,
            selected = targets.len(),
            "Enumerated catalog collections"
        );
        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::catalog::{CatalogCollection, MediaReference, NodeKind};
    use bridge_traits::error::{BridgeError, Result as BridgeResult};

    struct StaticCatalog(Vec<CatalogCollection>);

    #[async_trait]
    impl CatalogReader for StaticCatalog {
        async fn list_collections(&self) -> BridgeResult<Vec<CatalogCollection>> {
            Ok(self.0.clone())
        }

        async fn list_media(&self, _collection_id: i64) -> BridgeResult<Vec<MediaReference>> {
            Ok(Vec::new())
        }
    }

    struct BrokenCatalog;

    #[async_trait]
    impl CatalogReader for BrokenCatalog {
        async fn list_collections(&self) -> BridgeResult<Vec<CatalogCollection>> {
            Err(BridgeError::DatabaseError("file is not a database".into()))
        }

        async fn list_media(&self, _collection_id: i64) -> BridgeResult<Vec<MediaReference>> {
            Ok(Vec::new())
        }
    }

    fn node(id: i64, path: &[&str], kind: NodeKind) -> CatalogCollection {
        CatalogCollection {
            id,
            path: path.iter().map(|s| s.to_string()).collect(),
            kind,
        }
    }

    #[tokio::test]
    async fn test_grouping_nodes_are_skipped() {
        let catalog = StaticCatalog(vec![
            node(1, &["2023"], NodeKind::Group),
            node(2, &["2023", "Family"], NodeKind::Group),
            node(3, &["2023", "Family", "Christmas"], NodeKind::Collection),
            node(4, &["Best"], NodeKind::SmartCollection),
            node(5, &[], NodeKind::Collection),
        ]);

        let targets = CollectionEnumerator::new(Arc::new(catalog))
            .enumerate()
            .await
            .unwrap();

        let names: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["2023 > Family > Christmas", "Best"]);
        assert_eq!(targets[0].handle.id(), 3);
    }

    #[tokio::test]
    async fn test_order_is_deterministic() {
        let catalog = Arc::new(StaticCatalog(vec![
            node(9, &["B"], NodeKind::Collection),
            node(8, &["A"], NodeKind::Collection),
        ]));
        let enumerator = CollectionEnumerator::new(catalog);

        let first = enumerator.enumerate().await.unwrap();
        let second = enumerator.enumerate().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].handle.id(), 9);
    }

    #[tokio::test]
    async fn test_catalog_failure_is_reported() {
        let result = CollectionEnumerator::new(Arc::new(BrokenCatalog))
            .enumerate()
            .await;
        assert!(matches!(result, Err(SyncError::Catalog(_))));
    }
}
