//! Lightroom Classic catalog reader.
//!
//! Collections live in `AgLibraryCollection`, a self-referencing tree keyed
//! by `id_local` and `parent`. Collection sets are grouping nodes and hold no
//! images. Standard collection membership is stored in
//! `AgLibraryCollectionImage`. Smart collections only store their rules,
//! which [`smart_collection`](crate::smart_collection) turns into a query.

use crate::db::{open_catalog_pool, CatalogDbConfig};
use crate::error::{LibraryError, Result};
use crate::smart_collection::{BindValue, RuleGroup, SMART_COLLECTION_MODULE};
use async_trait::async_trait;
use bridge_traits::catalog::{CatalogCollection, CatalogReader, MediaReference, NodeKind};
use bridge_traits::error::Result as BridgeResult;
use chrono::{DateTime, NaiveDateTime};
use sqlx::{FromRow, SqlitePool};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, instrument, warn};

pub const CREATION_ID_GROUP: &str = "com.adobe.ag.library.group";
pub const CREATION_ID_COLLECTION: &str = "com.adobe.ag.library.collection";
pub const CREATION_ID_SMART_COLLECTION: &str = "com.adobe.ag.library.smart_collection";

/// Map a `creationId` to the node kind.
pub fn node_kind(creation_id: &str) -> NodeKind {
    match creation_id {
        CREATION_ID_GROUP => NodeKind::Group,
        CREATION_ID_COLLECTION => NodeKind::Collection,
        CREATION_ID_SMART_COLLECTION => NodeKind::SmartCollection,
        other => NodeKind::Other(other.to_string()),
    }
}

/// Parse Lightroom's `captureTime` text.
///
/// Catalogs store local time as ISO-8601, with or without fractional
/// seconds, and occasionally with a UTC offset (dropped here).
pub fn parse_capture_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

#[derive(Debug, Clone, FromRow)]
struct CollectionRow {
    id_local: i64,
    name: Option<String>,
    parent: Option<i64>,
    creation_id: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
struct MediaRow {
    base_name: Option<String>,
    extension: Option<String>,
    item_key: Option<String>,
    capture_time: Option<String>,
}

impl MediaRow {
    fn into_reference(self) -> Option<MediaReference> {
        let base_name = self.base_name.filter(|s| !s.is_empty())?;
        let item_key = self.item_key.filter(|s| !s.is_empty())?;

        let file_name = match self.extension.filter(|s| !s.is_empty()) {
            Some(ext) => format!("{}.{}", base_name, ext),
            None => base_name,
        };

        let reference = MediaReference::new(file_name, item_key);
        Some(
            match self.capture_time.as_deref().and_then(parse_capture_time) {
                Some(taken) => reference.with_capture_time(taken),
                None => reference,
            },
        )
    }
}

/// Read-only [`CatalogReader`] over a `.lrcat` file.
pub struct LightroomCatalog {
    pool: SqlitePool,
}

impl LightroomCatalog {
    /// Open the catalog at `path` read-only.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let pool = open_catalog_pool(CatalogDbConfig::new(path.as_ref())).await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool (tests, custom connection settings).
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn collection_rows(&self) -> Result<Vec<CollectionRow>> {
        let rows = sqlx::query_as::<_, CollectionRow>(
            r#"
            SELECT id_local, name, parent, creationId AS creation_id
            FROM AgLibraryCollection
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn kind_of(&self, collection_id: i64) -> Result<NodeKind> {
        let creation_id: Option<(Option<String>,)> =
            sqlx::query_as("SELECT creationId FROM AgLibraryCollection WHERE id_local = ?")
                .bind(collection_id)
                .fetch_optional(&self.pool)
                .await?;

        match creation_id {
            Some((creation_id,)) => Ok(node_kind(creation_id.as_deref().unwrap_or_default())),
            None => Err(LibraryError::NotFound {
                entity_type: "Collection".to_string(),
                id: collection_id.to_string(),
            }),
        }
    }

    /// Collections in depth-first path order.
    pub async fn collections(&self) -> Result<Vec<CatalogCollection>> {
        let rows = self.collection_rows().await?;
        let by_id: HashMap<i64, &CollectionRow> = rows.iter().map(|r| (r.id_local, r)).collect();

        let mut collections: Vec<CatalogCollection> = rows
            .iter()
            .map(|row| CatalogCollection {
                id: row.id_local,
                path: hierarchy_path(row, &by_id),
                kind: node_kind(row.creation_id.as_deref().unwrap_or_default()),
            })
            .collect();

        collections.sort_by(|a, b| a.path.cmp(&b.path).then(a.id.cmp(&b.id)));
        debug!(count = collections.len(), "Loaded catalog collections");
        Ok(collections)
    }

    /// Media of one collection. Smart collections are evaluated from their
    /// stored rules; grouping nodes have none.
    pub async fn media(&self, collection_id: i64) -> Result<Vec<MediaReference>> {
        let rows = match self.kind_of(collection_id).await? {
            NodeKind::Group => return Ok(Vec::new()),
            NodeKind::SmartCollection => self.smart_rows(collection_id).await?,
            _ => self.member_rows(collection_id).await?,
        };

        let total = rows.len();
        let media: Vec<MediaReference> =
            rows.into_iter().filter_map(MediaRow::into_reference).collect();

        if media.len() < total {
            debug!(
                collection_id,
                dropped = total - media.len(),
                "Skipped catalog rows without filename or key"
            );
        }
        Ok(media)
    }

    async fn member_rows(&self, collection_id: i64) -> Result<Vec<MediaRow>> {
        let rows = sqlx::query_as::<_, MediaRow>(
            r#"
            SELECT f.baseName AS base_name,
                   f.extension AS extension,
                   i.id_global AS item_key,
                   i.captureTime AS capture_time
            FROM AgLibraryCollectionImage ci
            JOIN Adobe_images i ON i.id_local = ci.image
            JOIN AgLibraryFile f ON f.id_local = i.rootFile
            WHERE ci.collection = ?
            ORDER BY i.id_local
            "#,
        )
        .bind(collection_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Images matching a smart collection's rules.
    ///
    /// # Errors
    ///
    /// [`LibraryError::Unsupported`] when no rules are stored or a rule has
    /// no SQL translation.
    async fn smart_rows(&self, collection_id: i64) -> Result<Vec<MediaRow>> {
        let content: Option<(Option<String>,)> = sqlx::query_as(
            "SELECT content FROM AgLibraryCollectionContent \
             WHERE collection = ? AND owningModule = ?",
        )
        .bind(collection_id)
        .bind(SMART_COLLECTION_MODULE)
        .fetch_optional(&self.pool)
        .await?;

        let Some((Some(content),)) = content else {
            return Err(LibraryError::Unsupported(format!(
                "smart collection {} has no stored rules",
                collection_id
            )));
        };

        let filter = RuleGroup::parse(&content)?.to_filter()?;
        debug!(collection_id, condition = %filter.sql, "Evaluating smart collection");

        let mut sql = String::from(
            "SELECT f.baseName AS base_name, \
                    f.extension AS extension, \
                    i.id_global AS item_key, \
                    i.captureTime AS capture_time \
             FROM Adobe_images i \
             JOIN AgLibraryFile f ON f.id_local = i.rootFile",
        );
        if filter.needs_folder {
            sql.push_str(
                " LEFT JOIN AgLibraryFolder fo ON fo.id_local = f.folder \
                 LEFT JOIN AgLibraryRootFolder rf ON rf.id_local = fo.rootFolder",
            );
        }
        sql.push_str(" WHERE ");
        sql.push_str(&filter.sql);
        sql.push_str(" ORDER BY i.id_local");

        let mut query = sqlx::query_as::<_, MediaRow>(&sql);
        for bind in filter.binds {
            query = match bind {
                BindValue::Text(value) => query.bind(value),
                BindValue::F64(value) => query.bind(value),
            };
        }

        Ok(query.fetch_all(&self.pool).await?)
    }
}

/// Names from the root down to `row`. A broken or cyclic parent chain
/// stops the walk at the last node reached.
fn hierarchy_path(row: &CollectionRow, by_id: &HashMap<i64, &CollectionRow>) -> Vec<String> {
    let mut names = vec![row.name.clone().unwrap_or_default()];
    let mut visited = HashSet::from([row.id_local]);
    let mut parent = row.parent;

    while let Some(parent_id) = parent {
        if !visited.insert(parent_id) {
            warn!(collection_id = row.id_local, parent_id, "Cycle in collection hierarchy");
            break;
        }
        match by_id.get(&parent_id) {
            Some(node) => {
                names.push(node.name.clone().unwrap_or_default());
                parent = node.parent;
            }
            None => break,
        }
    }

    names.reverse();
    names
}

#[async_trait]
impl CatalogReader for LightroomCatalog {
    #[instrument(skip(self))]
    async fn list_collections(&self) -> BridgeResult<Vec<CatalogCollection>> {
        Ok(self.collections().await?)
    }

    #[instrument(skip(self))]
    async fn list_media(&self, collection_id: i64) -> BridgeResult<Vec<MediaReference>> {
        Ok(self.media(collection_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::BridgeError;
    use chrono::NaiveDate;
    use sqlx::sqlite::SqlitePoolOptions;

    const SCHEMA: &str = r#"
        CREATE TABLE AgLibraryCollection (
            id_local INTEGER PRIMARY KEY,
            creationId TEXT NOT NULL DEFAULT '',
            genealogy TEXT NOT NULL DEFAULT '',
            imageCount NUMBER,
            name TEXT NOT NULL DEFAULT '',
            parent INTEGER,
            systemOnly INTEGER NOT NULL DEFAULT 0
        );
        CREATE TABLE AgLibraryCollectionImage (
            id_local INTEGER PRIMARY KEY,
            collection INTEGER NOT NULL DEFAULT 0,
            image INTEGER NOT NULL DEFAULT 0
        );
        CREATE TABLE Adobe_images (
            id_local INTEGER PRIMARY KEY,
            id_global TEXT UNIQUE NOT NULL,
            captureTime TEXT,
            colorLabels NOT NULL DEFAULT '',
            fileFormat NOT NULL DEFAULT 'unset',
            masterImage INTEGER,
            pick NOT NULL DEFAULT 0,
            rating,
            rootFile INTEGER NOT NULL DEFAULT 0
        );
        CREATE TABLE AgLibraryFile (
            id_local INTEGER PRIMARY KEY,
            baseName TEXT NOT NULL DEFAULT '',
            extension TEXT NOT NULL DEFAULT '',
            folder INTEGER NOT NULL DEFAULT 0
        );
        CREATE TABLE AgLibraryFolder (
            id_local INTEGER PRIMARY KEY,
            pathFromRoot TEXT NOT NULL DEFAULT '',
            rootFolder INTEGER NOT NULL DEFAULT 0
        );
        CREATE TABLE AgLibraryRootFolder (
            id_local INTEGER PRIMARY KEY,
            absolutePath TEXT UNIQUE NOT NULL DEFAULT '',
            name TEXT NOT NULL DEFAULT ''
        );
        CREATE TABLE AgLibraryCollectionContent (
            id_local INTEGER PRIMARY KEY,
            collection INTEGER NOT NULL DEFAULT 0,
            content,
            owningModule TEXT
        );
        CREATE TABLE AgLibraryKeyword (
            id_local INTEGER PRIMARY KEY,
            lc_name TEXT,
            name TEXT
        );
        CREATE TABLE AgLibraryKeywordImage (
            id_local INTEGER PRIMARY KEY,
            image INTEGER NOT NULL DEFAULT 0,
            tag INTEGER NOT NULL DEFAULT 0
        );
    "#;

    const FIVE_STARS_RULES: &str = r#"s = {
	{
		criteria = "rating",
		operation = ">=",
		value = 5,
		value2 = 0,
	},
	combine = "intersect",
}"#;

    async fn setup_catalog() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::raw_sql(SCHEMA).execute(&pool).await.unwrap();

        // 2023 (set) > Family (set) > Christmas, Birthday ; Smart: Five Stars
        sqlx::raw_sql(
            r#"
            INSERT INTO AgLibraryCollection (id_local, creationId, name, parent) VALUES
                (10, 'com.adobe.ag.library.group', '2023', NULL),
                (11, 'com.adobe.ag.library.group', 'Family', 10),
                (12, 'com.adobe.ag.library.collection', 'Christmas', 11),
                (13, 'com.adobe.ag.library.collection', 'Birthday', 11),
                (14, 'com.adobe.ag.library.smart_collection', 'Five Stars', NULL),
                (15, 'com.adobe.ag.webGallery', 'Portfolio', NULL);

            INSERT INTO AgLibraryRootFolder (id_local, absolutePath, name) VALUES
                (1, '/Photos/', 'Photos');

            INSERT INTO AgLibraryFolder (id_local, pathFromRoot, rootFolder) VALUES
                (30, '2023/Christmas/', 1),
                (31, 'misc/', 1);

            INSERT INTO AgLibraryFile (id_local, baseName, extension, folder) VALUES
                (100, 'IMG_0001', 'CR3', 30),
                (101, 'IMG_0002', 'jpg', 30),
                (102, 'README', '', 31),
                (103, '', 'jpg', 31);

            INSERT INTO Adobe_images
                (id_local, id_global, captureTime, masterImage, rootFile, rating, pick, colorLabels, fileFormat) VALUES
                (200, 'uuid-a', '2023-12-24T18:03:12.45', NULL, 100, 5, 0, 'Red', 'RAW'),
                (201, 'uuid-b', '2023-12-24T19:00:00', NULL, 101, 3, 1, '', 'JPG'),
                (202, 'uuid-a-copy', '2023-12-24T18:03:12.45', 200, 100, NULL, 0, '', 'RAW'),
                (203, 'uuid-readme', NULL, NULL, 102, 2, -1, 'Blue', 'unset'),
                (204, 'uuid-nameless', NULL, NULL, 103, 5, 0, '', 'JPG');

            INSERT INTO AgLibraryKeyword (id_local, lc_name, name) VALUES
                (40, 'xmas eve', 'Xmas Eve'),
                (41, 'family', 'Family');

            INSERT INTO AgLibraryKeywordImage (image, tag) VALUES
                (203, 40), (201, 41);

            INSERT INTO AgLibraryCollectionImage (collection, image) VALUES
                (12, 200), (12, 201),
                (13, 202),
                (15, 203), (15, 204);
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        add_smart_rules(&pool, 14, FIVE_STARS_RULES).await;
        pool
    }

    async fn add_smart_rules(pool: &SqlitePool, collection: i64, rules: &str) {
        sqlx::query(
            "INSERT INTO AgLibraryCollectionContent (collection, content, owningModule) VALUES (?, ?, ?)",
        )
        .bind(collection)
        .bind(rules)
        .bind(SMART_COLLECTION_MODULE)
        .execute(pool)
        .await
        .unwrap();
    }

    async fn add_smart_collection(pool: &SqlitePool, id: i64, name: &str, rules: &str) {
        sqlx::query("INSERT INTO AgLibraryCollection (id_local, creationId, name) VALUES (?, ?, ?)")
            .bind(id)
            .bind(CREATION_ID_SMART_COLLECTION)
            .bind(name)
            .execute(pool)
            .await
            .unwrap();
        add_smart_rules(pool, id, rules).await;
    }

    fn keys(media: &[MediaReference]) -> Vec<&str> {
        media.iter().map(|m| m.item_key.as_str()).collect()
    }

    #[tokio::test]
    async fn test_collections_have_full_paths_in_depth_first_order() {
        let catalog = LightroomCatalog::from_pool(setup_catalog().await);
        let collections = catalog.list_collections().await.unwrap();

        let paths: Vec<Vec<&str>> = collections
            .iter()
            .map(|c| c.path.iter().map(String::as_str).collect())
            .collect();

        assert_eq!(
            paths,
            vec![
                vec!["2023"],
                vec!["2023", "Family"],
                vec!["2023", "Family", "Birthday"],
                vec!["2023", "Family", "Christmas"],
                vec!["Five Stars"],
                vec!["Portfolio"],
            ]
        );
        assert_eq!(collections[0].kind, NodeKind::Group);
        assert_eq!(collections[3].kind, NodeKind::Collection);
        assert_eq!(collections[4].kind, NodeKind::SmartCollection);
        assert_eq!(
            collections[5].kind,
            NodeKind::Other("com.adobe.ag.webGallery".to_string())
        );
    }

    #[tokio::test]
    async fn test_media_joins_files_and_parses_capture_time() {
        let catalog = LightroomCatalog::from_pool(setup_catalog().await);
        let media = catalog.list_media(12).await.unwrap();

        assert_eq!(media.len(), 2);
        assert_eq!(media[0].file_name, "IMG_0001.CR3");
        assert_eq!(media[0].item_key, "uuid-a");
        assert_eq!(
            media[0].capture_time,
            NaiveDate::from_ymd_opt(2023, 12, 24)
                .unwrap()
                .and_hms_milli_opt(18, 3, 12, 450)
        );
        assert_eq!(media[1].file_name, "IMG_0002.jpg");
    }

    #[tokio::test]
    async fn test_virtual_copy_has_its_own_key_and_same_file() {
        let catalog = LightroomCatalog::from_pool(setup_catalog().await);
        let media = catalog.list_media(13).await.unwrap();

        assert_eq!(media.len(), 1);
        assert_eq!(media[0].file_name, "IMG_0001.CR3");
        assert_eq!(media[0].item_key, "uuid-a-copy");
    }

    #[tokio::test]
    async fn test_rows_without_name_are_dropped_and_bare_names_kept() {
        let catalog = LightroomCatalog::from_pool(setup_catalog().await);
        let media = catalog.list_media(15).await.unwrap();

        assert_eq!(media.len(), 1);
        assert_eq!(media[0].file_name, "README");
        assert_eq!(media[0].capture_time, None);
    }

    #[tokio::test]
    async fn test_smart_collection_members_come_from_rules() {
        let catalog = LightroomCatalog::from_pool(setup_catalog().await);
        let media = catalog.list_media(14).await.unwrap();

        // rating >= 5; the nameless file is dropped like any other row
        assert_eq!(keys(&media), vec!["uuid-a"]);
        assert_eq!(media[0].file_name, "IMG_0001.CR3");
        assert!(media[0].capture_time.is_some());
    }

    #[tokio::test]
    async fn test_smart_collection_any_of_pick_and_keyword() {
        let pool = setup_catalog().await;
        add_smart_collection(
            &pool,
            16,
            "Flagged or Xmas",
            r#"s = {
                { criteria = "pick", operation = "==", value = 1 },
                { criteria = "keywords", operation = "any", value = "xmas" },
                combine = "union",
            }"#,
        )
        .await;

        let catalog = LightroomCatalog::from_pool(pool);
        assert_eq!(
            keys(&catalog.list_media(16).await.unwrap()),
            vec!["uuid-b", "uuid-readme"]
        );
    }

    #[tokio::test]
    async fn test_smart_collection_folder_date_and_nested_exclude() {
        let pool = setup_catalog().await;
        add_smart_collection(
            &pool,
            17,
            "Christmas Eve, not red",
            r#"s = {
                { criteria = "folder", operation = "any", value = "Christmas" },
                { criteria = "captureTime", operation = "in", value = "2023-12-24", value2 = "2023-12-24" },
                {
                    { criteria = "labelColor", operation = "==", value = "red" },
                    combine = "exclude",
                },
                combine = "intersect",
            }"#,
        )
        .await;

        let catalog = LightroomCatalog::from_pool(pool);
        assert_eq!(
            keys(&catalog.list_media(17).await.unwrap()),
            vec!["uuid-b", "uuid-a-copy"]
        );
    }

    #[tokio::test]
    async fn test_smart_collection_file_format_and_name() {
        let pool = setup_catalog().await;
        add_smart_collection(
            &pool,
            18,
            "Raw 0001",
            r#"s = {
                { criteria = "fileFormat", operation = "==", value = "raw" },
                { criteria = "filename", operation = "endsWith", value = "0001.cr3" },
                combine = "intersect",
            }"#,
        )
        .await;

        let catalog = LightroomCatalog::from_pool(pool);
        assert_eq!(
            keys(&catalog.list_media(18).await.unwrap()),
            vec!["uuid-a", "uuid-a-copy"]
        );
    }

    #[tokio::test]
    async fn test_untranslatable_smart_rules_are_unsupported() {
        let pool = setup_catalog().await;
        add_smart_collection(
            &pool,
            19,
            "Recently edited",
            r#"s = { { criteria = "touchTime", operation = "inLast", value = 7 }, combine = "intersect" }"#,
        )
        .await;
        sqlx::query("INSERT INTO AgLibraryCollection (id_local, creationId, name) VALUES (20, ?, 'No rules')")
            .bind(CREATION_ID_SMART_COLLECTION)
            .execute(&pool)
            .await
            .unwrap();

        let catalog = LightroomCatalog::from_pool(pool);
        assert!(matches!(
            catalog.list_media(19).await,
            Err(BridgeError::Unsupported(msg)) if msg.contains("touchTime")
        ));
        assert!(matches!(
            catalog.list_media(20).await,
            Err(BridgeError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_collection_is_an_error() {
        let catalog = LightroomCatalog::from_pool(setup_catalog().await);
        assert!(matches!(
            catalog.media(999).await,
            Err(LibraryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_cyclic_parents_terminate() {
        let pool = setup_catalog().await;
        sqlx::raw_sql(
            r#"
            INSERT INTO AgLibraryCollection (id_local, creationId, name, parent) VALUES
                (20, 'com.adobe.ag.library.group', 'Loop A', 21),
                (21, 'com.adobe.ag.library.collection', 'Loop B', 20);
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        let catalog = LightroomCatalog::from_pool(pool);
        let collections = catalog.collections().await.unwrap();
        let loop_b = collections.iter().find(|c| c.id == 21).unwrap();
        assert_eq!(loop_b.path, vec!["Loop A".to_string(), "Loop B".to_string()]);
    }

    #[tokio::test]
    async fn test_open_reads_catalog_file() {
        let path = std::env::temp_dir().join(format!(
            "lr2immich-catalog-{}.lrcat",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(
                sqlx::sqlite::SqliteConnectOptions::new()
                    .filename(&path)
                    .create_if_missing(true),
            )
            .await
            .unwrap();
        sqlx::raw_sql(SCHEMA).execute(&writer).await.unwrap();
        sqlx::query(
            "INSERT INTO AgLibraryCollection (id_local, creationId, name) VALUES (1, ?, 'Trips')",
        )
        .bind(CREATION_ID_COLLECTION)
        .execute(&writer)
        .await
        .unwrap();
        writer.close().await;

        let catalog = LightroomCatalog::open(&path).await.unwrap();
        let collections = catalog.list_collections().await.unwrap();
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].path, vec!["Trips".to_string()]);
        drop(catalog);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_parse_capture_time_variants() {
        let expected = NaiveDate::from_ymd_opt(2021, 7, 14)
            .unwrap()
            .and_hms_opt(10, 22, 13)
            .unwrap();
        assert_eq!(parse_capture_time("2021-07-14T10:22:13"), Some(expected));
        assert_eq!(parse_capture_time("2021-07-14T10:22:13+02:00"), Some(expected));
        assert!(parse_capture_time("2021-07-14T10:22:13.5").is_some());
        assert_eq!(parse_capture_time("yesterday"), None);
    }
}
