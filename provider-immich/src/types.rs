//! Immich API request and response types
//!
//! Only the fields the mirror reads are modelled; everything else in the
//! payloads is ignored.

use bridge_traits::photos::{AlbumDetails, AssetPage, MemberAddResult, RemoteAlbum, RemoteAsset};
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Album as returned by `GET /albums` and `POST /albums`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumResponse {
    pub id: String,

    pub album_name: String,

    /// Present on `GET /albums/{id}`; omitted or empty in list responses
    #[serde(default)]
    pub assets: Vec<AssetResponse>,
}

impl From<AlbumResponse> for RemoteAlbum {
    fn from(album: AlbumResponse) -> Self {
        RemoteAlbum {
            id: album.id,
            name: album.album_name,
        }
    }
}

impl From<AlbumResponse> for AlbumDetails {
    fn from(album: AlbumResponse) -> Self {
        AlbumDetails {
            id: album.id,
            name: album.album_name,
            member_ids: album.assets.into_iter().map(|a| a.id).collect(),
        }
    }
}

/// Asset resource (subset)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetResponse {
    pub id: String,

    #[serde(default)]
    pub original_file_name: Option<String>,

    /// Capture time in the camera's local zone, serialized with a nominal `Z`
    #[serde(default)]
    pub local_date_time: Option<String>,
}

impl AssetResponse {
    fn parse_local_date_time(raw: &str) -> Option<NaiveDateTime> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.naive_utc())
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
            .ok()
    }
}

impl From<AssetResponse> for RemoteAsset {
    fn from(asset: AssetResponse) -> Self {
        RemoteAsset {
            local_date_time: asset
                .local_date_time
                .as_deref()
                .and_then(AssetResponse::parse_local_date_time),
            id: asset.id,
            original_file_name: asset.original_file_name,
        }
    }
}

/// `POST /albums` body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlbumRequest<'a> {
    pub album_name: &'a str,
}

/// `PUT /albums/{id}/assets` body
#[derive(Debug, Serialize)]
pub struct BulkIdsRequest<'a> {
    pub ids: &'a [String],
}

/// One element of the `PUT /albums/{id}/assets` response
#[derive(Debug, Clone, Deserialize)]
pub struct BulkIdResponse {
    pub id: String,
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl From<BulkIdResponse> for MemberAddResult {
    fn from(result: BulkIdResponse) -> Self {
        MemberAddResult {
            id: result.id,
            success: result.success,
            error: result.error,
        }
    }
}

/// `POST /search/metadata` body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataSearchRequest<'a> {
    pub original_file_name: &'a str,
    pub with_deleted: bool,
    pub page: u32,
    pub size: u32,
}

/// `POST /search/metadata` response
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub assets: SearchAssetsPage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAssetsPage {
    #[serde(default)]
    pub items: Vec<AssetResponse>,

    /// Next page number; a string in current servers, a number in some older ones
    #[serde(default)]
    pub next_page: Option<serde_json::Value>,
}

impl From<SearchAssetsPage> for AssetPage {
    fn from(page: SearchAssetsPage) -> Self {
        let next_page = match page.next_page {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        AssetPage {
            items: page.items.into_iter().map(RemoteAsset::from).collect(),
            next_page,
        }
    }
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// `message` is a string or, for validation failures, a list of strings.
    pub fn into_message(self) -> Option<String> {
        match self.message? {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_album_details_collects_member_ids() {
        let album: AlbumResponse = serde_json::from_str(
            r#"{"id":"al-1","albumName":"2023 > Family","assetCount":2,
                "assets":[{"id":"as-1"},{"id":"as-2"}]}"#,
        )
        .unwrap();

        let details = AlbumDetails::from(album);
        assert_eq!(details.name, "2023 > Family");
        assert_eq!(details.member_ids.len(), 2);
        assert!(details.member_ids.contains("as-2"));
    }

    #[test]
    fn test_local_date_time_keeps_wall_clock() {
        let asset: AssetResponse = serde_json::from_str(
            r#"{"id":"as-1","originalFileName":"IMG_0001.CR3",
                "localDateTime":"2023-12-24T18:03:12.000Z"}"#,
        )
        .unwrap();

        let remote = RemoteAsset::from(asset);
        assert_eq!(
            remote.local_date_time,
            NaiveDate::from_ymd_opt(2023, 12, 24)
                .unwrap()
                .and_hms_opt(18, 3, 12)
        );
    }

    #[test]
    fn test_next_page_string_or_number() {
        let page: SearchResponse =
            serde_json::from_str(r#"{"assets":{"items":[{"id":"a"}],"nextPage":"2"}}"#).unwrap();
        assert_eq!(AssetPage::from(page.assets).next_page.as_deref(), Some("2"));

        let page: SearchResponse =
            serde_json::from_str(r#"{"assets":{"items":[{"id":"a"}],"nextPage":3}}"#).unwrap();
        assert_eq!(AssetPage::from(page.assets).next_page.as_deref(), Some("3"));

        let page: SearchResponse =
            serde_json::from_str(r#"{"assets":{"items":[],"nextPage":null}}"#).unwrap();
        assert_eq!(AssetPage::from(page.assets).next_page, None);
    }

    #[test]
    fn test_error_message_list() {
        let body: ErrorResponse =
            serde_json::from_str(r#"{"message":["ids must be an array","ids must be UUIDs"]}"#)
                .unwrap();
        assert_eq!(
            body.into_message().as_deref(),
            Some("ids must be an array; ids must be UUIDs")
        );
    }
}
