//! Immich API connector implementation
//!
//! Implements the `PhotoService` trait for the Immich REST API.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
use bridge_traits::photos::{
    AlbumDetails, AssetPage, AssetSearch, MemberAddResult, PhotoService, RemoteAlbum,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::ImmichError;
use crate::types::{
    AlbumResponse, BulkIdResponse, BulkIdsRequest, CreateAlbumRequest, ErrorResponse,
    MetadataSearchRequest, SearchResponse,
};

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-api-key";

/// Default per-request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Immich API connector
///
/// Implements `PhotoService` against an Immich server.
///
/// # Features
///
/// - API-key authentication via the `x-api-key` header
/// - Retries reads and idempotent writes with the configured policy
/// - Album creation is sent exactly once, never retried, so a timeout
///   cannot produce a duplicate album
///
/// # Example
///
/// ```ignore
/// use provider_immich::ImmichConnector;
/// use bridge_traits::photos::PhotoService;
///
/// let connector = ImmichConnector::new(http_client, "https://photos.example.com/api", api_key);
/// let albums = connector.list_albums().await?;
/// ```
pub struct ImmichConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// API base URL without trailing slash
    base_url: String,

    api_key: String,

    retry_policy: RetryPolicy,

    timeout: Duration,
}

impl ImmichConnector {
    /// Create a new Immich connector
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `base_url` - API root, e.g. `https://photos.example.com/api`
    /// * `api_key` - API key with album and asset read/write permissions
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            retry_policy: RetryPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Policy used for every request except album creation
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest::new(method, format!("{}{}", self.base_url, path))
            .header(API_KEY_HEADER, self.api_key.as_str())
            .header("Accept", "application/json")
            .timeout(self.timeout)
    }

    /// Send a request and turn non-2xx statuses into `ImmichError`.
    async fn send(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
        album_id: Option<&str>,
    ) -> std::result::Result<HttpResponse, ImmichError> {
        let method = request.method;
        let url = request.url.clone();
        let response = self.http_client.execute_with_retry(request, policy).await?;

        if response.is_success() {
            debug!(?method, status = response.status, "API request succeeded");
            return Ok(response);
        }

        let message = serde_json::from_slice::<ErrorResponse>(&response.body)
            .ok()
            .and_then(ErrorResponse::into_message)
            .unwrap_or_else(|| String::from_utf8_lossy(&response.body).into_owned());

        warn!(?method, url = %url, status = response.status, %message, "API request failed");
        Err(ImmichError::from_status(response.status, message, album_id))
    }

    fn parse<T: DeserializeOwned>(
        response: &HttpResponse,
        what: &str,
    ) -> std::result::Result<T, ImmichError> {
        serde_json::from_slice(&response.body)
            .map_err(|e| ImmichError::ParseError(format!("Failed to parse {}: {}", what, e)))
    }

    fn album_path(album_id: &str) -> String {
        format!("/albums/{}", urlencoding::encode(album_id))
    }
}

#[async_trait]
impl PhotoService for ImmichConnector {
    #[instrument(skip(self))]
    async fn list_albums(&self) -> Result<Vec<RemoteAlbum>> {
        let request = self.request(HttpMethod::Get, "/albums");
        let response = self.send(request, self.retry_policy.clone(), None).await?;
        let albums: Vec<AlbumResponse> = Self::parse(&response, "album list")?;

        info!(count = albums.len(), "Fetched remote albums");
        Ok(albums.into_iter().map(RemoteAlbum::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_album(&self, album_id: &str) -> Result<AlbumDetails> {
        let path = format!("{}?withoutAssets=false", Self::album_path(album_id));
        let request = self.request(HttpMethod::Get, &path);
        let response = self
            .send(request, self.retry_policy.clone(), Some(album_id))
            .await?;
        let album: AlbumResponse = Self::parse(&response, "album")?;

        debug!(members = album.assets.len(), "Fetched album members");
        Ok(album.into())
    }

    #[instrument(skip(self))]
    async fn create_album(&self, name: &str) -> Result<RemoteAlbum> {
        let request = self
            .request(HttpMethod::Post, "/albums")
            .json(&CreateAlbumRequest { album_name: name })?;
        let response = self.send(request, RetryPolicy::no_retry(), None).await?;
        let album: AlbumResponse = Self::parse(&response, "created album")?;

        info!(album_id = %album.id, "Created album");
        Ok(album.into())
    }

    #[instrument(skip(self, asset_ids), fields(count = asset_ids.len()))]
    async fn add_members(
        &self,
        album_id: &str,
        asset_ids: &[String],
    ) -> Result<Vec<MemberAddResult>> {
        let path = format!("{}/assets", Self::album_path(album_id));
        let request = self
            .request(HttpMethod::Put, &path)
            .json(&BulkIdsRequest { ids: asset_ids })?;
        let response = self
            .send(request, self.retry_policy.clone(), Some(album_id))
            .await?;
        let results: Vec<BulkIdResponse> = Self::parse(&response, "membership results")?;

        Ok(results.into_iter().map(MemberAddResult::from).collect())
    }

    #[instrument(skip(self, search), fields(file_name = %search.original_file_name, page = search.page))]
    async fn search_by_filename(&self, search: &AssetSearch) -> Result<AssetPage> {
        let request = self
            .request(HttpMethod::Post, "/search/metadata")
            .json(&MetadataSearchRequest {
                original_file_name: &search.original_file_name,
                with_deleted: false,
                page: search.page,
                size: search.page_size,
            })?;
        let response = self.send(request, self.retry_policy.clone(), None).await?;
        let body: SearchResponse = Self::parse(&response, "search results")?;

        Ok(body.assets.into())
    }
}
