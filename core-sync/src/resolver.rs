//! # Asset Resolver
//!
//! Turns a catalog [`MediaReference`] into a remote asset identifier.
//!
//! ## Workflow
//!
//! 1. Look the item key up in the [`IdentityCache`]; a hit returns at once
//! 2. Otherwise search the remote service by original file name, following
//!    pagination until no next page or an empty page
//! 3. No candidates: not found, nothing cached
//! 4. Several candidates: pick one according to [`AmbiguityPolicy`]
//! 5. Cache the chosen identifier under the item key

use crate::identity_cache::IdentityCache;
use crate::Result;
use bridge_traits::catalog::MediaReference;
use bridge_traits::photos::{AssetSearch, PhotoService, RemoteAsset};
use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Safety valve against a server that never stops paginating
const MAX_SEARCH_PAGES: u32 = 1_000;

/// How to choose between several assets sharing a file name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AmbiguityPolicy {
    /// Take the one candidate whose capture time equals the catalog's (to
    /// the second); fall back to the first result otherwise.
    #[default]
    PreferCaptureTime,
    /// Always take the first result in the server's order.
    FirstResult,
}

/// Outcome of resolving one media reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    CacheHit(String),
    Searched { remote_id: String, candidates: usize },
    NotFound,
}

impl Resolution {
    pub fn remote_id(&self) -> Option<&str> {
        match self {
            Resolution::CacheHit(id) => Some(id),
            Resolution::Searched { remote_id, .. } => Some(remote_id),
            Resolution::NotFound => None,
        }
    }

    pub fn into_remote_id(self) -> Option<String> {
        match self {
            Resolution::CacheHit(id) => Some(id),
            Resolution::Searched { remote_id, .. } => Some(remote_id),
            Resolution::NotFound => None,
        }
    }

    pub fn is_cache_hit(&self) -> bool {
        matches!(self, Resolution::CacheHit(_))
    }
}

pub struct AssetResolver {
    photos: Arc<dyn PhotoService>,
    cache: Arc<dyn IdentityCache>,
    page_size: u32,
    policy: AmbiguityPolicy,
}

impl AssetResolver {
    pub fn new(
        photos: Arc<dyn PhotoService>,
        cache: Arc<dyn IdentityCache>,
        page_size: u32,
    ) -> Self {
        Self {
            photos,
            cache,
            page_size: page_size.max(1),
            policy: AmbiguityPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: AmbiguityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolve one reference. Only remote search failures are errors.
    #[instrument(skip(self, media), fields(file_name = %media.file_name, item_key = %media.item_key))]
    pub async fn resolve(&self, media: &MediaReference) -> Result<Resolution> {
        if let Some(remote_id) = self.cache.get(&media.item_key).await {
            debug!(remote_id = %remote_id, "Cache hit");
            return Ok(Resolution::CacheHit(remote_id));
        }

        let candidates = self.search_all(&media.file_name).await?;
        if candidates.is_empty() {
            debug!("Not found remotely");
            return Ok(Resolution::NotFound);
        }

        let chosen = self.choose(media, &candidates).id.clone();
        self.cache.set(&media.item_key, &chosen).await;

        Ok(Resolution::Searched {
            remote_id: chosen,
            candidates: candidates.len(),
        })
    }

    /// All assets whose original file name equals `file_name`, across pages.
    async fn search_all(&self, file_name: &str) -> Result<Vec<RemoteAsset>> {
        let mut assets = Vec::new();
        let mut page = 1;

        loop {
            let result = self
                .photos
                .search_by_filename(&AssetSearch {
                    original_file_name: file_name.to_string(),
                    page,
                    page_size: self.page_size,
                })
                .await?;

            let has_more = result.has_more();
            let next = result.next_page.as_deref().and_then(|p| p.parse::<u32>().ok());
            assets.extend(result.items);

            if !has_more {
                break;
            }
            if page >= MAX_SEARCH_PAGES {
                warn!(file_name, pages = page, "Search pagination limit reached");
                break;
            }
            page = next.filter(|n| *n > page).unwrap_or(page + 1);
        }

        // The server matches substrings; keep exact names only
        assets.retain(|asset| match &asset.original_file_name {
            Some(name) => name.eq_ignore_ascii_case(file_name),
            None => true,
        });
        Ok(assets)
    }

    fn choose<'a>(&self, media: &MediaReference, candidates: &'a [RemoteAsset]) -> &'a RemoteAsset {
        let first = &candidates[0];
        if candidates.len() == 1 {
            return first;
        }

        if self.policy == AmbiguityPolicy::PreferCaptureTime {
            if let Some(taken) = media.capture_time {
                let mut matching = candidates
                    .iter()
                    .filter(|c| c.local_date_time.is_some_and(|t| same_second(t, taken)));
                if let (Some(only), None) = (matching.next(), matching.next()) {
                    warn!(
                        file_name = %media.file_name,
                        candidates = candidates.len(),
                        remote_id = %only.id,
                        capture_time = %taken,
                        resolution = "capture_time",
                        "Ambiguous match; settled by capture time"
                    );
                    return only;
                }
            }
        }

        warn!(
            file_name = %media.file_name,
            candidates = candidates.len(),
            remote_id = %first.id,
            "Ambiguous match; using first result"
        );
        first
    }
}

fn same_second(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.and_utc().timestamp() == b.and_utc().timestamp()
}
