//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! This crate provides production-ready implementations using
//! desktop-appropriate libraries:
//! - `HttpClient` using `reqwest`
//! - `CacheBackend` using a SQLite key-value store (`sqlx`)
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, SqliteCacheBackend};
//!
//! #[tokio::main]
//! async fn main() -> bridge_traits::error::Result<()> {
//!     let http_client = ReqwestHttpClient::new()?;
//!     let cache = SqliteCacheBackend::open("identity-cache.db").await?;
//!
//!     // Hand both to the sync bootstrap
//!     Ok(())
//! }
//! ```

mod cache_store;
mod http;

pub use cache_store::SqliteCacheBackend;
pub use http::ReqwestHttpClient;
