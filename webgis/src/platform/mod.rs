//! Provides platform specific logic and [`PlatformService`] to access it.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::WebGisError;

mod native;
pub use native::NativePlatformService;

/// Service providing data loading in a generic way.
///
/// Everything the viewer fetches (tiles, boundary files, WFS and WMS responses) goes through this
/// trait, so a viewer can be run against a real network or an in-memory double.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Loads a byte array from the given url. Urls without a scheme are resolved as files
    /// relative to the service's data directory.
    async fn load_bytes_from_url(&self, url: &str) -> Result<Bytes, WebGisError>;
}

/// Returns true if the url should be loaded over HTTP(S) rather than from the data directory.
pub fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
