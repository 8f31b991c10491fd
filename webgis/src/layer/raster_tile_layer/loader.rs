use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::WebGisError;
use crate::layer::data_provider::{PersistentCacheController, UrlSource};
use crate::platform::PlatformService;
use crate::tile_schema::TileIndex;

/// Loader of tiles for a [`RasterTileLayer`](super::RasterTileLayer).
#[async_trait]
pub trait RasterTileLoader: Send + Sync {
    /// Loads the tile with the given index.
    async fn load(&self, index: TileIndex) -> Result<Bytes, WebGisError>;
}

/// Raster tile loader that loads tiles one by one with REST HTTP GET requests.
///
/// Works with any protocol that uses a separate GET request per tile: OSM-like XYZ services,
/// CDN tile services and tiled WMS.
///
/// If constructed with a [`PersistentCacheController`] it caches the loaded tiles and only
/// requests new tiles from the source url if they are not in the cache.
pub struct RestTileLoader {
    url_source: Box<dyn UrlSource<TileIndex>>,
    platform_service: Arc<dyn PlatformService>,
    cache: Option<Box<dyn PersistentCacheController<str, Bytes>>>,
}

impl RestTileLoader {
    /// Creates a new instance of the loader.
    pub fn new(
        url_source: Box<dyn UrlSource<TileIndex>>,
        platform_service: Arc<dyn PlatformService>,
        cache: Option<Box<dyn PersistentCacheController<str, Bytes>>>,
    ) -> Self {
        Self {
            url_source,
            platform_service,
            cache,
        }
    }

    /// Url of the tile with the given index.
    pub fn tile_url(&self, index: &TileIndex) -> String {
        (self.url_source)(index)
    }
}

#[async_trait]
impl RasterTileLoader for RestTileLoader {
    async fn load(&self, index: TileIndex) -> Result<Bytes, WebGisError> {
        let url = self.tile_url(&index);

        if let Some(cache) = &self.cache {
            if let Some(data) = cache.get(&url) {
                return Ok(data);
            }
        }

        let data = self.platform_service.load_bytes_from_url(&url).await?;

        if let Some(cache) = &self.cache {
            if let Err(error) = cache.insert(&url, &data) {
                log::warn!("Failed to write persistent cache entry: {error:?}");
            }
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use parking_lot::Mutex;

    use super::*;
    use crate::tests::TestPlatform;

    #[derive(Default)]
    struct MemoryCache(Mutex<Vec<(String, Bytes)>>);

    impl PersistentCacheController<str, Bytes> for MemoryCache {
        fn get(&self, key: &str) -> Option<Bytes> {
            self.0
                .lock()
                .iter()
                .find(|(url, _)| url == key)
                .map(|(_, data)| data.clone())
        }

        fn insert(&self, key: &str, data: &Bytes) -> Result<(), WebGisError> {
            self.0.lock().push((key.to_string(), data.clone()));
            Ok(())
        }
    }

    fn url_source(index: &TileIndex) -> String {
        format!("https://tiles.test/{}/{}/{}.png", index.z, index.x, index.y)
    }

    #[test]
    fn loads_by_url() {
        let platform = Arc::new(TestPlatform::new().with_route("tiles.test/3/5/3.png", "tile"));
        let loader = RestTileLoader::new(Box::new(url_source), platform.clone(), None);

        let data = tokio_test::block_on(loader.load(TileIndex::new(5, 3, 3))).unwrap();
        assert_eq!(&data[..], b"tile");
        assert_eq!(platform.requests(), vec!["https://tiles.test/3/5/3.png"]);

        assert_matches!(
            tokio_test::block_on(loader.load(TileIndex::new(0, 0, 0))),
            Err(WebGisError::NotFound)
        );
    }

    #[test]
    fn cached_tiles_are_not_requested() {
        let platform = Arc::new(TestPlatform::new().with_route("tiles.test", "tile"));
        let loader = RestTileLoader::new(
            Box::new(url_source),
            platform.clone(),
            Some(Box::new(MemoryCache::default())),
        );

        tokio_test::block_on(loader.load(TileIndex::new(1, 1, 1))).unwrap();
        tokio_test::block_on(loader.load(TileIndex::new(1, 1, 1))).unwrap();
        assert_eq!(platform.requests().len(), 1);
    }
}
