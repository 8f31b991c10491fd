use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;

use super::{RasterTileLayer, RestTileLoader};
use crate::error::WebGisError;
use crate::layer::attribution::Attribution;
use crate::layer::data_provider::{
    FileCacheController, PersistentCacheController, UrlSource, UrlTemplate,
};
use crate::messenger::Messenger;
use crate::platform::PlatformService;
use crate::tile_schema::{TileIndex, TileSchema};

const DEFAULT_LODS_COUNT: u32 = 20;

/// Constructor for a [`RasterTileLayer`].
///
/// ```no_run
/// use std::sync::Arc;
/// use webgis::layer::data_provider::UrlTemplate;
/// use webgis::layer::raster_tile_layer::RasterTileLayerBuilder;
/// use webgis::platform::NativePlatformService;
///
/// let platform = Arc::new(NativePlatformService::new("webgis", ".")?);
/// let template = UrlTemplate::parse("https://tile.openstreetmap.org/{z}/{x}/{y}.png")?;
/// let layer = RasterTileLayerBuilder::new_from_template(template)
///     .with_platform(platform)
///     .with_file_cache("target")
///     .build()?;
/// # Ok::<(), webgis::error::WebGisError>(())
/// ```
pub struct RasterTileLayerBuilder {
    url_source: Box<dyn UrlSource<TileIndex>>,
    platform: Option<Arc<dyn PlatformService>>,
    tile_schema: Option<TileSchema>,
    messenger: Option<Arc<dyn Messenger>>,
    file_cache: Option<PathBuf>,
    attribution: Option<Attribution>,
}

impl RasterTileLayerBuilder {
    /// Initializes a builder for a layer that requests tiles from the given url source.
    pub fn new_rest(tile_source: impl UrlSource<TileIndex> + 'static) -> Self {
        Self {
            url_source: Box::new(tile_source),
            platform: None,
            tile_schema: None,
            messenger: None,
            file_cache: None,
            attribution: None,
        }
    }

    /// Initializes a builder for a layer with an XYZ url template, e.g.
    /// `https://{a-c}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}.png`.
    pub fn new_from_template(template: UrlTemplate) -> Self {
        Self::new_rest(move |index: &TileIndex| template.url(index))
    }

    /// Sets the service the tiles are loaded with. Required.
    pub fn with_platform(mut self, platform: Arc<dyn PlatformService>) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Stores loaded tiles as files in the given folder and reads them from there before
    /// requesting.
    pub fn with_file_cache(mut self, path: impl AsRef<Path>) -> Self {
        self.file_cache = Some(path.as_ref().into());
        self
    }

    /// Sets the layer's tile schema.
    ///
    /// Defaults to `TileSchema::web(20)`.
    pub fn with_tile_schema(mut self, tile_schema: TileSchema) -> Self {
        self.tile_schema = Some(tile_schema);
        self
    }

    /// Sets the layer's messenger, notified when a new tile is loaded.
    pub fn with_messenger(mut self, messenger: impl Messenger + 'static) -> Self {
        self.messenger = Some(Arc::new(messenger));
        self
    }

    /// Sets the attribution of the layer.
    pub fn with_attribution(mut self, attribution: Attribution) -> Self {
        self.attribution = Some(attribution);
        self
    }

    /// Consumes the builder and constructs the raster tile layer.
    ///
    /// Will return an error if the platform service is not set or if the file cache folder
    /// cannot be created.
    pub fn build(self) -> Result<RasterTileLayer, WebGisError> {
        let Self {
            url_source,
            platform,
            tile_schema,
            messenger,
            file_cache,
            attribution,
        } = self;

        let tile_schema = tile_schema.unwrap_or_else(|| TileSchema::web(DEFAULT_LODS_COUNT));

        let Some(platform) = platform else {
            return Err(WebGisError::Config(
                "platform service is not set for a url tile source".into(),
            ));
        };

        let cache: Option<Box<dyn PersistentCacheController<str, Bytes>>> = match file_cache {
            Some(path) => Some(Box::new(FileCacheController::new(&path)?)),
            None => None,
        };

        Ok(RasterTileLayer::new_raw(
            Box::new(RestTileLoader::new(url_source, platform, cache)),
            tile_schema,
            messenger,
            attribution,
        ))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use webgis_types::{latlon, Size};

    use super::*;
    use crate::tests::TestPlatform;
    use crate::view::MapView;

    fn osm() -> RasterTileLayerBuilder {
        let template =
            UrlTemplate::parse("https://tile.openstreetmap.org/{z}/{x}/{y}.png").unwrap();
        RasterTileLayerBuilder::new_from_template(template)
    }

    fn platform() -> Arc<dyn PlatformService> {
        Arc::new(TestPlatform::new())
    }

    #[test]
    fn default_tile_schema() {
        let layer = osm().with_platform(platform()).build().unwrap();
        assert_eq!(*layer.tile_schema(), TileSchema::web(DEFAULT_LODS_COUNT));
    }

    #[test]
    fn keeps_attribution() {
        let layer = osm()
            .with_platform(platform())
            .with_attribution(Attribution::new("© OpenStreetMap contributors", None))
            .build()
            .unwrap();
        let attribution = crate::layer::Layer::attribution(&layer).unwrap();
        assert_eq!(attribution.get_text(), "© OpenStreetMap contributors");
    }

    #[test]
    fn url_source_requires_platform() {
        assert_matches!(osm().build(), Err(WebGisError::Config(_)));
    }

    #[test]
    fn file_cached_tiles_are_requested_once() {
        let folder = std::env::temp_dir().join("webgis-builder-file-cache");
        let _ = std::fs::remove_dir_all(&folder);
        let platform =
            Arc::new(TestPlatform::new().with_route("tile.openstreetmap.org/1/", "png"));
        let view = MapView::from_zoom(&latlon!(0.0, 0.0), 1).with_size(Size::new(512.0, 512.0));

        let layer = osm()
            .with_platform(platform.clone())
            .with_file_cache(&folder)
            .build()
            .unwrap();
        tokio_test::block_on(layer.load_tiles(&view));
        assert_eq!(platform.requests().len(), 4);

        // A new layer over the same folder finds the tiles on disk.
        let layer = osm()
            .with_platform(platform.clone())
            .with_file_cache(&folder)
            .build()
            .unwrap();
        tokio_test::block_on(layer.load_tiles(&view));
        assert_eq!(layer.loaded_tiles(&view).len(), 4);
        assert_eq!(platform.requests().len(), 4);
    }

    #[test]
    fn file_cache_fails_build_if_cannot_init_folder() {
        let file = std::env::temp_dir().join("webgis-builder-not-a-folder");
        std::fs::write(&file, b"").unwrap();
        assert_matches!(
            osm().with_platform(platform()).with_file_cache(&file).build(),
            Err(WebGisError::Config(_))
        );
    }
}
