//! Raster tile layer and its loaders

use std::any::Any;
use std::sync::Arc;

use bytes::Bytes;
use quick_cache::sync::Cache;

use super::Layer;
use crate::layer::attribution::Attribution;
use crate::messenger::Messenger;
use crate::tile_schema::{TileIndex, TileSchema};
use crate::view::MapView;

mod builder;
mod loader;

pub use builder::RasterTileLayerBuilder;
pub use loader::{RasterTileLoader, RestTileLoader};

const TILE_CACHE_CAPACITY: usize = 5000;

/// Raster tile layers load prerendered tile sets using a [tile loader](RasterTileLoader) and keep
/// them ready for the front end to draw.
pub struct RasterTileLayer {
    tile_loader: Arc<dyn RasterTileLoader>,
    tile_schema: TileSchema,
    tiles: Arc<Cache<TileIndex, Arc<TileState>>>,
    messenger: Option<Arc<dyn Messenger>>,
    attribution: Option<Attribution>,
}

impl std::fmt::Debug for RasterTileLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterTileLayer")
            .field("tile_schema", &self.tile_schema)
            .field("attribution", &self.attribution)
            .finish()
    }
}

/// Loading state of a single tile.
#[derive(Debug)]
pub enum TileState {
    /// Request is in flight.
    Loading,
    /// Tile image bytes.
    Loaded(Bytes),
    /// Loading failed. The tile is not requested again.
    Error,
}

impl RasterTileLayer {
    /// Creates a new layer.
    pub fn new(
        tile_schema: TileSchema,
        tile_loader: impl RasterTileLoader + 'static,
        messenger: Option<Arc<dyn Messenger>>,
    ) -> Self {
        Self::new_raw(Box::new(tile_loader), tile_schema, messenger, None)
    }

    fn new_raw(
        tile_loader: Box<dyn RasterTileLoader>,
        tile_schema: TileSchema,
        messenger: Option<Arc<dyn Messenger>>,
        attribution: Option<Attribution>,
    ) -> Self {
        Self {
            tile_loader: tile_loader.into(),
            tile_schema,
            tiles: Arc::new(Cache::new(TILE_CACHE_CAPACITY)),
            messenger,
            attribution,
        }
    }

    async fn load_tile(
        index: TileIndex,
        tile_loader: Arc<dyn RasterTileLoader>,
        tiles: &Cache<TileIndex, Arc<TileState>>,
        messenger: Option<Arc<dyn Messenger>>,
    ) {
        match tiles.get_value_or_guard_async(&index).await {
            Ok(_) => {}
            Err(guard) => {
                let _ = guard.insert(Arc::new(TileState::Loading));
                match tile_loader.load(index).await {
                    Ok(bytes) => {
                        tiles.insert(index, Arc::new(TileState::Loaded(bytes)));

                        if let Some(messenger) = messenger {
                            messenger.request_redraw();
                        }
                    }
                    Err(err) => {
                        log::debug!("Failed to load tile {index:?}: {err}");
                        tiles.insert(index, Arc::new(TileState::Error))
                    }
                }
            }
        }
    }

    /// Loads tiles for the given `view` and waits until all of them are done.
    pub async fn load_tiles(&self, view: &MapView) {
        if let Some(iter) = self.tile_schema.iter_tiles(view) {
            for index in iter {
                Self::load_tile(
                    index,
                    self.tile_loader.clone(),
                    &self.tiles,
                    self.messenger.clone(),
                )
                .await;
            }
        }
    }

    /// State of the tile, if it was ever requested.
    pub fn tile_state(&self, index: &TileIndex) -> Option<Arc<TileState>> {
        self.tiles.get(index)
    }

    /// Tiles of the `view` that are loaded and ready to be drawn.
    pub fn loaded_tiles(&self, view: &MapView) -> Vec<(TileIndex, Bytes)> {
        let Some(iter) = self.tile_schema.iter_tiles(view) else {
            return vec![];
        };

        iter.filter_map(|index| match self.tiles.get(&index)?.as_ref() {
            TileState::Loaded(bytes) => Some((index, bytes.clone())),
            _ => None,
        })
        .collect()
    }

    /// Returns tile schema of the layer.
    pub fn tile_schema(&self) -> &TileSchema {
        &self.tile_schema
    }
}

impl Layer for RasterTileLayer {
    fn prepare(&self, view: &MapView) {
        if let Some(iter) = self.tile_schema.iter_tiles(view) {
            for index in iter {
                if self.tiles.get(&index).is_some() {
                    continue;
                }

                let tile_loader = self.tile_loader.clone();
                let tiles = self.tiles.clone();
                let messenger = self.messenger.clone();
                crate::async_runtime::spawn(async move {
                    Self::load_tile(index, tile_loader, &tiles, messenger).await;
                });
            }
        }
    }

    fn set_messenger(&mut self, messenger: Box<dyn Messenger>) {
        self.messenger = Some(Arc::from(messenger));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn attribution(&self) -> Option<Attribution> {
        self.attribution.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;
    use webgis_types::{latlon, Size};

    use super::*;
    use crate::layer::data_provider::UrlTemplate;
    use crate::tests::TestPlatform;

    #[derive(Default)]
    struct CountingMessenger(AtomicUsize);

    impl Messenger for CountingMessenger {
        fn request_redraw(&self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn view() -> MapView {
        MapView::from_zoom(&latlon!(0.0, 0.0), 1).with_size(Size::new(512.0, 512.0))
    }

    #[test]
    fn load_tiles_for_view() {
        let platform = Arc::new(TestPlatform::new().with_route("osm.test/1/", "png"));
        let messenger = Arc::new(CountingMessenger::default());
        let layer = RasterTileLayerBuilder::new_rest(|index: &TileIndex| {
            format!("https://osm.test/{}/{}/{}.png", index.z, index.x, index.y)
        })
        .with_platform(platform.clone())
        .with_messenger(messenger.clone())
        .build()
        .unwrap();

        tokio_test::block_on(layer.load_tiles(&view()));

        assert_eq!(platform.requests().len(), 4);
        assert_eq!(layer.loaded_tiles(&view()).len(), 4);
        assert_eq!(messenger.0.load(Ordering::Relaxed), 4);

        // Already loaded tiles are not requested again.
        tokio_test::block_on(layer.load_tiles(&view()));
        assert_eq!(platform.requests().len(), 4);
    }

    #[test]
    fn failed_tiles_are_marked() {
        let platform = Arc::new(TestPlatform::new());
        let template =
            UrlTemplate::parse("https://tile.openstreetmap.org/{z}/{x}/{y}.png").unwrap();
        let layer = RasterTileLayerBuilder::new_from_template(template)
            .with_platform(platform.clone())
            .build()
            .unwrap();

        tokio_test::block_on(layer.load_tiles(&view()));
        assert!(layer.loaded_tiles(&view()).is_empty());
        assert_matches!(
            layer.tile_state(&TileIndex::new(0, 0, 1)).as_deref(),
            Some(TileState::Error)
        );
        assert!(platform.requests()[0].starts_with("https://tile.openstreetmap.org/1/"));
    }

    #[test]
    fn prepare_spawns_loading() {
        let platform = Arc::new(TestPlatform::new().with_route("osm.test", "png"));
        let layer = RasterTileLayerBuilder::new_rest(|index: &TileIndex| {
            format!("https://osm.test/{}/{}/{}.png", index.z, index.x, index.y)
        })
        .with_platform(platform.clone())
        .build()
        .unwrap();

        tokio_test::block_on(async {
            layer.prepare(&view());
            for _ in 0..100 {
                if layer.loaded_tiles(&view()).len() == 4 {
                    break;
                }
                tokio::task::yield_now().await;
            }
        });

        assert_eq!(layer.loaded_tiles(&view()).len(), 4);
    }
}
