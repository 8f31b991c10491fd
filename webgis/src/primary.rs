//! The primary map surface: base tile layers and GeoServer boundary layers in Web Mercator.

use std::sync::Arc;

use parking_lot::RwLock;
use webgis_types::{Crs, Point2d, Size};

use crate::boundary::{BoundaryKind, Naming};
use crate::color::Color;
use crate::config::{TileSourceConfig, ViewerConfig};
use crate::control::{
    EventProcessor, MapController, MapControllerConfiguration, RawUserEvent, UserEvent,
};
use crate::error::WebGisError;
use crate::layer::attribution::Attribution;
use crate::layer::data_provider::UrlTemplate;
use crate::layer::feature_layer::{
    FeatureSource, LoadingStrategy, SimplePolygonSymbol, WfsQuery,
};
use crate::layer::raster_tile_layer::RasterTileLayerBuilder;
use crate::layer::wms::WmsSource;
use crate::layer::{FeatureLayer, RasterTileLayer, WmsLayer};
use crate::map::Map;
use crate::messenger::Messenger;
use crate::picker::{pick_primary, PickOutcome};
use crate::platform::PlatformService;
use crate::surface::Viewport;
use crate::view::MapView;

/// Base tile layer of the primary surface.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BaseTiles {
    /// OpenStreetMap tiles.
    Osm,
    /// CARTO light tiles.
    Carto,
}

/// The primary map surface.
///
/// Layers from bottom to top: OSM, CARTO, provinces (GeoJSON file), counties (WMS raster),
/// counties (WFS vectors, transparent, used for picking). The counties checkbox drives both
/// counties layers.
pub struct PrimaryMap {
    map: Map,
    events: EventProcessor,
    indices: LayerIndices,
    provinces: Arc<RwLock<FeatureLayer>>,
    counties: Arc<RwLock<FeatureLayer>>,
    counties_wms: Arc<RwLock<WmsLayer>>,
    initial_view: MapView,
    hit_tolerance_px: f64,
    is_visible: bool,
}

#[derive(Debug, Copy, Clone)]
struct LayerIndices {
    osm: usize,
    carto: usize,
    provinces: usize,
    counties_wms: usize,
    counties_wfs: usize,
}

impl PrimaryMap {
    /// Creates a visible surface at the configured initial view with the OSM base layer and both
    /// boundary layers shown. Nothing is loaded until [`PrimaryMap::load_layers`] or
    /// [`PrimaryMap::load_boundaries`] is called.
    pub fn new(
        config: &ViewerConfig,
        platform: Arc<dyn PlatformService>,
        messenger: Option<Arc<dyn Messenger>>,
    ) -> Result<Self, WebGisError> {
        let osm = tile_layer(&config.osm, "osm", config, platform.clone())?;
        let carto = tile_layer(&config.carto, "carto", config, platform.clone())?;

        let provinces_symbol = SimplePolygonSymbol::new(Color::rgb_opacity(255, 0, 0, 0.05))
            .with_stroke_color(Color::RED)
            .with_stroke_width(2.0);
        let provinces = Arc::new(RwLock::new(FeatureLayer::new(
            FeatureSource::file(&config.provinces_url),
            Naming::ByProperties,
            provinces_symbol,
            Crs::EPSG3857,
            platform.clone(),
        )));

        let wms_source = WmsSource::new(&config.wms_url(), &config.counties_layer)?;
        let counties_wms = Arc::new(RwLock::new(WmsLayer::new(
            wms_source,
            platform.clone(),
            None,
        )?));

        let query = WfsQuery::new(config.wfs_url(), &config.counties_layer, Crs::EPSG3857)
            .with_strategy(LoadingStrategy::Bbox);
        let counties_symbol = SimplePolygonSymbol::new(Color::TRANSPARENT)
            .with_stroke_color(Color::TRANSPARENT)
            .with_stroke_width(0.0);
        let counties = Arc::new(RwLock::new(FeatureLayer::new(
            FeatureSource::Wfs(query),
            Naming::ByProperties,
            counties_symbol,
            Crs::EPSG3857,
            platform,
        )));

        let initial_view = MapView::from_zoom(&config.initial_view.center, config.initial_view.zoom)
            .with_size(config.surface_size());
        let mut map = Map::new(initial_view.clone(), vec![], None);
        let layers = map.layers_mut();
        let indices = LayerIndices {
            osm: layers.push(osm),
            carto: layers.push(carto),
            provinces: layers.push(provinces.clone()),
            counties_wms: layers.push(counties_wms.clone()),
            counties_wfs: layers.push(counties.clone()),
        };
        layers.hide(indices.carto);
        map.set_messenger(messenger);

        let mut events = EventProcessor::default();
        events.add_handler(MapController::new(
            MapControllerConfiguration::default().with_max_zoom(config.max_zoom),
        ));

        Ok(Self {
            map,
            events,
            indices,
            provinces,
            counties,
            counties_wms,
            initial_view,
            hit_tolerance_px: config.hit_tolerance_px,
            is_visible: true,
        })
    }

    /// Returns true if the surface is shown.
    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    /// Shows or hides the surface. Hiding keeps all layers and the view.
    pub fn set_visible(&mut self, is_visible: bool) {
        self.is_visible = is_visible;
        if is_visible {
            self.map.redraw();
        }
    }

    /// Current view.
    pub fn view(&self) -> &MapView {
        self.map.view()
    }

    /// Current view as a geographic viewport.
    pub fn viewport(&self) -> Option<Viewport> {
        Viewport::from_map_view(self.map.view())
    }

    /// Shows the given base layer and hides the other one.
    pub fn select_base(&mut self, base: BaseTiles) {
        let layers = self.map.layers_mut();
        layers.set_visible(self.indices.osm, base == BaseTiles::Osm);
        layers.set_visible(self.indices.carto, base == BaseTiles::Carto);
        self.map.redraw();
    }

    /// Returns true if the base layer is shown.
    pub fn is_base_visible(&self, base: BaseTiles) -> bool {
        let index = match base {
            BaseTiles::Osm => self.indices.osm,
            BaseTiles::Carto => self.indices.carto,
        };
        self.map.layers().is_visible(index)
    }

    /// Shows or hides the boundary layers of the kind. Counties toggle both the WMS and the WFS
    /// layer.
    pub fn set_boundary_visible(&mut self, kind: BoundaryKind, is_visible: bool) {
        let layers = self.map.layers_mut();
        match kind {
            BoundaryKind::Province => layers.set_visible(self.indices.provinces, is_visible),
            BoundaryKind::County => {
                layers.set_visible(self.indices.counties_wms, is_visible);
                layers.set_visible(self.indices.counties_wfs, is_visible);
            }
        }

        log::debug!("Primary {kind} layers visible: {is_visible}");
        if is_visible {
            self.load_layers();
        }
        self.map.redraw();
    }

    /// Returns true if the vector layer of the kind is shown.
    pub fn is_boundary_visible(&self, kind: BoundaryKind) -> bool {
        let index = match kind {
            BoundaryKind::Province => self.indices.provinces,
            BoundaryKind::County => self.indices.counties_wfs,
        };
        self.map.layers().is_visible(index)
    }

    /// Style the vector layer of the kind is drawn with.
    pub fn boundary_symbol(&self, kind: BoundaryKind) -> SimplePolygonSymbol {
        *self.boundary_layer(kind).read().symbol()
    }

    /// Returns true if the counties WMS layer is shown.
    pub fn is_counties_wms_visible(&self) -> bool {
        self.map.layers().is_visible(self.indices.counties_wms)
    }

    /// Moves the view back to the initial center and zoom, keeping the surface size.
    pub fn reset_view(&mut self) {
        let view = self.initial_view.with_size(self.map.view().size());
        self.map.set_view(view);
        self.load_layers();
    }

    /// Changes the surface size.
    pub fn set_size(&mut self, size: Size) {
        self.map.set_size(size);
        self.load_layers();
    }

    /// Starts loading the data the visible layers need for the current view. Must be called
    /// within a tokio runtime.
    pub fn load_layers(&self) {
        if self.is_visible {
            self.map.load_layers();
        }
    }

    /// Loads the visible boundary vector layers for the current view and waits for the
    /// results. Failures are logged and leave the layer empty.
    pub async fn load_boundaries(&self) {
        for kind in BoundaryKind::ALL {
            if !self.is_boundary_visible(kind) {
                continue;
            }

            let load = self.boundary_layer(kind).read().load(self.map.view());
            match load.await {
                Ok(count) => log::info!("Loaded {count} {kind} features"),
                Err(err) => log::warn!("Failed to load {kind} features: {err}"),
            }
        }
    }

    /// Number of loaded features of the kind.
    pub fn feature_count(&self, kind: BoundaryKind) -> usize {
        self.boundary_layer(kind).read().feature_count()
    }

    /// Attributions of the visible layers.
    pub fn attributions(&self) -> Vec<Attribution> {
        self.map
            .layers()
            .iter_visible()
            .filter_map(|layer| layer.attribution())
            .collect()
    }

    /// Converts a pixel position into a map point.
    pub fn screen_to_map(&self, px_position: Point2d) -> Option<Point2d> {
        self.map.view().screen_to_map(px_position)
    }

    /// Handles pointer input. Drags pan and scrolls zoom the view; the returned events (such as
    /// clicks) were not handled by the surface.
    pub fn handle_input(&mut self, event: RawUserEvent) -> Vec<UserEvent> {
        let before = self.map.view().clone();
        let unhandled = self.events.handle(event, &mut self.map);
        if *self.map.view() != before {
            self.load_layers();
        }

        unhandled
    }

    /// Resolves a click at the map point.
    pub fn pick(&self, point: &Point2d) -> PickOutcome {
        let view = self.map.view();
        let tolerance = self.hit_tolerance_px * view.resolution();
        let feature_info_url = if self.is_counties_wms_visible() {
            self.counties_wms.read().feature_info_url(point, view)
        } else {
            None
        };

        let counties = self.counties.read();
        let provinces = self.provinces.read();
        pick_primary(
            &[
                (&*counties, self.is_boundary_visible(BoundaryKind::County)),
                (&*provinces, self.is_boundary_visible(BoundaryKind::Province)),
            ],
            point,
            tolerance,
            feature_info_url,
        )
    }

    fn boundary_layer(&self, kind: BoundaryKind) -> &Arc<RwLock<FeatureLayer>> {
        match kind {
            BoundaryKind::Province => &self.provinces,
            BoundaryKind::County => &self.counties,
        }
    }
}

fn tile_layer(
    source: &TileSourceConfig,
    name: &str,
    config: &ViewerConfig,
    platform: Arc<dyn PlatformService>,
) -> Result<RasterTileLayer, WebGisError> {
    let template = UrlTemplate::parse(&source.url_template)?;
    let mut builder = RasterTileLayerBuilder::new_from_template(template)
        .with_platform(platform)
        .with_attribution(source.attribution.clone());
    if let Some(cache) = &config.tile_cache {
        builder = builder.with_file_cache(cache.join(name));
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;

    use super::*;
    use crate::boundary::FeatureDescriptor;
    use crate::control::MouseButton;
    use crate::tests::{TestPlatform, COUNTIES_3857, PROVINCES};

    fn platform() -> Arc<TestPlatform> {
        Arc::new(
            TestPlatform::new()
                .with_route("iran_provinces.geojson", PROVINCES)
                .with_route("srsname=EPSG:3857", COUNTIES_3857),
        )
    }

    fn primary(platform: Arc<TestPlatform>) -> PrimaryMap {
        PrimaryMap::new(&ViewerConfig::default(), platform, None).unwrap()
    }

    #[test]
    fn initial_layers() {
        let map = primary(platform());
        assert!(map.is_visible());
        assert!(map.is_base_visible(BaseTiles::Osm));
        assert!(!map.is_base_visible(BaseTiles::Carto));
        assert!(map.is_boundary_visible(BoundaryKind::Province));
        assert!(map.is_boundary_visible(BoundaryKind::County));
        assert!(map.is_counties_wms_visible());
        assert_eq!(map.view().zoom(), 5);

        let attributions = map.attributions();
        assert_eq!(attributions.len(), 1);
        assert!(attributions[0].get_text().contains("OpenStreetMap"));
    }

    #[test]
    fn select_base() {
        let mut map = primary(platform());
        map.select_base(BaseTiles::Carto);
        assert!(!map.is_base_visible(BaseTiles::Osm));
        assert!(map.is_base_visible(BaseTiles::Carto));

        map.select_base(BaseTiles::Osm);
        assert!(map.is_base_visible(BaseTiles::Osm));
        assert!(!map.is_base_visible(BaseTiles::Carto));
    }

    #[test]
    fn counties_toggle_both_layers() {
        let mut map = primary(platform());
        map.set_boundary_visible(BoundaryKind::County, false);
        assert!(!map.is_boundary_visible(BoundaryKind::County));
        assert!(!map.is_counties_wms_visible());
        assert!(map.is_boundary_visible(BoundaryKind::Province));
    }

    #[test]
    fn boundary_styles() {
        let map = primary(platform());
        let provinces = map.boundary_symbol(BoundaryKind::Province);
        assert_eq!(provinces.stroke_color, Color::RED);
        assert_eq!(provinces.stroke_width, 2.0);
        assert_eq!(provinces.fill_color.alpha(), 13);

        // Counties vectors are only used for picking.
        assert!(!map.boundary_symbol(BoundaryKind::County).is_visible());
    }

    #[test]
    fn load_boundaries_and_pick() {
        let platform = platform();
        let mut map = primary(platform.clone());
        tokio_test::block_on(map.load_boundaries());
        assert_eq!(map.feature_count(BoundaryKind::Province), 2);
        assert_eq!(map.feature_count(BoundaryKind::County), 1);
        assert_eq!(platform.count_requests("bbox="), 1);

        let center = map.view().position();
        assert_eq!(
            map.pick(&center),
            PickOutcome::Feature(FeatureDescriptor::new(BoundaryKind::County, "Nain"))
        );

        tokio_test::block_on(async { map.set_boundary_visible(BoundaryKind::County, false) });
        assert_eq!(
            map.pick(&center),
            PickOutcome::Feature(FeatureDescriptor::new(BoundaryKind::Province, "Isfahan"))
        );
    }

    #[test]
    fn pick_falls_back_to_feature_info() {
        let map = primary(platform());
        let center = map.view().position();
        assert_matches!(
            map.pick(&center),
            PickOutcome::QueryServer(url) if url.contains("REQUEST=GetFeatureInfo")
                && url.contains("INFO_FORMAT=application%2Fjson")
        );
    }

    #[test]
    fn drag_pans_and_reset_restores() {
        let mut map = primary(platform());
        let initial = map.view().position();

        tokio_test::block_on(async {
            map.handle_input(RawUserEvent::PointerMoved(Point2d::new(100.0, 100.0)));
            map.handle_input(RawUserEvent::ButtonPressed(MouseButton::Left));
            map.handle_input(RawUserEvent::PointerMoved(Point2d::new(200.0, 100.0)));
            map.handle_input(RawUserEvent::ButtonReleased(MouseButton::Left));
        });

        let moved = map.view().position();
        let resolution = map.view().resolution();
        assert_abs_diff_eq!(moved.x, initial.x - 100.0 * resolution, epsilon = 1e-6);

        tokio_test::block_on(async { map.reset_view() });
        assert_eq!(map.view().position(), initial);
        assert_eq!(map.view().zoom(), 5);
    }

    #[test]
    fn click_is_returned() {
        let mut map = primary(platform());
        let events = tokio_test::block_on(async {
            map.handle_input(RawUserEvent::PointerMoved(Point2d::new(640.0, 360.0)));
            map.handle_input(RawUserEvent::ButtonPressed(MouseButton::Left));
            map.handle_input(RawUserEvent::ButtonReleased(MouseButton::Left))
        });

        assert!(events
            .iter()
            .any(|event| matches!(event, UserEvent::Click(MouseButton::Left, _))));
    }

    #[test]
    fn scroll_zooms() {
        let mut map = primary(platform());
        tokio_test::block_on(async {
            map.handle_input(RawUserEvent::Scroll(1.0));
        });
        assert_eq!(map.view().zoom(), 6);
        assert_eq!(map.viewport().map(|viewport| viewport.zoom), Some(6));
    }
}
