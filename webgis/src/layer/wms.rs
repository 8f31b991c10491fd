//! Tiled OGC WMS layer.

use std::any::Any;
use std::sync::Arc;

use reqwest::Url;
use webgis_types::{Point2d, Rect};

use super::raster_tile_layer::RasterTileLayerBuilder;
use super::{Layer, RasterTileLayer};
use crate::error::WebGisError;
use crate::layer::attribution::Attribution;
use crate::messenger::Messenger;
use crate::platform::PlatformService;
use crate::tile_schema::{TileIndex, TileSchema};
use crate::view::MapView;

const WMS_VERSION: &str = "1.3.0";
const IMAGE_FORMAT: &str = "image/png";
const DEFAULT_LODS_COUNT: u32 = 20;

/// Request builder for a tiled WMS service.
///
/// Map images are requested tile by tile (`GetMap` with the tile extent as `BBOX`), and point
/// queries (`GetFeatureInfo`) address the pixel of the tile containing the queried point.
#[derive(Debug, Clone)]
pub struct WmsSource {
    url: Url,
    layers: String,
    tiled: bool,
    tile_schema: TileSchema,
}

impl WmsSource {
    /// Creates a source for the service at `url` (e.g. `http://localhost:8080/geoserver/cite/wms`)
    /// showing the given comma separated `layers`.
    pub fn new(url: &str, layers: impl Into<String>) -> Result<Self, WebGisError> {
        let url = Url::parse(url)
            .map_err(|err| WebGisError::Config(format!("invalid WMS url {url}: {err}")))?;

        Ok(Self {
            url,
            layers: layers.into(),
            tiled: true,
            tile_schema: TileSchema::web(DEFAULT_LODS_COUNT),
        })
    }

    /// Sets the `TILED` vendor parameter, which lets GeoServer serve requests from its tile cache.
    pub fn with_tiled(mut self, tiled: bool) -> Self {
        self.tiled = tiled;
        self
    }

    /// Tile schema used to address tiles.
    pub fn tile_schema(&self) -> &TileSchema {
        &self.tile_schema
    }

    /// `GetMap` url of the tile.
    pub fn get_map_url(&self, index: &TileIndex) -> Option<String> {
        let bbox = self.tile_schema.tile_bbox(*index)?;
        let mut params = self.base_params("GetMap");
        params.extend(self.layer_params());
        params.extend(self.extent_params(&bbox));

        Some(self.build_url(params))
    }

    /// `GetFeatureInfo` url for the map `point` as seen at the given `resolution`.
    ///
    /// Returns `None` if the point is outside of the tile schema.
    pub fn feature_info_url(
        &self,
        point: &Point2d,
        resolution: f64,
        info_format: &str,
    ) -> Option<String> {
        let lod = self.tile_schema.select_lod(resolution)?;
        let index = self.tile_schema.tile_at(point, lod.z_index())?;
        let bbox = self.tile_schema.tile_bbox(index)?;
        if !self.tile_schema.bounds.contains(point) {
            return None;
        }

        let tile_resolution = lod.resolution();
        let i = ((point.x - bbox.x_min()) / tile_resolution).floor() as i64;
        let j = ((bbox.y_max() - point.y) / tile_resolution).floor() as i64;

        let mut params = self.base_params("GetFeatureInfo");
        params.push(("QUERY_LAYERS", self.layers.clone()));
        params.extend(self.layer_params());
        params.push(("INFO_FORMAT", info_format.to_string()));
        params.push(("I", i.to_string()));
        params.push(("J", j.to_string()));
        params.extend(self.extent_params(&bbox));

        Some(self.build_url(params))
    }

    fn base_params(&self, request: &str) -> Vec<(&'static str, String)> {
        vec![
            ("SERVICE", "WMS".to_string()),
            ("VERSION", WMS_VERSION.to_string()),
            ("REQUEST", request.to_string()),
            ("FORMAT", IMAGE_FORMAT.to_string()),
            ("TRANSPARENT", "true".to_string()),
        ]
    }

    fn layer_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("LAYERS", self.layers.clone()),
            ("TILED", self.tiled.to_string()),
        ]
    }

    fn extent_params(&self, bbox: &Rect) -> Vec<(&'static str, String)> {
        let [x_min, y_min, x_max, y_max] = bbox.to_array();
        vec![
            ("WIDTH", self.tile_schema.tile_width.to_string()),
            ("HEIGHT", self.tile_schema.tile_height.to_string()),
            ("CRS", self.tile_schema.crs.code().to_string()),
            ("STYLES", String::new()),
            ("BBOX", format!("{x_min},{y_min},{x_max},{y_max}")),
        ]
    }

    fn build_url(&self, params: Vec<(&'static str, String)>) -> String {
        let mut url = self.url.clone();
        url.query_pairs_mut().extend_pairs(params);
        url.into()
    }
}

/// Raster layer showing a tiled WMS service.
pub struct WmsLayer {
    source: Arc<WmsSource>,
    tiles: RasterTileLayer,
}

impl std::fmt::Debug for WmsLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WmsLayer")
            .field("source", &self.source)
            .finish()
    }
}

impl WmsLayer {
    /// Creates a layer loading the source's `GetMap` tiles with the given platform service.
    pub fn new(
        source: WmsSource,
        platform: Arc<dyn PlatformService>,
        attribution: Option<Attribution>,
    ) -> Result<Self, WebGisError> {
        let source = Arc::new(source);
        let url_source = source.clone();
        let mut builder = RasterTileLayerBuilder::new_rest(move |index: &TileIndex| {
            url_source.get_map_url(index).unwrap_or_default()
        })
        .with_tile_schema(source.tile_schema().clone())
        .with_platform(platform);

        if let Some(attribution) = attribution {
            builder = builder.with_attribution(attribution);
        }

        Ok(Self {
            source,
            tiles: builder.build()?,
        })
    }

    /// Request builder of the layer.
    pub fn source(&self) -> &WmsSource {
        &self.source
    }

    /// Loaded tiles of the layer.
    pub fn tiles(&self) -> &RasterTileLayer {
        &self.tiles
    }

    /// `GetFeatureInfo` url for the map `point` at the view's resolution, requesting a JSON
    /// response.
    pub fn feature_info_url(&self, point: &Point2d, view: &MapView) -> Option<String> {
        self.source
            .feature_info_url(point, view.resolution(), "application/json")
    }
}

impl Layer for WmsLayer {
    fn prepare(&self, view: &MapView) {
        self.tiles.prepare(view)
    }

    fn set_messenger(&mut self, messenger: Box<dyn Messenger>) {
        self.tiles.set_messenger(messenger)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn attribution(&self) -> Option<Attribution> {
        self.tiles.attribution()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use webgis_types::latlon;

    use super::*;
    use crate::view::resolution_for_zoom;

    fn query(url: &str) -> HashMap<String, String> {
        Url::parse(url)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn source() -> WmsSource {
        WmsSource::new("http://localhost:8080/geoserver/cite/wms", "cite:Shahrestan").unwrap()
    }

    #[test]
    fn get_map_url() {
        let url = source().get_map_url(&TileIndex::new(0, 0, 1)).unwrap();
        assert!(url.starts_with("http://localhost:8080/geoserver/cite/wms?SERVICE=WMS&"));

        let params = query(&url);
        assert_eq!(params["REQUEST"], "GetMap");
        assert_eq!(params["VERSION"], "1.3.0");
        assert_eq!(params["LAYERS"], "cite:Shahrestan");
        assert_eq!(params["TILED"], "true");
        assert_eq!(params["TRANSPARENT"], "true");
        assert_eq!(params["FORMAT"], "image/png");
        assert_eq!(params["CRS"], "EPSG:3857");
        assert_eq!(params["WIDTH"], "256");
        assert_eq!(params["HEIGHT"], "256");
        assert_eq!(params["STYLES"], "");

        let bbox: Vec<f64> = params["BBOX"]
            .split(',')
            .map(|v| v.parse().unwrap())
            .collect();
        assert_eq!(bbox.len(), 4);
        assert!(bbox[0] < -20_000_000.0);
        assert!(bbox[1].abs() < 1.0);
        assert!(bbox[2].abs() < 1.0);
        assert!(bbox[3] > 20_000_000.0);
    }

    #[test]
    fn feature_info_url() {
        let source = source();
        let point = Point2d::new(5976520.82, 3819611.15);
        let url = source
            .feature_info_url(&point, resolution_for_zoom(5), "application/json")
            .unwrap();

        let params = query(&url);
        assert_eq!(params["REQUEST"], "GetFeatureInfo");
        assert_eq!(params["QUERY_LAYERS"], "cite:Shahrestan");
        assert_eq!(params["INFO_FORMAT"], "application/json");

        let index = source.tile_schema().tile_at(&point, 5).unwrap();
        assert_eq!(index, TileIndex::new(20, 12, 5));
        let bbox = source.tile_schema().tile_bbox(index).unwrap();
        let resolution = resolution_for_zoom(5);
        let i: i64 = params["I"].parse().unwrap();
        let j: i64 = params["J"].parse().unwrap();
        assert!((0..256).contains(&i));
        assert!((0..256).contains(&j));
        assert_eq!(i, ((point.x - bbox.x_min()) / resolution).floor() as i64);
        assert_eq!(j, ((bbox.y_max() - point.y) / resolution).floor() as i64);
    }

    #[test]
    fn feature_info_outside_of_world() {
        let point = Point2d::new(0.0, 30_000_000.0);
        assert!(source()
            .feature_info_url(&point, resolution_for_zoom(5), "application/json")
            .is_none());
    }

    #[test]
    fn untiled_source() {
        let url = source()
            .with_tiled(false)
            .get_map_url(&TileIndex::new(0, 0, 0))
            .unwrap();
        assert_eq!(query(&url)["TILED"], "false");
    }

    #[test]
    fn layer_uses_view_resolution() {
        let platform = Arc::new(crate::tests::TestPlatform::new());
        let layer = WmsLayer::new(source(), platform, None).unwrap();
        let view = MapView::from_zoom(&latlon!(32.4279, 53.688), 7);
        let url = layer.feature_info_url(&view.position(), &view).unwrap();

        let schema = layer.source().tile_schema();
        let index = schema.tile_at(&view.position(), 7).unwrap();
        let map_url = layer.source().get_map_url(&index).unwrap();
        assert_eq!(query(&url)["BBOX"], query(&map_url)["BBOX"]);
    }

    #[test]
    fn invalid_url() {
        assert!(WmsSource::new("not a url", "cite:Shahrestan").is_err());
    }
}
