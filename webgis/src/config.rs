//! Viewer configuration.

use std::path::{Path, PathBuf};

use reqwest::Url;
use serde::{Deserialize, Serialize};
use webgis_types::{latlon, Size};

use crate::error::WebGisError;
use crate::layer::attribution::Attribution;
use crate::layer::data_provider::UrlTemplate;
use crate::surface::{MapType, Viewport, WidgetOptions};

/// Environment variable overriding [`CommercialConfig::credentials`].
pub const MAP_KEY_ENV: &str = "WEBGIS_MAP_KEY";

const OSM_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
const CARTO_TEMPLATE: &str = "https://{a-c}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}.png";
const MAX_SUPPORTED_ZOOM: u32 = 19;

/// XYZ tile source of a base layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSourceConfig {
    /// Url template with `{z}`, `{x}`, `{y}` and optional `{a-c}` placeholders.
    pub url_template: String,
    /// Attribution shown with the layer.
    pub attribution: Attribution,
}

/// Settings of the commercial map widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommercialConfig {
    /// Provider account key.
    pub credentials: String,
    /// Base map style.
    pub map_type: MapType,
}

impl Default for CommercialConfig {
    fn default() -> Self {
        Self {
            credentials: "YOUR_MAP_KEY".into(),
            map_type: MapType::Road,
        }
    }
}

/// Configuration of a [`Viewer`](crate::viewer::Viewer).
///
/// Every field has a default, so a JSON file only needs to list what differs:
///
/// ```json
/// { "geoserver_url": "http://gis.example.com/geoserver/cite", "tile_cache": ".tile_cache" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// GeoServer workspace url. WMS and WFS endpoints are `{geoserver_url}/wms` and
    /// `{geoserver_url}/wfs`.
    pub geoserver_url: String,
    /// Feature type name of the counties layer.
    pub counties_layer: String,
    /// Location of the provinces GeoJSON document, relative to `data_dir` unless it is an http
    /// url.
    pub provinces_url: String,
    /// Folder relative paths are resolved against.
    pub data_dir: PathBuf,
    /// View both surfaces start at and the primary surface returns to on base layer change.
    pub initial_view: Viewport,
    /// Width of the primary surface in pixels.
    pub surface_width: f64,
    /// Height of the primary surface in pixels.
    pub surface_height: f64,
    /// OpenStreetMap base layer.
    pub osm: TileSourceConfig,
    /// CARTO base layer.
    pub carto: TileSourceConfig,
    /// Commercial widget.
    pub commercial: CommercialConfig,
    /// Folder to persist base layer tiles in.
    pub tile_cache: Option<PathBuf>,
    /// User agent of HTTP requests.
    pub user_agent: String,
    /// Distance in pixels from a feature border that still counts as a click on it.
    pub hit_tolerance_px: f64,
    /// Maximum zoom level of the primary surface.
    pub max_zoom: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            geoserver_url: "http://localhost:8080/geoserver/cite".into(),
            counties_layer: "cite:Shahrestan".into(),
            provinces_url: "iran_provinces.geojson".into(),
            data_dir: PathBuf::from("."),
            initial_view: Viewport::new(latlon!(32.4279, 53.6880), 5),
            surface_width: 1280.0,
            surface_height: 720.0,
            osm: TileSourceConfig {
                url_template: OSM_TEMPLATE.into(),
                attribution: Attribution::new(
                    "© OpenStreetMap contributors",
                    Some("https://www.openstreetmap.org/copyright".into()),
                ),
            },
            carto: TileSourceConfig {
                url_template: CARTO_TEMPLATE.into(),
                attribution: Attribution::new(
                    "© OpenStreetMap contributors, © CARTO",
                    Some("https://carto.com/attribution".into()),
                ),
            },
            commercial: CommercialConfig::default(),
            tile_cache: None,
            user_agent: concat!("webgis/", env!("CARGO_PKG_VERSION")).into(),
            hit_tolerance_px: 0.0,
            max_zoom: MAX_SUPPORTED_ZOOM,
        }
    }
}

impl ViewerConfig {
    /// Reads the configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, WebGisError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Parses the configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, WebGisError> {
        Ok(serde_json::from_str(json)?)
    }

    /// WMS endpoint of the GeoServer workspace.
    pub fn wms_url(&self) -> String {
        format!("{}/wms", self.geoserver_url.trim_end_matches('/'))
    }

    /// WFS endpoint of the GeoServer workspace.
    pub fn wfs_url(&self) -> String {
        format!("{}/wfs", self.geoserver_url.trim_end_matches('/'))
    }

    /// Size of the primary surface.
    pub fn surface_size(&self) -> Size {
        Size::new(self.surface_width, self.surface_height)
    }

    /// Options the commercial widget is created with.
    pub fn widget_options(&self) -> WidgetOptions {
        WidgetOptions {
            credentials: self.commercial.credentials.clone(),
            map_type: self.commercial.map_type,
            viewport: self.initial_view,
        }
    }

    /// Checks that the urls can be used and the zoom levels are in range.
    pub fn validate(&self) -> Result<(), WebGisError> {
        let url = Url::parse(&self.geoserver_url).map_err(|err| {
            WebGisError::Config(format!("invalid GeoServer url {}: {err}", self.geoserver_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(WebGisError::Config(format!(
                "GeoServer url must use http or https: {}",
                self.geoserver_url
            )));
        }

        if self.counties_layer.is_empty() {
            return Err(WebGisError::Config("counties layer name is empty".into()));
        }

        UrlTemplate::parse(&self.osm.url_template)?;
        UrlTemplate::parse(&self.carto.url_template)?;

        if self.max_zoom > MAX_SUPPORTED_ZOOM {
            return Err(WebGisError::Config(format!(
                "max zoom {} is above {MAX_SUPPORTED_ZOOM}",
                self.max_zoom
            )));
        }

        if self.initial_view.zoom > self.max_zoom {
            return Err(WebGisError::Config(format!(
                "initial zoom {} is above max zoom {}",
                self.initial_view.zoom, self.max_zoom
            )));
        }

        if self.surface_width <= 0.0 || self.surface_height <= 0.0 {
            return Err(WebGisError::Config("surface size must be positive".into()));
        }

        Ok(())
    }
}
