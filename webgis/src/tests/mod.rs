//! Test doubles and fixtures shared by the unit tests.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use crate::error::WebGisError;
use crate::platform::PlatformService;

/// Two provinces: Isfahan contains the initial view center, Tehran lies north of it.
pub(crate) const PROVINCES: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": {"name": "Isfahan", "name_fa": "اصفهان"},
      "geometry": {"type": "Polygon", "coordinates": [[[50.0, 31.0], [54.0, 31.0], [54.0, 34.0], [50.0, 34.0], [50.0, 31.0]]]}
    },
    {
      "type": "Feature",
      "properties": {"name": "Tehran"},
      "geometry": {"type": "MultiPolygon", "coordinates": [[[[50.0, 34.5], [54.0, 34.5], [54.0, 36.5], [50.0, 36.5], [50.0, 34.5]]]]}
    }
  ]
}"#;

/// One county around the initial view center, as returned by WFS in `EPSG:4326`.
pub(crate) const COUNTIES_WGS84: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "id": "Shahrestan.1",
      "properties": {"Name_1_En": "Nain"},
      "geometry": {"type": "MultiPolygon", "coordinates": [[[[52.5, 31.5], [54.5, 31.5], [54.5, 33.5], [52.5, 33.5], [52.5, 31.5]]]]}
    }
  ]
}"#;

/// The same county in `EPSG:3857`, with the `crs` member GeoServer writes.
pub(crate) const COUNTIES_3857: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "id": "Shahrestan.1",
      "properties": {"Name_1_En": "Nain"},
      "geometry": {"type": "MultiPolygon", "coordinates": [[[[5876520.0, 3719611.0], [6076520.0, 3719611.0], [6076520.0, 3919611.0], [5876520.0, 3919611.0], [5876520.0, 3719611.0]]]]}
    }
  ],
  "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::3857"}}
}"#;

/// Empty WFS answer.
pub(crate) const EMPTY_COLLECTION: &str = r#"{"type": "FeatureCollection", "features": []}"#;

/// WMS `GetFeatureInfo` answer for a point inside a county.
pub(crate) const FEATURE_INFO: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "id": "Shahrestan.7", "geometry": null, "properties": {"Name_1_En": "Kashan"}}
  ],
  "totalFeatures": "unknown",
  "numberReturned": 1
}"#;

/// Platform service answering from a fixed set of routes and recording every request.
///
/// A route matches if its pattern is a substring of the requested url; the first matching route
/// wins. Unmatched urls fail with [`WebGisError::NotFound`].
#[derive(Default)]
pub(crate) struct TestPlatform {
    routes: Vec<(String, Bytes)>,
    requests: Mutex<Vec<String>>,
}

impl TestPlatform {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_route(mut self, pattern: &str, body: impl Into<Bytes>) -> Self {
        self.routes.push((pattern.to_string(), body.into()));
        self
    }

    /// All requested urls in the order of requests.
    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// Number of requested urls containing `pattern`.
    pub(crate) fn count_requests(&self, pattern: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|url| url.contains(pattern))
            .count()
    }
}

#[async_trait]
impl PlatformService for TestPlatform {
    async fn load_bytes_from_url(&self, url: &str) -> Result<Bytes, WebGisError> {
        self.requests.lock().push(url.to_string());
        self.routes
            .iter()
            .find(|(pattern, _)| url.contains(pattern.as_str()))
            .map(|(_, body)| body.clone())
            .ok_or(WebGisError::NotFound)
    }
}
