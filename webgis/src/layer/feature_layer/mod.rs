//! [`FeatureLayer`] holds boundary polygons loaded from a GeoJSON file or a WFS service.

use std::any::Any;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;
use webgis_types::{Crs, Point2d, Rect};

use super::Layer;
use crate::boundary::{decode_boundaries, BoundaryFeature, FeatureDescriptor, Naming};
use crate::error::WebGisError;
use crate::layer::attribution::Attribution;
use crate::messenger::Messenger;
use crate::platform::PlatformService;
use crate::view::MapView;

mod source;
mod symbol;

pub use source::{FeatureSource, LoadingStrategy, WfsQuery};
pub use symbol::SimplePolygonSymbol;

/// Layer of boundary polygons.
///
/// Features are loaded on [`Layer::prepare`] (or explicitly with [`FeatureLayer::load`]) and
/// converted into the CRS of the layer. With the [`LoadingStrategy::Bbox`] strategy every view
/// that is not covered by previously loaded extents triggers a new request; features already
/// present (by id) are not added again.
pub struct FeatureLayer {
    inner: Arc<FeatureLayerInner>,
    symbol: SimplePolygonSymbol,
    messenger: Option<Arc<dyn Messenger>>,
}

struct FeatureLayerInner {
    source: FeatureSource,
    naming: Naming,
    crs: Crs,
    platform: Arc<dyn PlatformService>,
    store: RwLock<FeatureStore>,
}

#[derive(Default)]
struct FeatureStore {
    features: Vec<BoundaryFeature>,
    ids: HashSet<String>,
    loaded_extents: Vec<Rect>,
    requested_all: bool,
}

struct LoadRequest {
    url: String,
    extent: Option<Rect>,
}

impl std::fmt::Debug for FeatureLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureLayer")
            .field("source", &self.inner.source)
            .field("crs", &self.inner.crs)
            .field("symbol", &self.symbol)
            .finish()
    }
}

impl FeatureLayer {
    /// Creates an empty layer. Features are converted into `crs`, which should be the CRS of the
    /// map the layer is shown on.
    pub fn new(
        source: FeatureSource,
        naming: Naming,
        symbol: SimplePolygonSymbol,
        crs: Crs,
        platform: Arc<dyn PlatformService>,
    ) -> Self {
        Self {
            inner: Arc::new(FeatureLayerInner {
                source,
                naming,
                crs,
                platform,
                store: RwLock::new(FeatureStore::default()),
            }),
            symbol,
            messenger: None,
        }
    }

    /// Source of the features.
    pub fn source(&self) -> &FeatureSource {
        &self.inner.source
    }

    /// CRS of the features.
    pub fn crs(&self) -> &Crs {
        &self.inner.crs
    }

    /// Style of the layer.
    pub fn symbol(&self) -> &SimplePolygonSymbol {
        &self.symbol
    }

    /// Number of loaded features.
    pub fn feature_count(&self) -> usize {
        self.inner.store.read().features.len()
    }

    /// Extents for which features were requested, in the layer CRS.
    pub fn loaded_extents(&self) -> Vec<Rect> {
        self.inner.store.read().loaded_extents.clone()
    }

    /// Loads the features needed for the `view`, resolving to the number of added features.
    ///
    /// Nothing is requested if the data for the view was already requested. The returned future
    /// does not borrow the layer, so it can be spawned.
    pub fn load(
        &self,
        view: &MapView,
    ) -> impl Future<Output = Result<usize, WebGisError>> + Send + 'static {
        let inner = self.inner.clone();
        let messenger = self.messenger.clone();
        let request = inner.start_request(view);

        async move {
            let Some(request) = request else {
                return Ok(0);
            };

            match inner.fetch(&request.url).await {
                Ok(features) => {
                    let added = inner.merge(features);
                    log::debug!("Added {added} features from {}", request.url);
                    if added > 0 {
                        if let Some(messenger) = messenger {
                            messenger.request_redraw();
                        }
                    }

                    Ok(added)
                }
                Err(err) => {
                    inner.cancel_request(&request);
                    Err(err)
                }
            }
        }
    }

    /// Descriptors of named features at the point (in the layer CRS), the topmost first.
    ///
    /// `tolerance` is the distance in map units from a feature border that still counts as a hit.
    pub fn features_at(&self, point: &Point2d, tolerance: f64) -> Vec<FeatureDescriptor> {
        self.inner
            .store
            .read()
            .features
            .iter()
            .rev()
            .filter(|feature| feature.is_point_inside(point, tolerance))
            .filter_map(|feature| feature.descriptor.clone())
            .collect()
    }
}

impl FeatureLayerInner {
    fn start_request(&self, view: &MapView) -> Option<LoadRequest> {
        let mut store = self.store.write();
        match self.source.loading_strategy() {
            LoadingStrategy::All => {
                if store.requested_all {
                    return None;
                }

                store.requested_all = true;
                Some(LoadRequest {
                    url: self.source.url_for(None),
                    extent: None,
                })
            }
            LoadingStrategy::Bbox => {
                if *view.crs() != self.crs {
                    log::warn!(
                        "Cannot load features for a view in {}, layer CRS is {}",
                        view.crs().code(),
                        self.crs.code()
                    );
                    return None;
                }

                let extent = view.get_bbox()?;
                if store
                    .loaded_extents
                    .iter()
                    .any(|loaded| loaded.contains_rect(&extent))
                {
                    return None;
                }

                store.loaded_extents.push(extent);
                Some(LoadRequest {
                    url: self.source.url_for(Some(&extent)),
                    extent: Some(extent),
                })
            }
        }
    }

    fn cancel_request(&self, request: &LoadRequest) {
        let mut store = self.store.write();
        match &request.extent {
            Some(extent) => store.loaded_extents.retain(|loaded| loaded != extent),
            None => store.requested_all = false,
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<BoundaryFeature>, WebGisError> {
        let bytes = self.platform.load_bytes_from_url(url).await?;
        decode_boundaries(&bytes, self.naming, &self.source.data_crs(), &self.crs)
    }

    fn merge(&self, features: Vec<BoundaryFeature>) -> usize {
        let mut store = self.store.write();
        let mut added = 0;
        for feature in features {
            if let Some(id) = &feature.id {
                if !store.ids.insert(id.clone()) {
                    continue;
                }
            }

            store.features.push(feature);
            added += 1;
        }

        added
    }
}

impl Layer for FeatureLayer {
    fn prepare(&self, view: &MapView) {
        let load = self.load(view);
        let source = self.inner.source.url_for(None);
        crate::async_runtime::spawn(async move {
            if let Err(err) = load.await {
                log::warn!("Failed to load features from {source}: {err}");
            }
        });
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
        None
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use webgis_types::{latlon, Size};

    use super::*;
    use crate::boundary::BoundaryKind;
    use crate::color::Color;
    use crate::tests::{TestPlatform, COUNTIES_3857, PROVINCES};

    const WFS_URL: &str = "http://localhost:8080/geoserver/cite/wfs";

    fn view(zoom: u32) -> MapView {
        MapView::from_zoom(&latlon!(32.4279, 53.688), zoom).with_size(Size::new(1280.0, 720.0))
    }

    fn counties_layer(platform: Arc<TestPlatform>) -> FeatureLayer {
        let query = WfsQuery::new(WFS_URL, "cite:Shahrestan", Crs::EPSG3857)
            .with_strategy(LoadingStrategy::Bbox);
        FeatureLayer::new(
            FeatureSource::Wfs(query),
            Naming::ByProperties,
            SimplePolygonSymbol::new(Color::TRANSPARENT),
            Crs::EPSG3857,
            platform,
        )
    }

    #[test]
    fn file_is_loaded_once() {
        let platform =
            Arc::new(TestPlatform::new().with_route("iran_provinces.geojson", PROVINCES));
        let layer = FeatureLayer::new(
            FeatureSource::file("iran_provinces.geojson"),
            Naming::ByProperties,
            SimplePolygonSymbol::new(Color::RED),
            Crs::EPSG3857,
            platform.clone(),
        );

        assert_eq!(tokio_test::block_on(layer.load(&view(5))).unwrap(), 2);
        assert_eq!(tokio_test::block_on(layer.load(&view(7))).unwrap(), 0);
        assert_eq!(platform.requests().len(), 1);
        assert_eq!(layer.feature_count(), 2);

        let center = view(5).position();
        assert_eq!(
            layer.features_at(&center, 0.0),
            vec![FeatureDescriptor::new(BoundaryKind::Province, "Isfahan")]
        );
    }

    #[test]
    fn failed_file_is_requested_again() {
        let platform = Arc::new(TestPlatform::new());
        let layer = FeatureLayer::new(
            FeatureSource::file("iran_provinces.geojson"),
            Naming::ByProperties,
            SimplePolygonSymbol::new(Color::RED),
            Crs::EPSG3857,
            platform.clone(),
        );

        assert_matches!(
            tokio_test::block_on(layer.load(&view(5))),
            Err(WebGisError::NotFound)
        );
        assert_matches!(
            tokio_test::block_on(layer.load(&view(5))),
            Err(WebGisError::NotFound)
        );
        assert_eq!(platform.requests().len(), 2);
    }

    #[test]
    fn bbox_strategy_requests_view_extent() {
        let platform = Arc::new(TestPlatform::new().with_route("srsname=EPSG:3857", COUNTIES_3857));
        let layer = counties_layer(platform.clone());

        assert_eq!(tokio_test::block_on(layer.load(&view(5))).unwrap(), 1);
        let requests = platform.requests();
        assert_eq!(requests.len(), 1);

        let extent = view(5).get_bbox().unwrap();
        assert!(requests[0].ends_with(&format!(
            "&bbox={},{},{},{},EPSG:3857",
            extent.x_min(),
            extent.y_min(),
            extent.x_max(),
            extent.y_max()
        )));
        assert_eq!(layer.loaded_extents(), vec![extent]);
    }

    #[test]
    fn covered_extent_is_not_requested() {
        let platform = Arc::new(TestPlatform::new().with_route("srsname=EPSG:3857", COUNTIES_3857));
        let layer = counties_layer(platform.clone());

        tokio_test::block_on(layer.load(&view(5))).unwrap();
        // Zooming in stays inside the loaded extent.
        assert_eq!(tokio_test::block_on(layer.load(&view(6))).unwrap(), 0);
        assert_eq!(platform.requests().len(), 1);
    }

    #[test]
    fn features_are_deduplicated_by_id() {
        let platform = Arc::new(TestPlatform::new().with_route("srsname=EPSG:3857", COUNTIES_3857));
        let layer = counties_layer(platform.clone());

        tokio_test::block_on(layer.load(&view(5))).unwrap();
        let moved = view(5).translate_by_pixels(
            webgis_types::Point2d::new(0.0, 0.0),
            webgis_types::Point2d::new(200.0, 0.0),
        );
        assert_eq!(tokio_test::block_on(layer.load(&moved)).unwrap(), 0);
        assert_eq!(platform.requests().len(), 2);
        assert_eq!(layer.feature_count(), 1);
    }

    #[test]
    fn failed_extent_is_forgotten() {
        let platform = Arc::new(TestPlatform::new());
        let layer = counties_layer(platform.clone());

        assert!(tokio_test::block_on(layer.load(&view(5))).is_err());
        assert!(layer.loaded_extents().is_empty());
    }

    #[test]
    fn view_without_size_loads_nothing() {
        let platform = Arc::new(TestPlatform::new().with_route("srsname=EPSG:3857", COUNTIES_3857));
        let layer = counties_layer(platform.clone());
        let view = MapView::from_zoom(&latlon!(32.4279, 53.688), 5);

        assert_eq!(tokio_test::block_on(layer.load(&view)).unwrap(), 0);
        assert!(platform.requests().is_empty());
    }

    #[test]
    fn county_hit() {
        let platform = Arc::new(TestPlatform::new().with_route("srsname=EPSG:3857", COUNTIES_3857));
        let layer = counties_layer(platform);
        tokio_test::block_on(layer.load(&view(5))).unwrap();

        assert_eq!(
            layer.features_at(&view(5).position(), 0.0),
            vec![FeatureDescriptor::new(BoundaryKind::County, "Nain")]
        );
        assert!(layer
            .features_at(&webgis_types::Point2d::new(0.0, 0.0), 0.0)
            .is_empty());
    }
}
