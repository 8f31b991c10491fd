use webgis_types::{Crs, Rect};

/// Where the features of a [`FeatureLayer`](super::FeatureLayer) come from.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureSource {
    /// A GeoJSON document loaded once, by url or as a path relative to the data directory.
    File {
        /// Location of the document.
        url: String,
    },
    /// An OGC WFS `GetFeature` query.
    Wfs(WfsQuery),
}

impl FeatureSource {
    /// Creates a file source.
    pub fn file(url: impl Into<String>) -> Self {
        Self::File { url: url.into() }
    }

    /// CRS the features are returned in when the document doesn't state it.
    pub fn data_crs(&self) -> Crs {
        match self {
            FeatureSource::File { .. } => Crs::WGS84,
            FeatureSource::Wfs(query) => query.srs.clone(),
        }
    }

    pub(crate) fn loading_strategy(&self) -> LoadingStrategy {
        match self {
            FeatureSource::File { .. } => LoadingStrategy::All,
            FeatureSource::Wfs(query) => query.strategy,
        }
    }

    pub(crate) fn url_for(&self, extent: Option<&Rect>) -> String {
        match self {
            FeatureSource::File { url } => url.clone(),
            FeatureSource::Wfs(query) => query.get_feature_url(extent),
        }
    }
}

/// How much of the source is requested at once.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LoadingStrategy {
    /// All features are requested with a single query.
    #[default]
    All,
    /// Features are requested for the extent of the view, whenever the view leaves the extents
    /// loaded before.
    Bbox,
}

/// WFS 1.1.0 `GetFeature` request returning GeoJSON.
#[derive(Debug, Clone, PartialEq)]
pub struct WfsQuery {
    url: String,
    type_name: String,
    srs: Crs,
    strategy: LoadingStrategy,
}

impl WfsQuery {
    /// Creates a query of the feature type `type_name` (e.g. `cite:Shahrestan`) from the service at
    /// `url`, with features returned in `srs`.
    pub fn new(url: impl Into<String>, type_name: impl Into<String>, srs: Crs) -> Self {
        Self {
            url: url.into(),
            type_name: type_name.into(),
            srs,
            strategy: LoadingStrategy::All,
        }
    }

    /// Sets the loading strategy.
    pub fn with_strategy(mut self, strategy: LoadingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Requested CRS.
    pub fn srs(&self) -> &Crs {
        &self.srs
    }

    /// Url of the `GetFeature` request, limited to `extent` (given in the query CRS) if set.
    pub fn get_feature_url(&self, extent: Option<&Rect>) -> String {
        let srs = self.srs.code();
        let mut url = format!(
            "{}?service=WFS&version=1.1.0&request=GetFeature&typename={}&outputFormat=application/json&srsname={srs}",
            self.url, self.type_name
        );

        if let Some(extent) = extent {
            let [x_min, y_min, x_max, y_max] = extent.to_array();
            url.push_str(&format!("&bbox={x_min},{y_min},{x_max},{y_max},{srs}"));
        }

        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WFS_URL: &str = "http://localhost:8080/geoserver/cite/wfs";

    #[test]
    fn get_feature_with_bbox() {
        let query = WfsQuery::new(WFS_URL, "cite:Shahrestan", Crs::EPSG3857)
            .with_strategy(LoadingStrategy::Bbox);
        assert_eq!(
            query.get_feature_url(Some(&Rect::new(1.5, 2.0, 3.0, 4.0))),
            "http://localhost:8080/geoserver/cite/wfs?service=WFS&version=1.1.0&request=GetFeature\
             &typename=cite:Shahrestan&outputFormat=application/json&srsname=EPSG:3857\
             &bbox=1.5,2,3,4,EPSG:3857"
        );
    }

    #[test]
    fn get_feature_without_bbox() {
        let source = FeatureSource::Wfs(WfsQuery::new(WFS_URL, "cite:Shahrestan", Crs::WGS84));
        assert_eq!(
            source.url_for(None),
            "http://localhost:8080/geoserver/cite/wfs?service=WFS&version=1.1.0&request=GetFeature\
             &typename=cite:Shahrestan&outputFormat=application/json&srsname=EPSG:4326"
        );
        assert_eq!(source.data_crs(), Crs::WGS84);
        assert_eq!(source.loading_strategy(), LoadingStrategy::All);
    }

    #[test]
    fn file_source() {
        let source = FeatureSource::file("iran_provinces.geojson");
        assert_eq!(source.url_for(None), "iran_provinces.geojson");
        assert_eq!(source.data_crs(), Crs::WGS84);
    }
}
