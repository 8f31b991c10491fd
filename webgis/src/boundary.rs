//! Administrative boundary features: provinces and counties.

use std::fmt::{Display, Formatter};

use geo::{Contains, EuclideanDistance, MultiPolygon, Point};
use geojson::{feature::Id, GeoJson, JsonObject};
use serde::{Deserialize, Serialize};
use webgis_types::geojson::{collection_crs, reproject, to_multi_polygon};
use webgis_types::{Crs, Point2d};

use crate::error::WebGisError;

/// Type of an administrative boundary layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    /// Provinces (ostan).
    Province,
    /// Counties (shahrestan).
    County,
}

impl BoundaryKind {
    /// All boundary kinds, in the order their fetches are issued.
    pub const ALL: [BoundaryKind; 2] = [BoundaryKind::Province, BoundaryKind::County];

    /// Name of the feature property that holds the human-readable name.
    pub fn name_field(&self) -> &'static str {
        match self {
            BoundaryKind::Province => "name",
            BoundaryKind::County => "Name_1_En",
        }
    }

    /// Label used in the status display.
    pub fn label(&self) -> &'static str {
        match self {
            BoundaryKind::Province => "Province",
            BoundaryKind::County => "County",
        }
    }
}

impl Display for BoundaryKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// What a click on a feature reports: its kind and name.
///
/// Every feature gets its descriptor when it is decoded, so the click handlers of both map
/// surfaces read the same value instead of looking into feature properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureDescriptor {
    /// Kind of the boundary.
    pub kind: BoundaryKind,
    /// Name of the region.
    pub name: String,
}

impl FeatureDescriptor {
    /// Creates a new descriptor.
    pub fn new(kind: BoundaryKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// Classifies a feature by its properties: a feature with a county name field is a county,
    /// otherwise a feature with a province name field is a province.
    pub fn from_properties(properties: &JsonObject) -> Option<Self> {
        [BoundaryKind::County, BoundaryKind::Province]
            .into_iter()
            .find_map(|kind| Self::for_kind(kind, properties))
    }

    /// Reads the name field of the given kind.
    pub fn for_kind(kind: BoundaryKind, properties: &JsonObject) -> Option<Self> {
        let name = property_as_string(properties, kind.name_field())?;
        Some(Self::new(kind, name))
    }

    /// Text shown in the status display, e.g. `County Name: Kashan`.
    pub fn status_text(&self) -> String {
        format!("{} Name: {}", self.kind.label(), self.name)
    }
}

impl Display for FeatureDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.status_text())
    }
}

/// Reads a property as a string. Non-string scalar values are formatted, `null` and missing
/// values give `None`.
pub(crate) fn property_as_string(properties: &JsonObject, key: &str) -> Option<String> {
    match properties.get(key)? {
        serde_json::Value::Null => None,
        serde_json::Value::String(value) => Some(value.clone()),
        other => Some(other.to_string()),
    }
}

/// How the kind of decoded features is determined.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Naming {
    /// The kind is derived from the properties present on each feature.
    ByProperties,
    /// All features are of the given kind.
    Kind(BoundaryKind),
}

/// A single administrative region.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    /// Feature id given by the server, if any.
    pub id: Option<String>,
    /// Kind and name. Features without a name field have no descriptor and cannot be picked.
    pub descriptor: Option<FeatureDescriptor>,
    /// Region outline in the CRS of the layer holding the feature.
    pub geometry: MultiPolygon<f64>,
}

impl BoundaryFeature {
    /// Returns true if the point is inside the region or closer than `tolerance` to its border.
    pub fn is_point_inside(&self, point: &Point2d, tolerance: f64) -> bool {
        let point = Point::new(point.x, point.y);
        if self.geometry.contains(&point) {
            return true;
        }

        tolerance > 0.0 && point.euclidean_distance(&self.geometry) <= tolerance
    }
}

/// Decodes a GeoJSON document (a feature collection or a single feature) into boundary features
/// in the `target` CRS.
///
/// The source CRS is taken from the collection's `crs` member; documents without it are read in
/// `default_crs`.
/// Features without geometry, with non-polygon geometry, or that cannot be reprojected are
/// skipped.
pub fn decode_boundaries(
    bytes: &[u8],
    naming: Naming,
    default_crs: &Crs,
    target: &Crs,
) -> Result<Vec<BoundaryFeature>, WebGisError> {
    let geojson: GeoJson = serde_json::from_slice(bytes)?;
    let (features, source_crs) = match geojson {
        GeoJson::FeatureCollection(collection) => {
            let crs = collection_crs(&collection).unwrap_or_else(|| default_crs.clone());
            (collection.features, crs)
        }
        GeoJson::Feature(feature) => (vec![feature], default_crs.clone()),
        GeoJson::Geometry(_) => {
            return Err(WebGisError::Decoding(
                "expected a feature collection, got a bare geometry".to_string(),
            ))
        }
    };

    let mut decoded = Vec::with_capacity(features.len());
    for feature in features {
        let Some(geometry) = &feature.geometry else {
            log::debug!("Skipping feature {:?} without geometry", feature.id);
            continue;
        };

        let geometry = match to_multi_polygon(geometry) {
            Ok(geometry) => geometry,
            Err(err) => {
                log::warn!("Skipping feature {:?}: {err}", feature.id);
                continue;
            }
        };

        let Some(geometry) = reproject(&geometry, &source_crs, target) else {
            log::warn!(
                "Skipping feature {:?}: cannot convert it into {}",
                feature.id,
                target.code()
            );
            continue;
        };

        let descriptor = feature.properties.as_ref().and_then(|properties| match naming {
            Naming::ByProperties => FeatureDescriptor::from_properties(properties),
            Naming::Kind(kind) => FeatureDescriptor::for_kind(kind, properties),
        });

        let id = feature.id.map(|id| match id {
            Id::String(value) => value,
            Id::Number(value) => value.to_string(),
        });

        decoded.push(BoundaryFeature {
            id,
            descriptor,
            geometry,
        });
    }

    Ok(decoded)
}
