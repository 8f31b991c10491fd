//! Resolving clicks into boundary names.
//!
//! The primary surface hit-tests its vector boundary layers and falls back to a WMS
//! `GetFeatureInfo` query when nothing is hit. The secondary surface only knows the shapes it
//! holds.

use webgis_types::{GeoPoint2d, Point2d};

use crate::boundary::{property_as_string, BoundaryKind, FeatureDescriptor};
use crate::layer::FeatureLayer;
use crate::surface::SecondaryMap;

/// What the status display should do after a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    /// A feature was hit: show its descriptor.
    Feature(FeatureDescriptor),
    /// Nothing was hit locally: request the url and show what [`parse_feature_info`] finds in
    /// the answer.
    QueryServer(String),
    /// Nothing was hit: clear the status.
    Clear,
    /// Nothing was hit: leave the status as it is.
    Keep,
}

/// Hit-tests the layers in order and returns the first named feature found.
///
/// Layers are given as `(layer, is_visible)` pairs; hidden layers are skipped.
pub fn pick_features(
    layers: &[(&FeatureLayer, bool)],
    point: &Point2d,
    tolerance: f64,
) -> Option<FeatureDescriptor> {
    layers
        .iter()
        .filter(|(_, is_visible)| *is_visible)
        .find_map(|(layer, _)| layer.features_at(point, tolerance).into_iter().next())
}

/// Outcome of a click on the primary surface.
///
/// `features` are the vector layers in picking order. `feature_info_url` is the point query to
/// fall back to, `None` if the WMS layer is hidden or the point is outside of its extent.
pub fn pick_primary(
    features: &[(&FeatureLayer, bool)],
    point: &Point2d,
    tolerance: f64,
    feature_info_url: Option<String>,
) -> PickOutcome {
    if let Some(descriptor) = pick_features(features, point, tolerance) {
        return PickOutcome::Feature(descriptor);
    }

    match feature_info_url {
        Some(url) => PickOutcome::QueryServer(url),
        None => PickOutcome::Clear,
    }
}

/// Outcome of a click on the secondary surface. Clicks outside of all shapes change nothing.
pub fn pick_secondary(surface: &dyn SecondaryMap, point: &GeoPoint2d) -> PickOutcome {
    match surface.descriptor_at(point) {
        Some(descriptor) => PickOutcome::Feature(descriptor),
        None => PickOutcome::Keep,
    }
}

/// Reads the county of a JSON `GetFeatureInfo` answer: the `Name_1_En` property of the first
/// feature.
///
/// Returns `None` for malformed answers, answers without features, and a first feature without
/// the name.
pub fn parse_feature_info(bytes: &[u8]) -> Option<FeatureDescriptor> {
    let value: serde_json::Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(err) => {
            log::debug!("Feature info is not valid json: {err}");
            return None;
        }
    };

    let properties = value
        .get("features")?
        .as_array()?
        .first()?
        .get("properties")?
        .as_object()?;
    let name = property_as_string(properties, BoundaryKind::County.name_field())?;

    Some(FeatureDescriptor::new(BoundaryKind::County, name))
}
