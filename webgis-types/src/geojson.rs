//! Conversion of GeoJSON geometries into the [`geo_types`] polygons boundary features are kept as.

use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use geojson::{FeatureCollection, Geometry, Value};

use crate::error::WebGisTypesError;
use crate::geo::Crs;
use crate::{GeoPoint2d, Point2d};

/// Converts a GeoJSON geometry into a multipolygon. Polygons become single-member multipolygons,
/// geometry collections are flattened. Other geometry types are rejected.
pub fn to_multi_polygon(geometry: &Geometry) -> Result<MultiPolygon<f64>, WebGisTypesError> {
    match &geometry.value {
        Value::Polygon(_) | Value::MultiPolygon(_) => {
            let converted = geo_types::Geometry::<f64>::try_from(geometry.value.clone())
                .map_err(|err| WebGisTypesError::Conversion(err.to_string()))?;
            match converted {
                geo_types::Geometry::Polygon(polygon) => Ok(MultiPolygon::new(vec![polygon])),
                geo_types::Geometry::MultiPolygon(multi_polygon) => Ok(multi_polygon),
                other => Err(WebGisTypesError::Conversion(format!(
                    "unexpected geometry after conversion: {other:?}"
                ))),
            }
        }
        Value::GeometryCollection(members) => {
            let mut polygons = vec![];
            for member in members {
                polygons.extend(to_multi_polygon(member)?.0);
            }
            Ok(MultiPolygon::new(polygons))
        }
        _ => Err(WebGisTypesError::Conversion(
            "expected a polygon geometry".to_string(),
        )),
    }
}

/// Reads the legacy `crs` member of a feature collection, as written by GeoServer.
///
/// GeoJSON without a `crs` member is in `EPSG:4326` by definition, so `None` means exactly
/// that to the callers.
pub fn collection_crs(collection: &FeatureCollection) -> Option<Crs> {
    let name = collection
        .foreign_members
        .as_ref()?
        .get("crs")?
        .get("properties")?
        .get("name")?
        .as_str()?;

    Crs::from_code(name).ok()
}

/// Converts every coordinate of the multipolygon from the `from` system into the `to` system.
/// Returns `None` if any of the coordinates cannot be converted.
pub fn reproject(geometry: &MultiPolygon<f64>, from: &Crs, to: &Crs) -> Option<MultiPolygon<f64>> {
    if from == to {
        return Some(geometry.clone());
    }

    let from_projection = from.get_projection();
    let to_projection = to.get_projection();
    let convert = |coord: &Coord<f64>| -> Option<Coord<f64>> {
        let geo: GeoPoint2d = from_projection.unproject(&Point2d::new(coord.x, coord.y))?;
        let projected = to_projection.project(&geo)?;
        Some(Coord {
            x: projected.x,
            y: projected.y,
        })
    };

    let convert_ring = |ring: &LineString<f64>| -> Option<LineString<f64>> {
        ring.0.iter().map(convert).collect::<Option<Vec<_>>>().map(LineString::new)
    };

    let mut polygons = Vec::with_capacity(geometry.0.len());
    for polygon in &geometry.0 {
        let exterior = convert_ring(polygon.exterior())?;
        let interiors = polygon
            .interiors()
            .iter()
            .map(convert_ring)
            .collect::<Option<Vec<_>>>()?;
        polygons.push(Polygon::new(exterior, interiors));
    }

    Some(MultiPolygon::new(polygons))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn square() -> Geometry {
        Geometry::new(Value::Polygon(vec![vec![
            vec![50.0, 30.0],
            vec![52.0, 30.0],
            vec![52.0, 32.0],
            vec![50.0, 32.0],
            vec![50.0, 30.0],
        ]]))
    }

    #[test]
    fn polygon_becomes_multipolygon() {
        let converted = to_multi_polygon(&square()).expect("valid polygon");
        assert_eq!(converted.0.len(), 1);
        assert_eq!(converted.0[0].exterior().0.len(), 5);
    }

    #[test]
    fn point_is_rejected() {
        let point = Geometry::new(Value::Point(vec![50.0, 30.0]));
        assert!(matches!(
            to_multi_polygon(&point),
            Err(WebGisTypesError::Conversion(_))
        ));
    }

    #[test]
    fn collection_crs_from_geoserver_member() {
        let collection: FeatureCollection = serde_json::from_str(
            r#"{
                "type": "FeatureCollection",
                "features": [],
                "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::3857"}}
            }"#,
        )
        .unwrap();
        assert_eq!(collection_crs(&collection), Some(Crs::EPSG3857));

        let plain: FeatureCollection =
            serde_json::from_str(r#"{"type": "FeatureCollection", "features": []}"#).unwrap();
        assert_eq!(collection_crs(&plain), None);
    }

    #[test]
    fn reproject_to_web_mercator() {
        let geographic = to_multi_polygon(&square()).unwrap();
        let projected = reproject(&geographic, &Crs::WGS84, &Crs::EPSG3857).unwrap();
        let first = projected.0[0].exterior().0[0];
        assert_abs_diff_eq!(first.x, 5565974.54, epsilon = 0.01);

        let back = reproject(&projected, &Crs::EPSG3857, &Crs::WGS84).unwrap();
        let first = back.0[0].exterior().0[0];
        assert_abs_diff_eq!(first.x, 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(first.y, 30.0, epsilon = 1e-9);
    }
}
