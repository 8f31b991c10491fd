use serde::{Deserialize, Serialize};

use super::datum::Datum;
use super::projection::{IdentityProjection, Projection, WebMercator};
use crate::error::WebGisTypesError;

/// Coordinate reference system.
///
/// Only the two systems the viewer exchanges data in are supported: geographic `EPSG:4326` and
/// Web Mercator `EPSG:3857`. On the wire a CRS is always given by its OGC code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Crs {
    datum: Datum,
    projection_type: ProjectionType,
}

/// Projection type of a [`Crs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionType {
    /// No projection: coordinates are longitude and latitude in degrees.
    None,
    /// Spherical Web Mercator.
    WebMercator,
}

impl Crs {
    /// Geographic coordinates on WGS84 (`EPSG:4326`).
    pub const WGS84: Crs = Crs {
        datum: Datum::WGS84,
        projection_type: ProjectionType::None,
    };

    /// Web Mercator (`EPSG:3857`).
    pub const EPSG3857: Crs = Crs {
        datum: Datum::WGS84,
        projection_type: ProjectionType::WebMercator,
    };

    /// OGC code of the system, e.g. `EPSG:3857`.
    pub fn code(&self) -> &'static str {
        match self.projection_type {
            ProjectionType::None => "EPSG:4326",
            ProjectionType::WebMercator => "EPSG:3857",
        }
    }

    /// Parses an OGC code. Besides the short `EPSG:XXXX` form, the URN form that GeoServer puts
    /// into GeoJSON `crs` members (`urn:ogc:def:crs:EPSG::3857`) is accepted.
    pub fn from_code(code: &str) -> Result<Self, WebGisTypesError> {
        let number = code
            .rsplit(':')
            .next()
            .filter(|_| code.to_ascii_uppercase().contains("EPSG"))
            .unwrap_or_default();

        match number {
            "4326" => Ok(Self::WGS84),
            "3857" | "900913" => Ok(Self::EPSG3857),
            _ => Err(WebGisTypesError::UnknownCrs(code.to_string())),
        }
    }

    /// Projection type of the system.
    pub fn projection_type(&self) -> ProjectionType {
        self.projection_type
    }

    /// Projection from geographic coordinates into this system.
    pub fn get_projection(&self) -> Box<dyn Projection> {
        match self.projection_type {
            ProjectionType::None => Box::new(IdentityProjection),
            ProjectionType::WebMercator => Box::new(WebMercator::new(self.datum)),
        }
    }
}

impl TryFrom<String> for Crs {
    type Error = WebGisTypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_code(&value)
    }
}

impl From<Crs> for String {
    fn from(value: Crs) -> Self {
        value.code().to_string()
    }
}
