//! Geometry primitives used by the `webgis` viewer.
//!
//! There are two coordinate spaces the viewer works with:
//! * geographic coordinates ([`geo::GeoPoint2d`], latitude and longitude in degrees), used by
//!   the commercial widget surface and by the static boundary files;
//! * projected cartesian coordinates ([`cartesian::Point2d`]), used by the primary map view
//!   (Web Mercator, `EPSG:3857`).
//!
//! [`geo::Crs`] connects the two through a [`geo::Projection`].

pub mod cartesian;
pub mod error;
pub mod geo;
#[cfg(feature = "geojson")]
pub mod geojson;

pub use cartesian::{Point2d, Rect, Size, Vector2d};
pub use error::WebGisTypesError;
pub use geo::{Crs, GeoPoint2d};

// Reexport the geometry crate boundary features are stored with.
pub use geo_types;
