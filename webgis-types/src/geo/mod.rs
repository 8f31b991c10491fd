//! Geographic coordinates (latitude and longitude) and conversion between them and projected
//! coordinates (see [`Projection`]).

mod crs;
mod datum;
mod point;
mod projection;

pub use crs::{Crs, ProjectionType};
pub use datum::Datum;
pub use point::GeoPoint2d;
pub use projection::{IdentityProjection, Projection, WebMercator};
