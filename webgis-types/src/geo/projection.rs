use super::datum::Datum;
use super::point::GeoPoint2d;
use crate::cartesian::Point2d;

/// Conversion between geographic and projected coordinates.
pub trait Projection: Send + Sync {
    /// Projects a geographic point. Returns `None` if the point cannot be projected (for example
    /// a pole in Web Mercator).
    fn project(&self, input: &GeoPoint2d) -> Option<Point2d>;
    /// Inverse of [`Projection::project`].
    fn unproject(&self, input: &Point2d) -> Option<GeoPoint2d>;
}

/// Spherical Web Mercator (`EPSG:3857`).
#[derive(Debug, Copy, Clone, Default)]
pub struct WebMercator {
    datum: Datum,
}

impl WebMercator {
    /// Creates a projection on the given datum.
    pub fn new(datum: Datum) -> Self {
        Self { datum }
    }
}

impl Projection for WebMercator {
    fn project(&self, input: &GeoPoint2d) -> Option<Point2d> {
        let x = self.datum.semimajor() * input.lon_rad();
        let y = self.datum.semimajor()
            * (std::f64::consts::FRAC_PI_4 + input.lat_rad() / 2.0)
                .tan()
                .ln();

        if x.is_finite() && y.is_finite() {
            Some(Point2d::new(x, y))
        } else {
            None
        }
    }

    fn unproject(&self, input: &Point2d) -> Option<GeoPoint2d> {
        if !input.x.is_finite() || !input.y.is_finite() {
            return None;
        }

        let lat = 2.0 * (input.y / self.datum.semimajor()).exp().atan()
            - std::f64::consts::FRAC_PI_2;
        let lon = input.x / self.datum.semimajor();

        Some(GeoPoint2d::latlon(lat.to_degrees(), lon.to_degrees()))
    }
}

/// Plate carrée: `x` is longitude and `y` is latitude, both in degrees. This is how `EPSG:4326`
/// data is laid out in cartesian space.
#[derive(Debug, Copy, Clone, Default)]
pub struct IdentityProjection;

impl Projection for IdentityProjection {
    fn project(&self, input: &GeoPoint2d) -> Option<Point2d> {
        Some(Point2d::new(input.lon(), input.lat()))
    }

    fn unproject(&self, input: &Point2d) -> Option<GeoPoint2d> {
        Some(GeoPoint2d::latlon(input.y, input.x))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::latlon;

    #[test]
    fn web_mercator_known_values() {
        let projection = WebMercator::default();
        let projected = projection.project(&latlon!(0.0, 180.0)).expect("finite");
        assert_abs_diff_eq!(projected.x, 20037508.342789244, epsilon = 1e-6);
        assert_abs_diff_eq!(projected.y, 0.0, epsilon = 1e-6);

        let projected = projection.project(&latlon!(32.4279, 53.688)).expect("finite");
        assert_abs_diff_eq!(projected.x, 5976520.82, epsilon = 0.01);
        assert_abs_diff_eq!(projected.y, 3819611.15, epsilon = 0.01);
    }

    #[test]
    fn web_mercator_round_trip() {
        let projection = WebMercator::default();
        let point = latlon!(35.6892, 51.389);
        let back = projection
            .unproject(&projection.project(&point).expect("finite"))
            .expect("finite");
        assert_abs_diff_eq!(back.lat(), point.lat(), epsilon = 1e-9);
        assert_abs_diff_eq!(back.lon(), point.lon(), epsilon = 1e-9);
    }

    #[test]
    fn web_mercator_pole_is_not_projected() {
        assert!(WebMercator::default().project(&latlon!(90.0, 0.0)).is_none());
    }
}
