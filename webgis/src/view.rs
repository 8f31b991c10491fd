use webgis_types::{Crs, GeoPoint2d, Point2d, Rect, Size, Vector2d};

use crate::tile_schema::WEB_TOP_RESOLUTION;

/// Current viewport of a map surface: the position of its center in the map CRS, the resolution
/// (map units per pixel) and the size of the surface in pixels.
///
/// Zoom levels follow the standard Web Mercator tile pyramid: level `z` has the resolution
/// `WEB_TOP_RESOLUTION / 2^z`.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    position: Point2d,
    resolution: f64,
    size: Size,
    crs: Crs,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            position: Point2d::new(0.0, 0.0),
            resolution: 1.0,
            size: Size::new(0.0, 0.0),
            crs: Crs::EPSG3857,
        }
    }
}

impl MapView {
    /// Creates a Web Mercator view centered at the given geographic point.
    pub fn new(center: &GeoPoint2d, resolution: f64) -> Self {
        let position = Crs::EPSG3857
            .get_projection()
            .project(center)
            .unwrap_or_else(|| Point2d::new(0.0, 0.0));
        Self::new_projected(position, resolution)
    }

    /// Creates a Web Mercator view centered at the given geographic point and zoom level.
    pub fn from_zoom(center: &GeoPoint2d, zoom: u32) -> Self {
        Self::new(center, resolution_for_zoom(zoom))
    }

    /// Creates a Web Mercator view with a center given in projected coordinates.
    pub fn new_projected(position: Point2d, resolution: f64) -> Self {
        Self {
            position,
            resolution,
            ..Default::default()
        }
    }

    /// Creates a view in an arbitrary CRS.
    pub fn new_with_crs(position: Point2d, resolution: f64, crs: Crs) -> Self {
        Self {
            position,
            resolution,
            crs,
            ..Default::default()
        }
    }

    /// Center of the view in the map CRS.
    pub fn position(&self) -> Point2d {
        self.position
    }

    /// Center of the view in geographic coordinates.
    pub fn center(&self) -> Option<GeoPoint2d> {
        self.crs.get_projection().unproject(&self.position)
    }

    /// Map units per pixel.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Returns the same view with another resolution.
    pub fn with_resolution(&self, resolution: f64) -> Self {
        Self {
            resolution,
            ..self.clone()
        }
    }

    /// Integer zoom level closest to the current resolution.
    pub fn zoom(&self) -> u32 {
        let zoom = (WEB_TOP_RESOLUTION / self.resolution).log2().round();
        if zoom.is_finite() && zoom > 0.0 {
            zoom as u32
        } else {
            0
        }
    }

    /// Returns the same view at the given zoom level.
    pub fn with_zoom(&self, zoom: u32) -> Self {
        self.with_resolution(resolution_for_zoom(zoom))
    }

    /// Size of the surface in pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns the same view with another surface size.
    pub fn with_size(&self, new_size: Size) -> Self {
        Self {
            size: new_size,
            ..self.clone()
        }
    }

    /// CRS of the view.
    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Area of the map the view displays. `None` if the surface has no size.
    pub fn get_bbox(&self) -> Option<Rect> {
        if self.size.is_zero() {
            return None;
        }

        let half_width = self.size.half_width() * self.resolution;
        let half_height = self.size.half_height() * self.resolution;
        Some(Rect::new(
            self.position.x - half_width,
            self.position.y - half_height,
            self.position.x + half_width,
            self.position.y + half_height,
        ))
    }

    /// Converts a pixel position (from the top-left corner of the surface) into map coordinates.
    pub fn screen_to_map(&self, px_position: Point2d) -> Option<Point2d> {
        if self.size.is_zero() {
            return None;
        }

        let x = self.position.x + (px_position.x - self.size.half_width()) * self.resolution;
        let y = self.position.y + (self.size.half_height() - px_position.y) * self.resolution;
        Some(Point2d::new(x, y))
    }

    /// Converts a map point into a pixel position. Inverse of [`MapView::screen_to_map`].
    pub fn map_to_screen(&self, point: Point2d) -> Option<Point2d> {
        if self.size.is_zero() {
            return None;
        }

        let x = self.size.half_width() + (point.x - self.position.x) / self.resolution;
        let y = self.size.half_height() - (point.y - self.position.y) / self.resolution;
        Some(Point2d::new(x, y))
    }

    /// Moves the view so that the map point under `from` pixel ends up under `to` pixel.
    pub fn translate_by_pixels(&self, from: Point2d, to: Point2d) -> Self {
        let delta = Vector2d::new(
            (to.x - from.x) * self.resolution,
            (from.y - to.y) * self.resolution,
        );
        self.translate(delta)
    }

    /// Moves the map content by `delta` map units.
    pub fn translate(&self, delta: Vector2d) -> Self {
        Self {
            position: self.position - delta,
            ..self.clone()
        }
    }

    /// Changes the zoom level by `levels` keeping the map point under `base_point` pixel in place.
    pub fn zoom_by(&self, levels: i32, base_point: Point2d) -> Self {
        let target_zoom = (self.zoom() as i64 + levels as i64).max(0) as u32;
        let resolution = resolution_for_zoom(target_zoom);
        let Some(base) = self.screen_to_map(base_point) else {
            return self.with_resolution(resolution);
        };

        let k = resolution / self.resolution;
        let position = base + (self.position - base) * k;
        Self {
            position,
            resolution,
            ..self.clone()
        }
    }
}

/// Resolution of the given zoom level in the standard Web Mercator pyramid.
pub fn resolution_for_zoom(zoom: u32) -> f64 {
    WEB_TOP_RESOLUTION / 2f64.powi(zoom as i32)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use webgis_types::latlon;

    use super::*;

    #[test]
    fn screen_to_map_size() {
        let view = MapView::default().with_size(Size::new(100.0, 100.0));
        assert_eq!(
            view.screen_to_map(Point2d::new(0.0, 0.0)),
            Some(Point2d::new(-50.0, 50.0))
        );
        assert_eq!(
            view.screen_to_map(Point2d::new(50.0, 50.0)),
            Some(Point2d::new(0.0, 0.0))
        );

        let view = MapView::default().with_size(Size::new(200.0, 50.0));
        assert_eq!(
            view.screen_to_map(Point2d::new(25.0, 49.0)),
            Some(Point2d::new(-75.0, -24.0))
        );
    }

    #[test]
    fn map_to_screen_is_inverse() {
        let view =
            MapView::from_zoom(&latlon!(32.4279, 53.688), 5).with_size(Size::new(1280.0, 720.0));
        let pixel = Point2d::new(17.0, 654.0);
        let point = view.screen_to_map(pixel).unwrap();
        let back = view.map_to_screen(point).unwrap();
        assert_abs_diff_eq!(back.x, pixel.x, epsilon = 1e-6);
        assert_abs_diff_eq!(back.y, pixel.y, epsilon = 1e-6);
    }

    #[test]
    fn screen_to_map_zero_size() {
        let view = MapView::default();
        assert!(view.screen_to_map(Point2d::new(0.0, 0.0)).is_none());
        assert!(view.get_bbox().is_none());
    }

    #[test]
    fn zoom_round_trip() {
        let view = MapView::from_zoom(&latlon!(32.4279, 53.688), 5);
        assert_eq!(view.zoom(), 5);
        assert_abs_diff_eq!(view.resolution(), WEB_TOP_RESOLUTION / 32.0);

        let center = view.center().unwrap();
        assert_abs_diff_eq!(center.lat(), 32.4279, epsilon = 1e-9);
        assert_abs_diff_eq!(center.lon(), 53.688, epsilon = 1e-9);
        assert_eq!(view.with_zoom(7).zoom(), 7);
    }

    #[test]
    fn translate_by_pixels() {
        let view = MapView::default().with_size(Size::new(100.0, 100.0));
        let moved = view.translate_by_pixels(Point2d::new(50.0, 50.0), Point2d::new(60.0, 40.0));
        // Content moved right and up, so the center moved left and down.
        assert_eq!(moved.position(), Point2d::new(-10.0, -10.0));
    }

    #[test]
    fn zoom_by_keeps_base_point() {
        let view = MapView::from_zoom(&latlon!(32.0, 53.0), 5).with_size(Size::new(800.0, 600.0));
        let base = Point2d::new(100.0, 100.0);
        let before = view.screen_to_map(base).unwrap();

        let zoomed = view.zoom_by(1, base);
        assert_eq!(zoomed.zoom(), 6);
        let after = zoomed.screen_to_map(base).unwrap();
        assert_abs_diff_eq!(before.x, after.x, epsilon = 1e-6);
        assert_abs_diff_eq!(before.y, after.y, epsilon = 1e-6);

        assert_eq!(view.zoom_by(-10, base).zoom(), 0);
    }
}
