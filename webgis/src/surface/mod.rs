//! The secondary map surface, backed by a commercial map widget.
//!
//! The widget works in geographic coordinates and integer zoom levels, so everything it is given
//! is converted from the primary map's Web Mercator space first.

use serde::{Deserialize, Serialize};
use webgis_types::GeoPoint2d;

use crate::boundary::{BoundaryKind, FeatureDescriptor};
use crate::view::MapView;

mod shape;
mod widget;

pub use shape::{Shape, ShapeLayer};
pub use widget::{WidgetMap, WidgetOptions};

/// Viewport of a map surface: a geographic center and an integer zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Center of the view.
    pub center: GeoPoint2d,
    /// Zoom level.
    pub zoom: u32,
}

impl Viewport {
    /// Creates a new viewport.
    pub fn new(center: GeoPoint2d, zoom: u32) -> Self {
        Self { center, zoom }
    }

    /// Viewport of a primary map view: its center converted into `EPSG:4326`, zoom unchanged.
    pub fn from_map_view(view: &MapView) -> Option<Self> {
        Some(Self::new(view.center()?, view.zoom()))
    }
}

/// Base map style of the commercial widget.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapType {
    /// Road map.
    #[default]
    Road,
    /// Aerial imagery.
    Aerial,
    /// Canvas-light road map.
    CanvasLight,
}

/// A map surface provided by a third party SDK.
///
/// The surface holds an ordered list of [`ShapeLayer`]s and answers clicks with the
/// [`FeatureDescriptor`] attached to the topmost shape under the pointer.
pub trait SecondaryMap: Send {
    /// Moves the surface to the viewport.
    fn set_view(&mut self, viewport: Viewport);
    /// Current viewport.
    fn view(&self) -> Viewport;
    /// Shows or hides the surface. Hidden surfaces keep their state.
    fn set_visible(&mut self, is_visible: bool);
    /// Returns true if the surface is shown.
    fn is_visible(&self) -> bool;
    /// Removes all shape layers.
    fn clear_layers(&mut self);
    /// Adds a shape layer on top of the existing ones.
    fn insert_layer(&mut self, layer: ShapeLayer);
    /// Kinds of the layers on the surface, bottom first.
    fn layer_kinds(&self) -> Vec<BoundaryKind>;
    /// Descriptor of the topmost named shape containing the point.
    fn descriptor_at(&self, point: &GeoPoint2d) -> Option<FeatureDescriptor>;

    /// Number of shape layers on the surface.
    fn layer_count(&self) -> usize {
        self.layer_kinds().len()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use webgis_types::latlon;

    use super::*;

    #[test]
    fn viewport_from_map_view() {
        let view = MapView::from_zoom(&latlon!(32.4279, 53.688), 5);
        let viewport = Viewport::from_map_view(&view).unwrap();
        assert_eq!(viewport.zoom, 5);
        assert_abs_diff_eq!(viewport.center.lat(), 32.4279, epsilon = 1e-9);
        assert_abs_diff_eq!(viewport.center.lon(), 53.688, epsilon = 1e-9);
    }

    #[test]
    fn map_type_names() {
        assert_eq!(serde_json::to_string(&MapType::Road).unwrap(), r#""road""#);
        assert_eq!(
            serde_json::from_str::<MapType>(r#""canvaslight""#).unwrap(),
            MapType::CanvasLight
        );
    }
}
