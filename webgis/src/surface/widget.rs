use std::sync::Arc;

use serde::{Deserialize, Serialize};
use webgis_types::GeoPoint2d;

use super::{MapType, SecondaryMap, ShapeLayer, Viewport};
use crate::boundary::{BoundaryKind, FeatureDescriptor};
use crate::messenger::Messenger;

/// Options the commercial widget is created with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetOptions {
    /// Provider account key.
    pub credentials: String,
    /// Base map style.
    pub map_type: MapType,
    /// Initial viewport.
    pub viewport: Viewport,
}

/// Built-in [`SecondaryMap`] keeping shape layers in memory and hit-testing them in geographic
/// coordinates.
pub struct WidgetMap {
    options: WidgetOptions,
    viewport: Viewport,
    is_visible: bool,
    layers: Vec<ShapeLayer>,
    messenger: Option<Arc<dyn Messenger>>,
}

impl std::fmt::Debug for WidgetMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetMap")
            .field("map_type", &self.options.map_type)
            .field("viewport", &self.viewport)
            .field("is_visible", &self.is_visible)
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl WidgetMap {
    /// Creates a hidden widget at the initial viewport of the options.
    pub fn new(options: WidgetOptions, messenger: Option<Arc<dyn Messenger>>) -> Self {
        if options.credentials.is_empty() {
            log::warn!("Commercial map widget is created without credentials");
        }

        Self {
            viewport: options.viewport,
            options,
            is_visible: false,
            layers: vec![],
            messenger,
        }
    }

    /// Options the widget was created with.
    pub fn options(&self) -> &WidgetOptions {
        &self.options
    }

    /// Shape layers, bottom first.
    pub fn layers(&self) -> &[ShapeLayer] {
        &self.layers
    }

    fn redraw(&self) {
        if self.is_visible {
            if let Some(messenger) = &self.messenger {
                messenger.request_redraw();
            }
        }
    }
}

impl SecondaryMap for WidgetMap {
    fn set_view(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.redraw();
    }

    fn view(&self) -> Viewport {
        self.viewport
    }

    fn set_visible(&mut self, is_visible: bool) {
        self.is_visible = is_visible;
        self.redraw();
    }

    fn is_visible(&self) -> bool {
        self.is_visible
    }

    fn clear_layers(&mut self) {
        self.layers.clear();
        self.redraw();
    }

    fn insert_layer(&mut self, layer: ShapeLayer) {
        log::debug!(
            "Adding {} layer with {} shapes to the widget",
            layer.kind(),
            layer.shapes().len()
        );
        self.layers.push(layer);
        self.redraw();
    }

    fn layer_kinds(&self) -> Vec<BoundaryKind> {
        self.layers.iter().map(|layer| layer.kind()).collect()
    }

    fn descriptor_at(&self, point: &GeoPoint2d) -> Option<FeatureDescriptor> {
        self.layers
            .iter()
            .rev()
            .find_map(|layer| layer.descriptor_at(point))
            .cloned()
    }
}
