//! [`Map`] is a map surface: a view and a stack of layers.

use std::sync::Arc;

use webgis_types::Size;

use crate::layer::Layer;
use crate::messenger::Messenger;
use crate::view::MapView;

mod layer_collection;

pub use layer_collection::LayerCollection;

/// A map surface: the current view and the layers shown in it.
pub struct Map {
    view: MapView,
    layers: LayerCollection,
    messenger: Option<Arc<dyn Messenger>>,
}

impl Map {
    /// Creates a new map. If a messenger is given, it is also set for all the layers.
    pub fn new(
        view: MapView,
        layers: Vec<Box<dyn Layer>>,
        messenger: Option<Arc<dyn Messenger>>,
    ) -> Self {
        let mut map = Self {
            view,
            layers: layers.into(),
            messenger: None,
        };
        map.set_messenger(messenger);
        map
    }

    /// Current view of the map.
    pub fn view(&self) -> &MapView {
        &self.view
    }

    /// Layers of the map.
    pub fn layers(&self) -> &LayerCollection {
        &self.layers
    }

    /// Mutable access to the layers of the map.
    pub fn layers_mut(&mut self) -> &mut LayerCollection {
        &mut self.layers
    }

    /// Sets the view and requests a redraw.
    pub fn set_view(&mut self, view: MapView) {
        self.view = view;
        self.redraw();
    }

    /// Requests a redraw through the messenger, if set.
    pub fn redraw(&self) {
        if let Some(messenger) = &self.messenger {
            messenger.request_redraw()
        }
    }

    /// Changes the size of the surface, keeping the center and the resolution.
    pub fn set_size(&mut self, new_size: Size) {
        self.view = self.view.with_size(new_size);
    }

    /// Sets the messenger for the map and all its layers.
    pub fn set_messenger(&mut self, messenger: Option<Arc<dyn Messenger>>) {
        if let Some(messenger) = &messenger {
            for layer in self.layers.iter_mut() {
                layer.set_messenger(Box::new(messenger.clone()));
            }
        }

        self.messenger = messenger;
    }

    /// Prepares the visible layers for the current view.
    pub fn load_layers(&self) {
        for layer in self.layers.iter_visible() {
            layer.prepare(&self.view);
        }
    }
}
