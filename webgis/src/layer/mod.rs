//! [Layers](Layer) specify a data source and the way its data is shown on a map surface.

use std::any::Any;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::layer::attribution::Attribution;
use crate::messenger::Messenger;
use crate::view::MapView;

pub mod attribution;
pub mod data_provider;
pub mod feature_layer;
pub mod raster_tile_layer;
pub mod wms;

pub use feature_layer::FeatureLayer;
pub use raster_tile_layer::RasterTileLayer;
pub use wms::WmsLayer;

/// Layers specify a data source and the way the data is shown on the map.
///
/// There are 3 types of layers:
/// * [`RasterTileLayer`] - downloads prerendered tiles (OSM, CARTO) from an Internet source.
/// * [`WmsLayer`] - requests raster tiles from an OGC WMS server and answers feature info
///   queries against it.
/// * [`FeatureLayer`] - boundary polygons loaded from a GeoJSON file or a WFS server, styled with
///   a [`feature_layer::SimplePolygonSymbol`].
pub trait Layer: Send + Sync {
    /// Prepares the layer for the given `view`. The preparation may include data downloading,
    /// decoding or other asynchronous operations; it returns immediately and notifies the
    /// messenger when new data is ready.
    fn prepare(&self, view: &MapView);
    /// Sets the messenger for the layer. Messenger is used to notify the application when the layer
    /// thinks it should be updated on the screen.
    fn set_messenger(&mut self, messenger: Box<dyn Messenger>);
    /// A map stores layers as trait objects. This method can be used to convert the trait object
    /// into the concrete type.
    fn as_any(&self) -> &dyn Any;
    /// A map stores layers as trait objects. This method can be used to convert the trait object
    /// into the concrete type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Returns the attribution of the layer, if available.
    fn attribution(&self) -> Option<Attribution>;
}

impl<T: Layer + 'static> Layer for Arc<RwLock<T>> {
    fn prepare(&self, view: &MapView) {
        self.read().prepare(view)
    }

    fn set_messenger(&mut self, messenger: Box<dyn Messenger>) {
        self.write().set_messenger(messenger)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn attribution(&self) -> Option<Attribution> {
        self.read().attribution()
    }
}

/// Layer that does nothing, used in layer collection tests.
#[cfg(test)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct TestLayer(pub &'static str);

#[cfg(test)]
impl Layer for TestLayer {
    fn prepare(&self, _view: &MapView) {}

    fn set_messenger(&mut self, _messenger: Box<dyn Messenger>) {}

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn attribution(&self) -> Option<Attribution> {
        None
    }
}
