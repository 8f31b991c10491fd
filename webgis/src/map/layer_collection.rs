use crate::layer::Layer;

/// Collection of layers with their visibility.
///
/// Layers are kept in drawing order. Any layer can be hidden with [`LayerCollection::hide`];
/// hidden layers are not prepared, but retain their place and index in the collection.
///
/// Since a map holds anything implementing the [`Layer`] trait, this collection stores layers as
/// trait objects. Use downcasting through `Any` to obtain a concrete layer type.
#[derive(Default)]
pub struct LayerCollection(Vec<LayerEntry>);

struct LayerEntry {
    layer: Box<dyn Layer>,
    is_hidden: bool,
}

impl LayerCollection {
    /// Adds the layer to the end of the collection and returns its index.
    pub fn push(&mut self, layer: impl Layer + 'static) -> usize {
        self.0.push(layer.into());
        self.0.len() - 1
    }

    /// Number of layers, including hidden ones.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no layers in the collection.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates mutably over all layers, including hidden ones.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Layer>> + '_ {
        self.0.iter_mut().map(|entry| &mut entry.layer)
    }

    /// Hides the layer at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn hide(&mut self, index: usize) {
        self.0[index].is_hidden = true;
    }

    /// Shows or hides the layer at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn set_visible(&mut self, index: usize, is_visible: bool) {
        self.0[index].is_hidden = !is_visible;
    }

    /// Returns true if the layer at `index` exists and is not hidden.
    pub fn is_visible(&self, index: usize) -> bool {
        self.0.get(index).is_some_and(|entry| !entry.is_hidden)
    }

    /// Iterates over visible layers.
    pub fn iter_visible(&self) -> impl Iterator<Item = &dyn Layer> + '_ {
        self.0
            .iter()
            .filter(|entry| !entry.is_hidden)
            .map(|entry| &*entry.layer)
    }
}

impl<L: Into<LayerEntry>, T: IntoIterator<Item = L>> From<T> for LayerCollection {
    fn from(value: T) -> Self {
        Self(value.into_iter().map(|v| v.into()).collect())
    }
}

impl<T: Layer + 'static> From<T> for LayerEntry {
    fn from(value: T) -> Self {
        Self {
            layer: Box::new(value),
            is_hidden: false,
        }
    }
}

impl From<Box<dyn Layer>> for LayerEntry {
    fn from(value: Box<dyn Layer>) -> Self {
        Self {
            layer: value,
            is_hidden: false,
        }
    }
}
