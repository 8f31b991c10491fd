use geo::{Contains, MultiPolygon, Point};
use webgis_types::GeoPoint2d;

use crate::boundary::{BoundaryFeature, BoundaryKind, FeatureDescriptor};
use crate::layer::feature_layer::SimplePolygonSymbol;

/// A styled polygon on the secondary surface, in geographic coordinates (x is longitude).
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// What a click on the shape reports. Shapes without a descriptor are not clickable.
    pub descriptor: Option<FeatureDescriptor>,
    /// Outline of the shape.
    pub geometry: MultiPolygon<f64>,
    /// Style of the shape.
    pub symbol: SimplePolygonSymbol,
}

impl Shape {
    /// Returns true if the point is inside the shape.
    pub fn contains(&self, point: &GeoPoint2d) -> bool {
        self.geometry.contains(&Point::new(point.lon(), point.lat()))
    }
}

/// Shapes of one boundary kind, added to the surface together.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeLayer {
    kind: BoundaryKind,
    shapes: Vec<Shape>,
}

impl ShapeLayer {
    /// Creates a layer styling every feature with the same symbol. Each shape keeps the
    /// descriptor of its feature.
    pub fn from_features(
        kind: BoundaryKind,
        features: Vec<BoundaryFeature>,
        symbol: SimplePolygonSymbol,
    ) -> Self {
        let shapes = features
            .into_iter()
            .map(|feature| Shape {
                descriptor: feature.descriptor,
                geometry: feature.geometry,
                symbol,
            })
            .collect();

        Self { kind, shapes }
    }

    /// Kind of the boundaries in the layer.
    pub fn kind(&self) -> BoundaryKind {
        self.kind
    }

    /// Shapes in drawing order.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Descriptor of the topmost named shape containing the point.
    pub fn descriptor_at(&self, point: &GeoPoint2d) -> Option<&FeatureDescriptor> {
        self.shapes
            .iter()
            .rev()
            .filter(|shape| shape.contains(point))
            .find_map(|shape| shape.descriptor.as_ref())
    }
}
