use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Style of a polygon feature: a fill with an outline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimplePolygonSymbol {
    /// Color of the inner area of the polygon.
    pub fill_color: Color,
    /// Color of the outline.
    pub stroke_color: Color,
    /// Width of the outline in pixels.
    pub stroke_width: f64,
}

impl SimplePolygonSymbol {
    /// Creates a new instance without an outline.
    pub fn new(fill_color: Color) -> Self {
        Self {
            fill_color,
            stroke_color: Default::default(),
            stroke_width: 0.0,
        }
    }

    /// Creates a new instance from a copy of the current, but with the given stroke color.
    pub fn with_stroke_color(&self, stroke_color: Color) -> Self {
        Self {
            stroke_color,
            ..*self
        }
    }

    /// Creates a new instance from a copy of the current, but with the given stroke width.
    pub fn with_stroke_width(&self, stroke_width: f64) -> Self {
        Self {
            stroke_width,
            ..*self
        }
    }

    /// Returns false if neither the fill nor the outline would leave a mark on the map.
    pub fn is_visible(&self) -> bool {
        !self.fill_color.is_transparent()
            || (!self.stroke_color.is_transparent() && self.stroke_width > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility() {
        assert!(!SimplePolygonSymbol::new(Color::TRANSPARENT).is_visible());
        assert!(!SimplePolygonSymbol::new(Color::TRANSPARENT)
            .with_stroke_color(Color::RED)
            .is_visible());
        assert!(SimplePolygonSymbol::new(Color::TRANSPARENT)
            .with_stroke_color(Color::RED)
            .with_stroke_width(2.0)
            .is_visible());
        assert!(SimplePolygonSymbol::new(Color::rgb_opacity(255, 0, 0, 0.05)).is_visible());
    }

    #[test]
    fn serialization() {
        let symbol = SimplePolygonSymbol::new(Color::GRAY)
            .with_stroke_color(Color::BLACK)
            .with_stroke_width(1.0);
        let json = serde_json::to_string(&symbol).unwrap();
        let restored: SimplePolygonSymbol = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, symbol);
    }
}
