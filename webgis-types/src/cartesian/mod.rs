//! Types in projected cartesian coordinates.

mod rect;
mod size;

pub use rect::Rect;
pub use size::Size;

/// 2d point in projected coordinates (or in screen pixels).
pub type Point2d = nalgebra::Point2<f64>;

/// 2d vector, used for pixel and map deltas.
pub type Vector2d = nalgebra::Vector2<f64>;
