//! Coordinate-level geometry helpers over raw `(x, y)` pairs.
//!
//! Both functions are total: degenerate segments and coincident points are
//! handled without division by zero.

use crate::util::vec2::Vec2;

/// Euclidean distance between `(ax, ay)` and `(bx, by)`
pub fn distance(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    Vec2::new(ax, ay).distance_to(Vec2::new(bx, by))
}

/// Perpendicular distance from `(px, py)` to the segment `(x1, y1)..(x2, y2)`.
///
/// Uses the clamped projection, so points beyond either end measure to the
/// nearest endpoint rather than to the infinite line.
pub fn point_to_line_distance(px: f32, py: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    Vec2::new(px, py).distance_to_segment(Vec2::new(x1, y1), Vec2::new(x2, y2))
}
