//! Collision and culling predicates
//!
//! Everything here is a circle-circle distance check or an axis-aligned
//! bounds test; there is deliberately no response or impulse resolution.

use glam::Vec2;

/// True if two circles overlap (strict: touching exactly does not count)
pub fn circles_overlap(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> bool {
    a_pos.distance(b_pos) < a_radius + b_radius
}

/// True if `pos` has drifted more than `margin` beyond the viewport
/// `[0, view.x] x [0, view.y]` on any axis
pub fn outside_view(pos: Vec2, view: Vec2, margin: f32) -> bool {
    pos.x < -margin || pos.x > view.x + margin || pos.y < -margin || pos.y > view.y + margin
}
