//! Stateless geometry and scalar helpers.

use glam::Vec2;

/// Squared distance between two points.
#[inline]
pub fn distance_sq(a: Vec2, b: Vec2) -> f32 {
    (b - a).length_squared()
}

/// Distance between two points.
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (b - a).length()
}

/// Unit vector, or zero for a zero-length input.
#[inline]
pub fn normalize_or_zero(v: Vec2) -> Vec2 {
    let len_sq = v.length_squared();
    if len_sq <= f32::EPSILON {
        Vec2::ZERO
    } else {
        v / len_sq.sqrt()
    }
}

/// Unit vector pointing from `from` to `to`, zero if they coincide.
#[inline]
pub fn direction(from: Vec2, to: Vec2) -> Vec2 {
    normalize_or_zero(to - from)
}

/// Angle of a vector in radians, measured from +x toward +y.
#[inline]
pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Unit vector for an angle in radians.
#[inline]
pub fn from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Exact circle-circle overlap test (touching counts as overlap).
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    distance_sq(a, b) <= reach * reach
}

/// Point on a circle of `radius` around `center` at `angle`.
#[inline]
pub fn point_on_circle(center: Vec2, radius: f32, angle: f32) -> Vec2 {
    center + from_angle(angle) * radius
}
