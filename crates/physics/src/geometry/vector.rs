//! Vector helpers shared by the sweep and movement code.
//!
//! `glam` already covers most of what we need. These helpers exist for the
//! operations where a zero-length vector would otherwise produce NaN.

use glam::Vec3;

/// Lengths below this are treated as zero.
pub const DEGENERATE_LENGTH: f32 = 1.0e-6;

/// Normalize a vector, returning `None` for (near) zero length input.
#[inline]
pub fn checked_normalize(v: Vec3) -> Option<Vec3> {
    let len_sq = v.length_squared();
    if !len_sq.is_finite() || len_sq <= DEGENERATE_LENGTH * DEGENERATE_LENGTH {
        return None;
    }
    Some(v / len_sq.sqrt())
}

/// Project `v` onto a unit-length `normal`.
#[inline]
pub fn project_onto_normal(v: Vec3, normal: Vec3) -> Vec3 {
    normal * v.dot(normal)
}

/// Remove the component of `v` along a unit-length `normal`.
///
/// This is the slide response: what remains is tangent to the surface.
#[inline]
pub fn remove_component(v: Vec3, normal: Vec3) -> Vec3 {
    v - project_onto_normal(v, normal)
}

/// Clamp the magnitude of `v` to at most `max`.
#[inline]
pub fn clamp_magnitude(v: Vec3, max: f32) -> Vec3 {
    let len_sq = v.length_squared();
    if len_sq > max * max && len_sq > 0.0 {
        v * (max / len_sq.sqrt())
    } else {
        v
    }
}

/// Horizontal (XZ) part of a vector.
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// True when every component is finite.
#[inline]
pub fn is_finite_vec(v: Vec3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}
