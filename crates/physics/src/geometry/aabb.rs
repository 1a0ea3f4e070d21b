//! Axis-aligned boxes.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// An axis-aligned box defined by its center and full size.
///
/// Note that `size` is the full extent, not the half extent. The same type is
/// used for static collider geometry and for the volume of a moving agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Center position in world space.
    pub center: Vec3,
    /// Full size along each axis.
    pub size: Vec3,
}

impl Aabb {
    /// Create a box from its center and full size.
    pub fn new(center: Vec3, size: Vec3) -> Self {
        Self {
            center,
            size: size.abs(),
        }
    }

    /// Create a box from its center and half extent.
    pub fn from_half_extent(center: Vec3, half_extent: Vec3) -> Self {
        Self::new(center, half_extent * 2.0)
    }

    /// Create a box spanning two corners.
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        let lo = min.min(max);
        let hi = min.max(max);
        Self {
            center: (lo + hi) * 0.5,
            size: hi - lo,
        }
    }

    /// Minimum corner.
    #[inline]
    pub fn min(&self) -> Vec3 {
        self.center - self.size * 0.5
    }

    /// Maximum corner.
    #[inline]
    pub fn max(&self) -> Vec3 {
        self.center + self.size * 0.5
    }

    /// Half of the full size.
    #[inline]
    pub fn half_extent(&self) -> Vec3 {
        self.size * 0.5
    }

    /// Grow the box by `half_extent` on every side (Minkowski sum with a box).
    #[inline]
    pub fn expanded(&self, half_extent: Vec3) -> Self {
        Self {
            center: self.center,
            size: self.size + half_extent.abs() * 2.0,
        }
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Self) -> Self {
        Self::from_min_max(self.min().min(other.min()), self.max().max(other.max()))
    }

    /// Point containment, boundaries included.
    pub fn contains_point(&self, point: Vec3) -> bool {
        let (min, max) = (self.min(), self.max());
        point.cmpge(min).all() && point.cmple(max).all()
    }

    /// Whether `other` lies completely inside this box.
    pub fn contains(&self, other: &Self) -> bool {
        other.min().cmpge(self.min()).all() && other.max().cmple(self.max()).all()
    }

    /// Strict overlap test. Boxes that only share a face do not intersect.
    pub fn intersects(&self, other: &Self) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.cmplt(b_max).all() && b_min.cmplt(a_max).all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_max_from_full_size() {
        let aabb = Aabb::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(10.0, 1.0, 10.0));
        assert_eq!(aabb.min(), Vec3::new(-5.0, -0.5, 5.0));
        assert_eq!(aabb.max(), Vec3::new(5.0, 0.5, 15.0));
        assert_eq!(aabb.half_extent(), Vec3::new(5.0, 0.5, 5.0));
    }

    #[test]
    fn test_from_min_max_orders_corners() {
        let aabb = Aabb::from_min_max(Vec3::new(2.0, 2.0, 2.0), Vec3::ZERO);
        assert_eq!(aabb.center, Vec3::ONE);
        assert_eq!(aabb.size, Vec3::splat(2.0));
    }

    #[test]
    fn test_expanded() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::splat(2.0)).expanded(Vec3::new(0.5, 1.0, 0.0));
        assert_eq!(aabb.min(), Vec3::new(-1.5, -2.0, -1.0));
        assert_eq!(aabb.max(), Vec3::new(1.5, 2.0, 1.0));
    }

    #[test]
    fn test_touching_boxes_do_not_intersect() {
        let a = Aabb::new(Vec3::ZERO, Vec3::splat(2.0));
        let b = Aabb::new(Vec3::new(2.0, 0.0, 0.0), Vec3::splat(2.0));
        assert!(!a.intersects(&b));

        let c = Aabb::new(Vec3::new(1.9, 0.0, 0.0), Vec3::splat(2.0));
        assert!(a.intersects(&c));
    }

    #[test]
    fn test_contains() {
        let outer = Aabb::new(Vec3::ZERO, Vec3::splat(10.0));
        let inner = Aabb::new(Vec3::new(4.0, 0.0, 0.0), Vec3::splat(2.0));
        let straddling = Aabb::new(Vec3::new(5.0, 0.0, 0.0), Vec3::splat(2.0));

        assert!(outer.contains(&inner));
        assert!(!outer.contains(&straddling));
        assert!(outer.contains_point(Vec3::new(5.0, 5.0, 5.0)));
    }
}
