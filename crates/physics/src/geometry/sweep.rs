//! Swept queries and the Minkowski-sum slab test.
//!
//! A [`SweepQuery`] moves a box of some half extent from an origin along a
//! unit direction. Testing it against a static box is done by growing the
//! static box by the moving half extent and casting a plain ray against the
//! result, so hit-scan rays (zero extent) and character sweeps share one
//! code path.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::vector::checked_normalize;

/// Direction components smaller than this are treated as parallel to a slab.
const PARALLEL_EPSILON: f32 = 1.0e-8;

/// A ray or swept box query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepQuery {
    /// Start of the sweep (center of the moving box).
    pub origin: Vec3,
    /// Unit direction of travel.
    pub direction: Vec3,
    /// Half extent of the moving box. Zero for a ray.
    pub half_extent: Vec3,
}

impl SweepQuery {
    /// Build a ray. Returns `None` if `direction` has no length.
    pub fn ray(origin: Vec3, direction: Vec3) -> Option<Self> {
        Self::swept_box(origin, direction, Vec3::ZERO)
    }

    /// Build a swept box. Returns `None` if `direction` has no length.
    pub fn swept_box(origin: Vec3, direction: Vec3, half_extent: Vec3) -> Option<Self> {
        let direction = checked_normalize(direction)?;
        Some(Self {
            origin,
            direction,
            half_extent: half_extent.abs(),
        })
    }

    /// Build a query from `origin` towards `target`, returning the distance
    /// between them alongside. `None` when the two points coincide.
    pub fn towards(origin: Vec3, target: Vec3, half_extent: Vec3) -> Option<(Self, f32)> {
        let delta = target - origin;
        let query = Self::swept_box(origin, delta, half_extent)?;
        Some((query, delta.length()))
    }

    /// Whether this is a zero-extent ray.
    #[inline]
    pub fn is_ray(&self) -> bool {
        self.half_extent == Vec3::ZERO
    }

    /// Point reached after travelling `distance`.
    #[inline]
    pub fn point_at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// Box covering the whole sweep up to `distance`.
    ///
    /// Only meaningful for finite distances.
    pub fn swept_bounds(&self, distance: f32) -> Aabb {
        let start = Aabb::from_half_extent(self.origin, self.half_extent);
        let end = Aabb::from_half_extent(self.point_at(distance), self.half_extent);
        start.union(&end)
    }

    /// Slab test against a static box, expanded by this query's half extent.
    pub fn intersect(&self, target: &Aabb) -> Option<SlabHit> {
        slab_test(self.origin, self.direction, &target.expanded(self.half_extent))
    }
}

/// Raw result of a ray against a box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlabHit {
    /// Distance at which the ray enters the box. Negative when the origin is
    /// already inside.
    pub entry: f32,
    /// Distance at which the ray leaves the box.
    pub exit: f32,
    /// Outward normal of the face the ray enters through.
    pub normal: Vec3,
}

impl SlabHit {
    /// Whether the ray origin was already inside the box.
    #[inline]
    pub fn starts_inside(&self) -> bool {
        self.entry < 0.0
    }
}

/// Ray against box using the slab method.
///
/// Grazing contacts, where the ray only touches a face or edge, are misses.
/// `direction` does not need to be normalized, but distances are then in
/// units of its length.
pub fn slab_test(origin: Vec3, direction: Vec3, aabb: &Aabb) -> Option<SlabHit> {
    let min = aabb.min();
    let max = aabb.max();

    let mut entry = f32::NEG_INFINITY;
    let mut exit = f32::INFINITY;
    let mut normal = Vec3::ZERO;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];

        if d.abs() < PARALLEL_EPSILON {
            if o <= min[axis] || o >= max[axis] {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let t1 = (min[axis] - o) * inv;
        let t2 = (max[axis] - o) * inv;

        // Moving along +axis enters through the min face, whose normal is -axis.
        let (near, far, sign) = if t1 < t2 { (t1, t2, -1.0) } else { (t2, t1, 1.0) };

        if near > entry {
            entry = near;
            normal = Vec3::ZERO;
            normal[axis] = sign;
        }
        exit = exit.min(far);

        if entry >= exit {
            return None;
        }
    }

    if normal == Vec3::ZERO {
        return None;
    }

    Some(SlabHit { entry, exit, normal })
}
