//! Collider scene containing boxes and answering swept queries against them.
//!
//! A scene stores axis-aligned boxes tagged with caller-supplied user data and
//! answers nearest-hit and all-hits queries. Several independent scenes exist
//! side by side (world geometry, agent hitboxes, trigger volumes); queries
//! never cross between them.

use glam::Vec3;
use slotmap::SlotMap;

use crate::geometry::{Aabb, SlabHit, SweepQuery};

use super::zones::{ZoneConfig, ZoneStats, ZoneTree};

slotmap::new_key_type! {
    /// Generation-checked handle to a collider. A key from a removed collider
    /// never resolves again, even if its slot is reused.
    pub struct ColliderKey;
}

/// A box stored in a scene together with its user data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider<U> {
    /// World space box.
    pub aabb: Aabb,
    /// Opaque back-reference supplied by the owner.
    pub user: U,
}

/// Result of a swept query against one collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit<U> {
    /// Distance along the query at which contact begins. Zero when the query
    /// started overlapping.
    pub t_min: f32,
    /// Distance at which the moving box fully leaves the collider. Negative
    /// when the query started overlapping.
    pub t_out: f32,
    /// Center of the moving box at contact. For a ray, the surface point.
    pub position: Vec3,
    /// Outward normal of the face that was hit.
    pub normal: Vec3,
    /// Key of the collider that was hit.
    pub collider: ColliderKey,
    /// User data of the collider that was hit.
    pub user: U,
}

impl<U> SweepHit<U> {
    /// Whether the query origin was already inside the collider.
    #[inline]
    pub fn is_stuck(&self) -> bool {
        self.t_out < 0.0
    }
}

/// A spatially partitioned set of colliders.
#[derive(Debug, Clone)]
pub struct ColliderScene<U> {
    colliders: SlotMap<ColliderKey, Collider<U>>,
    zones: ZoneTree,
}

impl<U: Copy> Default for ColliderScene<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: Copy> ColliderScene<U> {
    /// Create an empty scene with the default zone layout.
    pub fn new() -> Self {
        Self::with_zones(ZoneConfig::default())
    }

    /// Create an empty scene with a custom zone layout.
    pub fn with_zones(config: ZoneConfig) -> Self {
        Self {
            colliders: SlotMap::with_key(),
            zones: ZoneTree::new(config),
        }
    }

    /// Add a box to the scene.
    pub fn add(&mut self, aabb: Aabb, user: U) -> ColliderKey {
        let key = self.colliders.insert(Collider { aabb, user });
        self.zones.insert(key, aabb);
        key
    }

    /// Remove a collider, returning its user data. Stale keys return `None`.
    pub fn remove(&mut self, key: ColliderKey) -> Option<U> {
        let collider = self.colliders.remove(key)?;
        self.zones.remove(key, &collider.aabb);
        Some(collider.user)
    }

    /// Move and resize a collider in place. The key stays valid.
    ///
    /// Returns `false` if the key is stale.
    pub fn update(&mut self, key: ColliderKey, center: Vec3, size: Vec3) -> bool {
        let Some(collider) = self.colliders.get_mut(key) else {
            return false;
        };
        let old = collider.aabb;
        let new = Aabb::new(center, size);
        collider.aabb = new;
        if old != new {
            self.zones.remove(key, &old);
            self.zones.insert(key, new);
        }
        true
    }

    /// Look up a collider.
    pub fn get(&self, key: ColliderKey) -> Option<&Collider<U>> {
        self.colliders.get(key)
    }

    /// Whether `key` still refers to a collider in this scene.
    pub fn contains(&self, key: ColliderKey) -> bool {
        self.colliders.contains_key(key)
    }

    /// Number of colliders.
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    /// Whether the scene holds no colliders.
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Iterate over every collider.
    pub fn iter(&self) -> impl Iterator<Item = (ColliderKey, &Collider<U>)> {
        self.colliders.iter()
    }

    /// Remove every collider. Used on level reload.
    pub fn reset(&mut self) {
        self.colliders.clear();
        self.zones.clear();
    }

    /// Closest collider the query touches within `max_distance`.
    ///
    /// `max_distance` may be infinite for hit-scan queries.
    pub fn first_hit(&self, query: &SweepQuery, max_distance: f32) -> Option<SweepHit<U>> {
        self.first_hit_where(query, max_distance, |_, _| true)
    }

    /// Like [`first_hit`](Self::first_hit), ignoring colliders rejected by
    /// `filter`.
    pub fn first_hit_where(
        &self,
        query: &SweepQuery,
        max_distance: f32,
        mut filter: impl FnMut(ColliderKey, &U) -> bool,
    ) -> Option<SweepHit<U>> {
        let mut best: Option<(ColliderKey, SlabHit)> = None;

        self.zones.visit_sweep(query, max_distance, |key, aabb| {
            let Some(hit) = within_range(query, aabb, max_distance) else {
                return;
            };
            if best.is_some_and(|(_, b)| b.entry.max(0.0) <= hit.entry.max(0.0)) {
                return;
            }
            if let Some(collider) = self.colliders.get(key) {
                if filter(key, &collider.user) {
                    best = Some((key, hit));
                }
            }
        });

        let (key, hit) = best?;
        let collider = self.colliders.get(key)?;
        Some(make_hit(query, key, &collider.aabb, collider.user, hit))
    }

    /// Every collider the query touches within `max_distance`, unordered.
    pub fn all_hits(&self, query: &SweepQuery, max_distance: f32) -> Vec<SweepHit<U>> {
        let mut hits = Vec::new();
        self.zones.visit_sweep(query, max_distance, |key, aabb| {
            if let (Some(hit), Some(collider)) =
                (within_range(query, aabb, max_distance), self.colliders.get(key))
            {
                hits.push(make_hit(query, key, aabb, collider.user, hit));
            }
        });
        hits
    }

    /// Keys of every collider strictly overlapping `region`.
    pub fn overlapping(&self, region: &Aabb) -> Vec<ColliderKey> {
        let mut keys = Vec::new();
        self.zones.visit_region(region, |key, aabb| {
            if aabb.intersects(region) {
                keys.push(key);
            }
        });
        keys
    }

    /// Names of every zone created so far.
    pub fn zone_names(&self) -> Vec<&str> {
        self.zones.zone_names()
    }

    /// Boxes owned by every zone whose name starts with `prefix`.
    pub fn zone_boxes(&self, prefix: &str) -> Vec<Aabb> {
        self.zones.zone_boxes(prefix)
    }

    /// Bounds of a named zone.
    pub fn zone_bounds(&self, name: &str) -> Option<Aabb> {
        self.zones.zone_bounds(name)
    }

    /// Counters for debug overlays.
    pub fn zone_stats(&self) -> ZoneStats {
        self.zones.stats()
    }
}

fn within_range(query: &SweepQuery, aabb: &Aabb, max_distance: f32) -> Option<SlabHit> {
    let hit = query.intersect(aabb)?;
    (hit.exit > 0.0 && hit.entry <= max_distance).then_some(hit)
}

fn make_hit<U>(query: &SweepQuery, key: ColliderKey, aabb: &Aabb, user: U, hit: SlabHit) -> SweepHit<U> {
    if hit.starts_inside() {
        SweepHit {
            t_min: 0.0,
            t_out: -hit.exit,
            position: query.origin,
            normal: least_penetration_normal(query.origin, &aabb.expanded(query.half_extent)),
            collider: key,
            user,
        }
    } else {
        SweepHit {
            t_min: hit.entry,
            t_out: hit.exit,
            position: query.point_at(hit.entry),
            normal: hit.normal,
            collider: key,
            user,
        }
    }
}

/// Outward normal of the face of `aabb` closest to `point`.
fn least_penetration_normal(point: Vec3, aabb: &Aabb) -> Vec3 {
    let to_min = point - aabb.min();
    let to_max = aabb.max() - point;

    let mut best = f32::INFINITY;
    let mut normal = Vec3::Y;
    for axis in 0..3 {
        if to_min[axis] < best {
            best = to_min[axis];
            normal = Vec3::ZERO;
            normal[axis] = -1.0;
        }
        if to_max[axis] < best {
            best = to_max[axis];
            normal = Vec3::ZERO;
            normal[axis] = 1.0;
        }
    }
    normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn floor_scene() -> (ColliderScene<u32>, ColliderKey) {
        let mut scene = ColliderScene::new();
        let key = scene.add(
            Aabb::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(10.0, 1.0, 10.0)),
            7,
        );
        (scene, key)
    }

    #[test]
    fn test_ray_hits_floor_from_above() {
        let (scene, key) = floor_scene();
        let query = SweepQuery::ray(Vec3::new(0.0, 5.0, 10.0), -Vec3::Y).unwrap();
        let hit = scene.first_hit(&query, f32::INFINITY).unwrap();

        assert_eq!(hit.collider, key);
        assert_eq!(hit.user, 7);
        assert!((hit.t_min - 4.5).abs() < 1.0e-5);
        assert_eq!(hit.normal, Vec3::Y);
        assert!((hit.position.y - 0.5).abs() < 1.0e-5);
        assert!(!hit.is_stuck());
    }

    #[test]
    fn test_max_distance_limits_hits() {
        let (scene, _) = floor_scene();
        let query = SweepQuery::ray(Vec3::new(0.0, 5.0, 10.0), -Vec3::Y).unwrap();
        assert!(scene.first_hit(&query, 4.0).is_none());
        assert!(scene.first_hit(&query, 4.6).is_some());
    }

    #[test]
    fn test_box_behind_query_is_ignored() {
        let (scene, _) = floor_scene();
        let query = SweepQuery::ray(Vec3::new(0.0, 5.0, 10.0), Vec3::Y).unwrap();
        assert!(scene.first_hit(&query, f32::INFINITY).is_none());
    }

    #[test]
    fn test_overlapping_start_reports_negative_t_out() {
        let (scene, _) = floor_scene();
        let query =
            SweepQuery::swept_box(Vec3::new(0.0, 0.6, 10.0), Vec3::X, Vec3::splat(0.5)).unwrap();
        let hit = scene.first_hit(&query, 1.0).unwrap();

        assert!(hit.is_stuck());
        assert_eq!(hit.t_min, 0.0);
        // Closest face of the expanded floor is its top at y = 1.0.
        assert_eq!(hit.normal, Vec3::Y);
    }

    #[test]
    fn test_first_hit_picks_closest() {
        let mut scene = ColliderScene::new();
        scene.add(Aabb::new(Vec3::new(10.0, 0.0, 0.0), Vec3::ONE), 1u32);
        scene.add(Aabb::new(Vec3::new(5.0, 0.0, 0.0), Vec3::ONE), 2u32);
        scene.add(Aabb::new(Vec3::new(20.0, 0.0, 0.0), Vec3::ONE), 3u32);

        let query = SweepQuery::ray(Vec3::ZERO, Vec3::X).unwrap();
        assert_eq!(scene.first_hit(&query, f32::INFINITY).unwrap().user, 2);
        assert_eq!(scene.all_hits(&query, f32::INFINITY).len(), 3);
        assert_eq!(scene.all_hits(&query, 12.0).len(), 2);
    }

    #[test]
    fn test_first_hit_where_skips_filtered() {
        let mut scene = ColliderScene::new();
        scene.add(Aabb::new(Vec3::new(5.0, 0.0, 0.0), Vec3::ONE), 1u32);
        scene.add(Aabb::new(Vec3::new(10.0, 0.0, 0.0), Vec3::ONE), 2u32);

        let query = SweepQuery::ray(Vec3::ZERO, Vec3::X).unwrap();
        let hit = scene
            .first_hit_where(&query, f32::INFINITY, |_, user| *user != 1)
            .unwrap();
        assert_eq!(hit.user, 2);
    }

    #[test]
    fn test_add_remove_round_trip() {
        let (mut scene, _) = floor_scene();
        let query = SweepQuery::ray(Vec3::new(0.0, 5.0, 10.0), -Vec3::Y).unwrap();
        let before = scene.first_hit(&query, f32::INFINITY);

        let extra = scene.add(Aabb::new(Vec3::new(0.0, 2.0, 10.0), Vec3::ONE), 99);
        assert_eq!(scene.first_hit(&query, f32::INFINITY).unwrap().user, 99);

        assert_eq!(scene.remove(extra), Some(99));
        assert_eq!(scene.first_hit(&query, f32::INFINITY), before);
        assert!(scene.remove(extra).is_none());
        assert!(!scene.update(extra, Vec3::ZERO, Vec3::ONE));
    }

    #[test]
    fn test_update_moves_collider_and_keeps_key() {
        let (mut scene, key) = floor_scene();
        assert!(scene.update(key, Vec3::new(100.0, 0.0, 0.0), Vec3::new(10.0, 1.0, 10.0)));

        let query = SweepQuery::ray(Vec3::new(0.0, 5.0, 10.0), -Vec3::Y).unwrap();
        assert!(scene.first_hit(&query, f32::INFINITY).is_none());

        let moved = SweepQuery::ray(Vec3::new(100.0, 5.0, 0.0), -Vec3::Y).unwrap();
        assert_eq!(scene.first_hit(&moved, f32::INFINITY).unwrap().collider, key);
    }

    #[test]
    fn test_reset_clears_everything() {
        let (mut scene, key) = floor_scene();
        scene.reset();
        assert!(scene.is_empty());
        assert!(scene.get(key).is_none());
        assert_eq!(scene.zone_names(), vec!["root"]);
    }

    #[test]
    fn test_overlapping_excludes_touching() {
        let (scene, key) = floor_scene();
        let resting = Aabb::new(Vec3::new(0.0, 1.0, 10.0), Vec3::ONE);
        assert!(scene.overlapping(&resting).is_empty());

        let sunk = Aabb::new(Vec3::new(0.0, 0.9, 10.0), Vec3::ONE);
        assert_eq!(scene.overlapping(&sunk), vec![key]);
    }

    #[test]
    fn test_many_colliders_split_into_zones() {
        let mut scene = ColliderScene::with_zones(ZoneConfig {
            center: Vec3::ZERO,
            size: Vec3::splat(256.0),
            max_depth: 4,
            split_threshold: 4,
        });
        for x in 0..10 {
            for z in 0..10 {
                let center = Vec3::new(x as f32 * 20.0 - 95.0, 10.0, z as f32 * 20.0 - 95.0);
                scene.add(Aabb::new(center, Vec3::splat(2.0)), x * 10 + z);
            }
        }

        let stats = scene.zone_stats();
        assert!(stats.zones > 1);
        assert!(stats.deepest_occupied > 0);
        assert_eq!(stats.root_colliders, 0);
        assert_eq!(scene.zone_boxes("root").len(), 100);
        // Everything sits above y = 0, so the lower octants stay empty.
        assert!(scene.zone_boxes("root/0").is_empty());

        let query = SweepQuery::ray(Vec3::new(-95.0, 30.0, -95.0), -Vec3::Y).unwrap();
        assert_eq!(scene.first_hit(&query, f32::INFINITY).unwrap().user, 0);
    }

    proptest! {
        #[test]
        fn prop_ray_first_hit_matches_nearest_all_hit(
            cx in -20.0f32..20.0, cy in -20.0f32..20.0, cz in -20.0f32..20.0,
            sx in 0.5f32..8.0, sy in 0.5f32..8.0, sz in 0.5f32..8.0,
            dx in -1.0f32..1.0, dy in -1.0f32..1.0, dz in -1.0f32..1.0,
        ) {
            let mut scene = ColliderScene::new();
            scene.add(Aabb::new(Vec3::new(cx, cy, cz), Vec3::new(sx, sy, sz)), ());

            if let Some(query) = SweepQuery::ray(Vec3::new(0.0, 30.0, 0.0), Vec3::new(dx, dy, dz)) {
                let first = scene.first_hit(&query, f32::INFINITY);
                let all = scene.all_hits(&query, f32::INFINITY);
                let nearest = all
                    .iter()
                    .min_by(|a, b| a.t_min.total_cmp(&b.t_min))
                    .copied();

                prop_assert_eq!(first.is_some(), nearest.is_some());
                if let (Some(a), Some(b)) = (first, nearest) {
                    prop_assert_eq!(a.position, b.position);
                    prop_assert_eq!(a.normal, b.normal);
                }
            }
        }
    }
}
