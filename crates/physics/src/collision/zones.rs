//! Hierarchical spatial partition for the collider scene.
//!
//! A loose octree of named sub-zones. Each collider is stored in the deepest
//! zone that fully contains it, so a query only visits the zones its sweep
//! actually reaches. Zones are named after their path from the root
//! (`root`, `root/3`, `root/3/5`, ...), which is what the debug views filter
//! on.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::geometry::{slab_test, Aabb, SweepQuery};

use super::scene::ColliderKey;

/// Name of the top-level zone.
pub const ROOT_ZONE: &str = "root";

/// Tuning for the zone hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    /// Center of the root zone.
    pub center: Vec3,
    /// Full size of the root zone. Colliders outside it live in the root.
    pub size: Vec3,
    /// Maximum subdivision depth.
    pub max_depth: u8,
    /// A zone splits once it owns more colliders than this.
    pub split_threshold: usize,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            size: Vec3::splat(1024.0),
            max_depth: 6,
            split_threshold: 8,
        }
    }
}

/// Summary counters for debug overlays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneStats {
    /// Number of zones created so far.
    pub zones: usize,
    /// Deepest zone that currently owns at least one collider.
    pub deepest_occupied: u8,
    /// Colliders stored directly in the root zone.
    pub root_colliders: usize,
}

#[derive(Debug, Clone)]
struct ZoneNode {
    name: String,
    bounds: Aabb,
    depth: u8,
    children: Option<[usize; 8]>,
    items: Vec<(ColliderKey, Aabb)>,
}

impl ZoneNode {
    fn new(name: String, bounds: Aabb, depth: u8) -> Self {
        Self {
            name,
            bounds,
            depth,
            children: None,
            items: Vec::new(),
        }
    }
}

/// The zone tree. Zones are only ever added, never merged, so an item can be
/// found again by walking down with the box it was inserted with.
#[derive(Debug, Clone)]
pub(crate) struct ZoneTree {
    config: ZoneConfig,
    nodes: Vec<ZoneNode>,
}

impl ZoneTree {
    pub(crate) fn new(config: ZoneConfig) -> Self {
        let root = ZoneNode::new(ROOT_ZONE.to_string(), Aabb::new(config.center, config.size), 0);
        Self {
            config,
            nodes: vec![root],
        }
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::new(self.config.clone());
    }

    pub(crate) fn insert(&mut self, key: ColliderKey, aabb: Aabb) {
        let index = self.locate(&aabb);
        self.nodes[index].items.push((key, aabb));
        self.maybe_split(index);
    }

    /// Remove an item previously inserted with `aabb`.
    pub(crate) fn remove(&mut self, key: ColliderKey, aabb: &Aabb) -> bool {
        let index = self.locate(aabb);
        let items = &mut self.nodes[index].items;
        match items.iter().position(|(k, _)| *k == key) {
            Some(pos) => {
                items.swap_remove(pos);
                true
            }
            None => false,
        }
    }

    /// Visit every item in zones the sweep reaches within `max_distance`.
    pub(crate) fn visit_sweep(
        &self,
        query: &SweepQuery,
        max_distance: f32,
        mut visit: impl FnMut(ColliderKey, &Aabb),
    ) {
        let mut stack = vec![0usize];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            for (key, aabb) in &node.items {
                visit(*key, aabb);
            }
            if let Some(children) = node.children {
                stack.extend(
                    children
                        .iter()
                        .copied()
                        .filter(|&c| sweep_reaches(query, &self.nodes[c].bounds, max_distance)),
                );
            }
        }
    }

    /// Visit every item in zones touching `region`.
    pub(crate) fn visit_region(&self, region: &Aabb, mut visit: impl FnMut(ColliderKey, &Aabb)) {
        let mut stack = vec![0usize];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            for (key, aabb) in &node.items {
                visit(*key, aabb);
            }
            if let Some(children) = node.children {
                stack.extend(
                    children
                        .iter()
                        .copied()
                        .filter(|&c| touches(&self.nodes[c].bounds, region)),
                );
            }
        }
    }

    pub(crate) fn zone_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name.as_str()).collect()
    }

    pub(crate) fn zone_boxes(&self, prefix: &str) -> Vec<Aabb> {
        self.nodes
            .iter()
            .filter(|n| n.name.starts_with(prefix))
            .flat_map(|n| n.items.iter().map(|(_, aabb)| *aabb))
            .collect()
    }

    pub(crate) fn zone_bounds(&self, name: &str) -> Option<Aabb> {
        self.nodes.iter().find(|n| n.name == name).map(|n| n.bounds)
    }

    pub(crate) fn stats(&self) -> ZoneStats {
        ZoneStats {
            zones: self.nodes.len(),
            deepest_occupied: self
                .nodes
                .iter()
                .filter(|n| !n.items.is_empty())
                .map(|n| n.depth)
                .max()
                .unwrap_or(0),
            root_colliders: self.nodes[0].items.len(),
        }
    }

    /// Deepest existing zone that fully contains `aabb`.
    fn locate(&self, aabb: &Aabb) -> usize {
        let mut index = 0;
        while let Some(children) = self.nodes[index].children {
            match children.iter().find(|&&c| self.nodes[c].bounds.contains(aabb)) {
                Some(&child) => index = child,
                None => break,
            }
        }
        index
    }

    fn maybe_split(&mut self, index: usize) {
        let node = &self.nodes[index];
        if node.children.is_some()
            || node.items.len() <= self.config.split_threshold
            || node.depth >= self.config.max_depth
        {
            return;
        }

        let parent_bounds = node.bounds;
        let parent_name = node.name.clone();
        let depth = node.depth + 1;
        let quarter = parent_bounds.size * 0.25;
        let child_size = parent_bounds.size * 0.5;

        let mut children = [0usize; 8];
        for (octant, slot) in children.iter_mut().enumerate() {
            let offset = Vec3::new(
                if octant & 1 == 0 { -quarter.x } else { quarter.x },
                if octant & 2 == 0 { -quarter.y } else { quarter.y },
                if octant & 4 == 0 { -quarter.z } else { quarter.z },
            );
            let bounds = Aabb::new(parent_bounds.center + offset, child_size);
            *slot = self.nodes.len();
            self.nodes.push(ZoneNode::new(format!("{parent_name}/{octant}"), bounds, depth));
        }
        self.nodes[index].children = Some(children);

        let items = std::mem::take(&mut self.nodes[index].items);
        for (key, aabb) in items {
            match children.iter().find(|&&c| self.nodes[c].bounds.contains(&aabb)) {
                Some(&child) => self.nodes[child].items.push((key, aabb)),
                None => self.nodes[index].items.push((key, aabb)),
            }
        }

        for child in children {
            self.maybe_split(child);
        }
    }
}

/// Whether a sweep can touch anything inside `bounds` within `max_distance`.
fn sweep_reaches(query: &SweepQuery, bounds: &Aabb, max_distance: f32) -> bool {
    let expanded = bounds.expanded(query.half_extent);
    if expanded.contains_point(query.origin) {
        return true;
    }
    slab_test(query.origin, query.direction, &expanded)
        .is_some_and(|hit| hit.exit >= 0.0 && hit.entry <= max_distance)
}

/// Overlap test that also accepts shared faces.
fn touches(a: &Aabb, b: &Aabb) -> bool {
    a.min().cmple(b.max()).all() && b.min().cmple(a.max()).all()
}
