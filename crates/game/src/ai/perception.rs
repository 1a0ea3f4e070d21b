//! Line-of-sight awareness shared by the AI agents.

use glam::Vec3;
use sps_physics::{ColliderScene, SweepQuery};

use crate::config::AiConfig;
use crate::entity::Target;

/// What an agent knows about its target.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Perception {
    /// Decays towards zero while the target is hidden.
    pub aggro: f32,
    /// Result of the latest line-of-sight check.
    pub visible: bool,
    pub last_seen_position: Vec3,
    pub last_seen_time: f64,
}

impl Perception {
    /// Run a line-of-sight check from `eye` to the target.
    ///
    /// A target standing exactly on the eye gives no usable direction; the
    /// previous result is kept.
    pub fn observe(
        &mut self,
        eye: Vec3,
        target: Option<Target>,
        world: &ColliderScene<()>,
        now: f64,
        config: &AiConfig,
    ) {
        let Some(target) = target else {
            self.visible = false;
            return;
        };
        let Some(visible) = line_of_sight(world, eye, target.center) else {
            return;
        };

        self.visible = visible;
        if visible {
            self.aggro = config.max_aggro;
            self.last_seen_position = target.center;
            self.last_seen_time = now;
        }
    }

    /// Lose aggro while the target is out of sight.
    pub fn decay(&mut self, rate: f32, dt: f32) {
        if !self.visible {
            self.aggro = (self.aggro - rate * dt).max(0.0);
        }
    }

    pub fn is_aggro(&self) -> bool {
        self.aggro > 0.0
    }
}

/// Whether nothing in `world` blocks the segment between two points. `None`
/// when the points coincide.
pub fn line_of_sight(world: &ColliderScene<()>, from: Vec3, to: Vec3) -> Option<bool> {
    let (query, distance) = SweepQuery::towards(from, to, Vec3::ZERO)?;
    Some(world.first_hit(&query, distance).is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;
    use sps_physics::Aabb;

    fn target_at(center: Vec3) -> Target {
        let mut ids = SlotMap::with_key();
        Target {
            id: ids.insert(()),
            center,
        }
    }

    fn walled() -> ColliderScene<()> {
        let mut world = ColliderScene::new();
        world.add(Aabb::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(2.0, 2.0, 0.5)), ());
        world
    }

    #[test]
    fn test_line_of_sight() {
        let world = walled();
        assert_eq!(line_of_sight(&world, Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0)), Some(false));
        assert_eq!(line_of_sight(&world, Vec3::ZERO, Vec3::new(0.0, 0.0, -4.0)), Some(true));
        assert_eq!(line_of_sight(&world, Vec3::ZERO, Vec3::new(5.0, 0.0, -10.0)), Some(true));
        assert_eq!(line_of_sight(&world, Vec3::ONE, Vec3::ONE), None);
    }

    #[test]
    fn test_seen_target_sets_max_aggro() {
        let world = walled();
        let config = AiConfig::default();
        let mut perception = Perception::default();

        let target = target_at(Vec3::new(3.0, 0.0, 0.0));
        perception.observe(Vec3::ZERO, Some(target), &world, 2.0, &config);

        assert!(perception.visible);
        assert_eq!(perception.aggro, 100.0);
        assert_eq!(perception.last_seen_position, target.center);
        assert_eq!(perception.last_seen_time, 2.0);
    }

    #[test]
    fn test_hidden_target_decays() {
        let world = walled();
        let config = AiConfig::default();
        let mut perception = Perception::default();

        perception.observe(Vec3::ZERO, Some(target_at(Vec3::new(3.0, 0.0, 0.0))), &world, 0.0, &config);
        perception.observe(Vec3::ZERO, Some(target_at(Vec3::new(0.0, 0.0, -10.0))), &world, 1.0, &config);
        assert!(!perception.visible);
        assert_eq!(perception.last_seen_position, Vec3::new(3.0, 0.0, 0.0));

        perception.decay(config.aggro_decay, 2.0);
        assert_eq!(perception.aggro, 70.0);
        perception.decay(config.aggro_decay, 10.0);
        assert_eq!(perception.aggro, 0.0);
        assert!(!perception.is_aggro());
    }

    #[test]
    fn test_no_target_is_not_visible() {
        let world = ColliderScene::new();
        let mut perception = Perception {
            visible: true,
            ..Default::default()
        };
        perception.observe(Vec3::ZERO, None, &world, 0.0, &AiConfig::default());
        assert!(!perception.visible);
    }
}
