//! Stationary turret.

use glam::{Quat, Vec3};
use sps_physics::geometry::vector::checked_normalize;
use sps_physics::{Aabb, ColliderKey};

use crate::config::AiConfig;
use crate::damage::Damageable;
use crate::entity::{Entity, EntityId, TickContext};
use crate::projectile::Projectile;
use crate::transform::PoseUpdate;
use crate::view::ViewAngles;

use super::Perception;

/// Turret behaviour state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum TurretState {
    /// No aggro.
    #[default]
    Idle = 0,
    /// Aggro left over but the target is hidden.
    Searching = 1,
    /// Target visible, still turning.
    Tracking = 2,
    /// Facing the target within the align tolerance.
    Aligned = 3,
}

#[derive(Debug, Clone)]
pub struct Turret {
    /// Hitbox center.
    pub position: Vec3,
    pub hitbox_size: Vec3,
    /// Unit aim direction.
    pub view_dir: Vec3,
    pub state: TurretState,
    pub perception: Perception,
    pub health: i32,
    pub hitbox: Option<ColliderKey>,
    last_shot: Option<f64>,
}

impl Turret {
    pub fn new(position: Vec3, hitbox_size: Vec3, facing: Vec3, health: i32) -> Self {
        Self {
            position,
            hitbox_size,
            view_dir: checked_normalize(facing).unwrap_or(Vec3::NEG_Z),
            state: TurretState::Idle,
            perception: Perception::default(),
            health,
            hitbox: None,
            last_shot: None,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.position, self.hitbox_size)
    }

    /// Point line-of-sight checks start from.
    pub fn eye(&self) -> Vec3 {
        self.position
    }

    pub fn tick(&mut self, id: EntityId, ctx: &mut TickContext) {
        let ai = &ctx.config.ai;
        if self.think(ctx.dt(), ctx.clock.time, ai) {
            if let Some(projectile) = Projectile::new(self.position, self.view_dir, Some(id), ai) {
                ctx.commands.spawn.push(Entity::Projectile(projectile));
            }
        }

        ctx.commands.poses.push(PoseUpdate {
            entity: id,
            position: self.position,
            rotation: Some(ViewAngles::from_direction(self.view_dir).euler()),
        });
    }

    /// Update aggro, aim and state. Returns whether to fire this tick.
    pub fn think(&mut self, dt: f32, now: f64, ai: &AiConfig) -> bool {
        self.perception.decay(ai.aggro_decay, dt);
        self.state = self.aim(ai.turret_turn_speed * dt, ai.align_tolerance);

        let ready = self
            .last_shot
            .map_or(true, |t| now - t >= f64::from(ai.turret_fire_interval));
        if self.state == TurretState::Aligned && ready {
            self.last_shot = Some(now);
            return true;
        }
        false
    }

    fn aim(&mut self, max_angle: f32, tolerance: f32) -> TurretState {
        if self.perception.visible {
            let Some(dir) = checked_normalize(self.perception.last_seen_position - self.position) else {
                return TurretState::Tracking;
            };
            self.view_dir = rotate_towards(self.view_dir, dir, max_angle);
            if self.view_dir.dot(dir) >= tolerance {
                TurretState::Aligned
            } else {
                TurretState::Tracking
            }
        } else if self.perception.is_aggro() {
            TurretState::Searching
        } else {
            TurretState::Idle
        }
    }
}

impl Damageable for Turret {
    fn on_damage(&mut self, amount: i32, _hit_position: Vec3) {
        if self.health > 0 {
            self.health = self.health.saturating_sub(amount);
        }
    }

    fn kill(&mut self) {
        self.health = 0;
    }

    fn health(&self) -> i32 {
        self.health
    }
}

/// Turn `current` towards `target` by at most `max_angle` radians.
///
/// A zero `current` snaps to the target; a zero `target` leaves `current`
/// alone.
pub fn rotate_towards(current: Vec3, target: Vec3, max_angle: f32) -> Vec3 {
    let Some(target) = checked_normalize(target) else {
        return current;
    };
    let Some(current) = checked_normalize(current) else {
        return target;
    };

    let angle = current.angle_between(target);
    if angle <= max_angle.max(0.0) {
        return target;
    }

    let step = Quat::IDENTITY.slerp(Quat::from_rotation_arc(current, target), max_angle.max(0.0) / angle);
    checked_normalize(step * current).unwrap_or(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible_at(turret: &mut Turret, point: Vec3) {
        turret.perception.visible = true;
        turret.perception.aggro = 100.0;
        turret.perception.last_seen_position = point;
    }

    #[test]
    fn test_rotate_towards_bounded() {
        let out = rotate_towards(Vec3::NEG_Z, Vec3::X, 0.1);
        assert!((out.angle_between(Vec3::NEG_Z) - 0.1).abs() < 1e-4);
        assert!((out.length() - 1.0).abs() < 1e-5);
        assert!(out.x > 0.0);
    }

    #[test]
    fn test_rotate_towards_snaps_when_close() {
        let out = rotate_towards(Vec3::NEG_Z, Vec3::new(0.01, 0.0, -1.0), 0.5);
        assert!((out - Vec3::new(0.01, 0.0, -1.0).normalize()).length() < 1e-6);
    }

    #[test]
    fn test_rotate_towards_degenerate() {
        assert_eq!(rotate_towards(Vec3::ZERO, Vec3::X * 3.0, 0.1), Vec3::X);
        assert_eq!(rotate_towards(Vec3::Z, Vec3::ZERO, 0.1), Vec3::Z);
    }

    #[test]
    fn test_rotate_towards_opposite() {
        let out = rotate_towards(Vec3::NEG_Z, Vec3::Z, 0.2);
        assert!((out.angle_between(Vec3::NEG_Z) - 0.2).abs() < 1e-4);
    }

    #[test]
    fn test_idle_without_aggro() {
        let mut turret = Turret::new(Vec3::ZERO, Vec3::ONE, Vec3::NEG_Z, 120);
        assert!(!turret.think(0.1, 0.0, &AiConfig::default()));
        assert_eq!(turret.state, TurretState::Idle);
    }

    #[test]
    fn test_tracks_then_aligns_then_fires() {
        let ai = AiConfig::default();
        let mut turret = Turret::new(Vec3::ZERO, Vec3::ONE, Vec3::NEG_Z, 120);
        visible_at(&mut turret, Vec3::new(10.0, 0.0, 0.0));

        // 90 degrees at 3 rad/s takes a bit over half a second.
        assert!(!turret.think(0.1, 0.1, &ai));
        assert_eq!(turret.state, TurretState::Tracking);

        let mut fired_at = None;
        for i in 2..20 {
            let now = i as f64 * 0.1;
            if turret.think(0.1, now, &ai) {
                fired_at = Some(now);
                break;
            }
        }
        assert_eq!(turret.state, TurretState::Aligned);
        assert!(fired_at.is_some());
        assert!(turret.view_dir.dot(Vec3::X) >= ai.align_tolerance);

        // Fire interval holds the next shot back.
        let now = fired_at.unwrap_or_default();
        assert!(!turret.think(0.1, now + 0.5, &ai));
        assert!(turret.think(0.1, now + 1.05, &ai));
    }

    #[test]
    fn test_searching_after_losing_sight() {
        let ai = AiConfig::default();
        let mut turret = Turret::new(Vec3::ZERO, Vec3::ONE, Vec3::NEG_Z, 120);
        visible_at(&mut turret, Vec3::new(0.0, 0.0, -5.0));
        turret.think(0.1, 0.0, &ai);
        assert_eq!(turret.state, TurretState::Aligned);

        turret.perception.visible = false;
        turret.think(1.0, 1.0, &ai);
        assert_eq!(turret.state, TurretState::Searching);
        assert_eq!(turret.state as u8, 1);

        // 85 aggro left decays in under 6 seconds.
        turret.think(6.0, 7.0, &ai);
        assert_eq!(turret.state, TurretState::Idle);
    }

    #[test]
    fn test_damage() {
        let mut turret = Turret::new(Vec3::ZERO, Vec3::ONE, Vec3::NEG_Z, 120);
        turret.on_damage(100, Vec3::ZERO);
        assert!(!turret.is_dead());
        turret.on_damage(100, Vec3::ZERO);
        assert!(turret.is_dead());
    }
}
