//! Flying drone.
//!
//! Drones patrol the level's nav nodes and chase the player's last known
//! position once they have aggro. Steering produces a velocity which is then
//! resolved against the world like any other agent, minus gravity and
//! stepping.

use glam::Vec3;
use sps_physics::geometry::vector::{checked_normalize, clamp_magnitude};
use sps_physics::{resolve_motion, ColliderKey, KinematicState, MotionInput};

use crate::config::AiConfig;
use crate::damage::Damageable;
use crate::entity::{Entity, EntityId, Target, TickContext};
use crate::projectile::Projectile;
use crate::transform::PoseUpdate;
use crate::view::ViewAngles;

use super::Perception;

#[derive(Debug, Clone)]
pub struct Drone {
    pub body: KinematicState,
    pub perception: Perception,
    pub health: i32,
    pub hitbox: Option<ColliderKey>,
    /// Index of the nav node currently patrolled towards.
    pub patrol_index: usize,
    last_shot: Option<f64>,
}

impl Drone {
    /// A drone whose box is centered on `center`.
    pub fn new(center: Vec3, ai: &AiConfig) -> Self {
        let half_extent = ai.drone_half_extent;
        Self {
            body: KinematicState::new(center - Vec3::new(0.0, half_extent.y, 0.0), half_extent),
            perception: Perception::default(),
            health: ai.drone_health,
            hitbox: None,
            patrol_index: 0,
            last_shot: None,
        }
    }

    pub fn eye(&self) -> Vec3 {
        self.body.center()
    }

    pub fn tick(&mut self, id: EntityId, ctx: &mut TickContext) {
        let config = ctx.config;
        let ai = &config.ai;
        let dt = ctx.dt();

        self.perception.decay(ai.aggro_decay, dt);

        let desired = self
            .goal(ctx.nav_nodes, ai.nav_arrive_radius)
            .map_or(Vec3::ZERO, |goal| {
                desired_velocity(self.eye(), goal, ai.drone_max_speed, ai.drone_speed_falloff)
            });
        let velocity = steer(self.body.velocity, desired, ai.drone_max_accel * dt);

        let out = resolve_motion(
            ctx.world,
            &config.movement,
            &MotionInput {
                position: self.body.position,
                velocity,
                half_extent: self.body.half_extent,
                delta_time: dt,
                allow_step: false,
                grounded: false,
                snap_to_ground: false,
            },
        );
        if !self.body.commit(out.position, out.velocity) {
            log::warn!("drone {id:?} produced non-finite motion, keeping previous state");
        }

        if let Some(key) = self.hitbox {
            ctx.hitboxes
                .update(key, self.body.center(), self.body.half_extent * 2.0);
        }

        if let Some(direction) = self.aim(ctx.target, ctx.clock.time, ai) {
            if let Some(projectile) = Projectile::new(self.eye(), direction, Some(id), ai) {
                ctx.commands.spawn.push(Entity::Projectile(projectile));
            }
        }

        let facing = if self.perception.is_aggro() {
            self.perception.last_seen_position - self.eye()
        } else {
            self.body.velocity
        };
        ctx.commands.poses.push(PoseUpdate {
            entity: id,
            position: self.body.position,
            rotation: checked_normalize(facing).map(|dir| ViewAngles::from_direction(dir).euler()),
        });
    }

    /// Where the drone is heading. With aggro that is the last place the
    /// target was seen, otherwise the current patrol node.
    pub fn goal(&mut self, nav_nodes: &[Vec3], arrive_radius: f32) -> Option<Vec3> {
        if self.perception.is_aggro() {
            return Some(self.perception.last_seen_position);
        }
        if nav_nodes.is_empty() {
            return None;
        }

        let mut node = nav_nodes[self.patrol_index % nav_nodes.len()];
        if node.distance(self.eye()) < arrive_radius {
            self.patrol_index = (self.patrol_index + 1) % nav_nodes.len();
            node = nav_nodes[self.patrol_index];
        }
        Some(node)
    }

    /// Direction to shoot in, if the drone should fire this tick.
    fn aim(&mut self, target: Option<Target>, now: f64, ai: &AiConfig) -> Option<Vec3> {
        let target = target?;
        if !self.perception.visible {
            return None;
        }
        let to_target = target.center - self.eye();
        if to_target.length() > ai.drone_fire_range {
            return None;
        }
        if let Some(t) = self.last_shot {
            if now - t < f64::from(ai.drone_fire_interval) {
                return None;
            }
        }
        let direction = checked_normalize(to_target)?;
        self.last_shot = Some(now);
        Some(direction)
    }
}

impl Damageable for Drone {
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

/// Velocity towards `to`, easing off exponentially as the distance drops
/// below `falloff`.
pub fn desired_velocity(from: Vec3, to: Vec3, max_speed: f32, falloff: f32) -> Vec3 {
    let delta = to - from;
    let Some(dir) = checked_normalize(delta) else {
        return Vec3::ZERO;
    };
    dir * max_speed * (1.0 - (-delta.length() / falloff).exp())
}

/// Move `velocity` towards `desired` by at most `max_delta`.
pub fn steer(velocity: Vec3, desired: Vec3, max_delta: f32) -> Vec3 {
    velocity + clamp_magnitude(desired - velocity, max_delta)
}
