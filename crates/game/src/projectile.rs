//! Straight-flying projectiles.

use glam::Vec3;
use sps_physics::geometry::vector::checked_normalize;
use sps_physics::{ColliderScene, SweepHit, SweepQuery};

use crate::config::AiConfig;
use crate::damage::{DamageEvent, DamageSource};
use crate::entity::{EntityId, TickContext};
use crate::transform::PoseUpdate;
use crate::view::ViewAngles;

/// A box travelling in a straight line until it hits something.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    /// Box center.
    pub position: Vec3,
    /// Unit travel direction.
    pub direction: Vec3,
    pub speed: f32,
    pub half_extent: Vec3,
    pub damage: i32,
    /// Hitbox owner the projectile passes through.
    pub owner: Option<EntityId>,
}

/// Result of one projectile step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectileStep {
    Flying,
    HitWorld,
    HitTarget(SweepHit<EntityId>),
}

impl Projectile {
    /// Projectile with the AI's speed, size and damage. `None` for a zero
    /// direction.
    pub fn new(position: Vec3, direction: Vec3, owner: Option<EntityId>, ai: &AiConfig) -> Option<Self> {
        Some(Self {
            position,
            direction: checked_normalize(direction)?,
            speed: ai.projectile_speed,
            half_extent: ai.projectile_half_extent,
            damage: ai.projectile_damage,
            owner,
        })
    }

    pub fn tick(&mut self, id: EntityId, ctx: &mut TickContext) {
        match self.advance(ctx.dt(), ctx.world, ctx.hitboxes) {
            ProjectileStep::Flying => {
                ctx.commands.poses.push(PoseUpdate {
                    entity: id,
                    position: self.position,
                    rotation: Some(ViewAngles::from_direction(self.direction).euler()),
                });
            }
            ProjectileStep::HitWorld => ctx.commands.despawn.push(id),
            ProjectileStep::HitTarget(hit) => {
                ctx.commands.damage.push(DamageEvent {
                    target: hit.user,
                    amount: self.damage,
                    position: hit.position,
                    source: DamageSource::Projectile,
                });
                ctx.commands.despawn.push(id);
            }
        }
    }

    /// Sweep this tick's travel against both scenes.
    ///
    /// World geometry bounds the hitbox query, so nothing behind a wall is
    /// hit.
    pub fn advance(
        &mut self,
        dt: f32,
        world: &ColliderScene<()>,
        hitboxes: &ColliderScene<EntityId>,
    ) -> ProjectileStep {
        let distance = self.speed * dt;
        if !(distance > 0.0) {
            return ProjectileStep::Flying;
        }
        let Some(query) = SweepQuery::swept_box(self.position, self.direction, self.half_extent) else {
            return ProjectileStep::Flying;
        };

        let world_hit = world.first_hit(&query, distance);
        let bound = world_hit.map_or(distance, |hit| hit.t_min);
        let owner = self.owner;
        if let Some(hit) = hitboxes.first_hit_where(&query, bound, |_, &id| Some(id) != owner) {
            self.position = hit.position;
            return ProjectileStep::HitTarget(hit);
        }
        if let Some(hit) = world_hit {
            self.position = hit.position;
            return ProjectileStep::HitWorld;
        }

        self.position += self.direction * distance;
        ProjectileStep::Flying
    }
}
