//! Entity storage types and the per-tick context handed to entities.
//!
//! Entities live in a generational arena keyed by [`EntityId`]. Every
//! collider an entity owns stores its id as user data, so a hit resolves back
//! to the entity through the arena, and a stale id (the entity despawned)
//! simply fails the lookup.

use glam::Vec3;
use slotmap::new_key_type;
use sps_physics::{ColliderScene, KinematicController};

use crate::ai::{Drone, Perception, Turret};
use crate::clock::Clock;
use crate::config::SimulationConfig;
use crate::damage::{DamageEvent, Damageable, Triggerable};
use crate::input::PlayerInput;
use crate::player::Player;
use crate::projectile::Projectile;
use crate::spawner::Spawner;
use crate::transform::PoseUpdate;
use crate::trigger::HurtTrigger;

new_key_type! {
    /// Generation-checked handle to an entity.
    pub struct EntityId;
}

/// Everything the simulation ticks.
#[derive(Debug, Clone)]
pub enum Entity {
    Player(Player),
    Turret(Turret),
    Drone(Drone),
    Projectile(Projectile),
    HurtTrigger(HurtTrigger),
    Spawner(Spawner),
}

/// Discriminant of [`Entity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
    Turret,
    Drone,
    Projectile,
    HurtTrigger,
    Spawner,
}

/// Snapshot of the player as AI sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub id: EntityId,
    /// Center of the target's box.
    pub center: Vec3,
}

/// Side effects queued by entity ticks, applied by the simulation after each
/// entity.
#[derive(Debug, Default)]
pub struct Commands {
    pub spawn: Vec<Entity>,
    pub despawn: Vec<EntityId>,
    pub damage: Vec<DamageEvent>,
    /// `(trigger, activator)` overlaps.
    pub triggered: Vec<(EntityId, EntityId)>,
    pub poses: Vec<PoseUpdate>,
}

/// Shared state an entity reads and writes during its tick.
pub struct TickContext<'a> {
    pub clock: &'a Clock,
    pub config: &'a SimulationConfig,
    pub controller: &'a KinematicController,
    pub world: &'a ColliderScene<()>,
    pub hitboxes: &'a mut ColliderScene<EntityId>,
    pub triggers: &'a ColliderScene<EntityId>,
    pub nav_nodes: &'a [Vec3],
    pub input: &'a PlayerInput,
    /// The player as of the start of this tick.
    pub target: Option<Target>,
    /// Drones currently alive.
    pub drone_count: usize,
    pub commands: &'a mut Commands,
}

impl TickContext<'_> {
    /// Tick length. Matches how far the clock moved this tick.
    #[inline]
    pub fn dt(&self) -> f32 {
        self.clock.delta
    }
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Player(_) => EntityKind::Player,
            Self::Turret(_) => EntityKind::Turret,
            Self::Drone(_) => EntityKind::Drone,
            Self::Projectile(_) => EntityKind::Projectile,
            Self::HurtTrigger(_) => EntityKind::HurtTrigger,
            Self::Spawner(_) => EntityKind::Spawner,
        }
    }

    pub fn tick(&mut self, id: EntityId, ctx: &mut TickContext) {
        match self {
            Self::Player(player) => player.tick(id, ctx),
            Self::Turret(turret) => turret.tick(id, ctx),
            Self::Drone(drone) => drone.tick(id, ctx),
            Self::Projectile(projectile) => projectile.tick(id, ctx),
            Self::Spawner(spawner) => spawner.tick(id, ctx),
            // Passive. Reacts through `Triggerable`.
            Self::HurtTrigger(_) => {}
        }
    }

    /// World position, for logging and debug views.
    pub fn position(&self) -> Vec3 {
        match self {
            Self::Player(player) => player.position(),
            Self::Turret(turret) => turret.position,
            Self::Drone(drone) => drone.body.position,
            Self::Projectile(projectile) => projectile.position,
            Self::HurtTrigger(trigger) => trigger.aabb.center,
            Self::Spawner(spawner) => spawner.position,
        }
    }

    pub fn as_damageable_mut(&mut self) -> Option<&mut dyn Damageable> {
        match self {
            Self::Player(player) => Some(player),
            Self::Turret(turret) => Some(turret),
            Self::Drone(drone) => Some(drone),
            _ => None,
        }
    }

    pub fn as_triggerable_mut(&mut self) -> Option<&mut dyn Triggerable> {
        match self {
            Self::HurtTrigger(trigger) => Some(trigger),
            _ => None,
        }
    }

    /// Perception state and the point it looks from.
    pub fn perception_mut(&mut self) -> Option<(&mut Perception, Vec3)> {
        match self {
            Self::Turret(turret) => {
                let eye = turret.eye();
                Some((&mut turret.perception, eye))
            }
            Self::Drone(drone) => {
                let eye = drone.eye();
                Some((&mut drone.perception, eye))
            }
            _ => None,
        }
    }

    /// Register the entity's colliders under `id`.
    pub(crate) fn attach(
        &mut self,
        id: EntityId,
        hitboxes: &mut ColliderScene<EntityId>,
        triggers: &mut ColliderScene<EntityId>,
    ) {
        match self {
            Self::Player(player) => {
                player.hitbox = Some(hitboxes.add(player.body.bounds(), id));
            }
            Self::Turret(turret) => {
                turret.hitbox = Some(hitboxes.add(turret.bounds(), id));
            }
            Self::Drone(drone) => {
                drone.hitbox = Some(hitboxes.add(drone.body.bounds(), id));
            }
            Self::HurtTrigger(trigger) => {
                trigger.collider = Some(triggers.add(trigger.aabb, id));
            }
            Self::Projectile(_) | Self::Spawner(_) => {}
        }
    }

    /// Remove every collider the entity owns.
    pub(crate) fn detach(
        &mut self,
        hitboxes: &mut ColliderScene<EntityId>,
        triggers: &mut ColliderScene<EntityId>,
    ) {
        let hitbox = match self {
            Self::Player(player) => player.hitbox.take(),
            Self::Turret(turret) => turret.hitbox.take(),
            Self::Drone(drone) => drone.hitbox.take(),
            Self::HurtTrigger(trigger) => {
                if let Some(key) = trigger.collider.take() {
                    triggers.remove(key);
                }
                None
            }
            Self::Projectile(_) | Self::Spawner(_) => None,
        };
        if let Some(key) = hitbox {
            hitboxes.remove(key);
        }
    }
}
