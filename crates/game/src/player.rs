//! Player entity and state.

use glam::Vec3;
use sps_physics::{ColliderKey, KinematicState};

use crate::config::SimulationConfig;
use crate::damage::Damageable;
use crate::entity::{EntityId, TickContext};
use crate::transform::PoseUpdate;
use crate::view::ViewAngles;
use crate::weapon::{Shooter, Weapon, WeaponKind};

/// The locally controlled player.
#[derive(Debug, Clone)]
pub struct Player {
    /// Movement physics state.
    pub body: KinematicState,

    /// View orientation.
    pub view: ViewAngles,

    /// Current health (0 = dead).
    pub health: i32,

    /// Maximum health.
    pub max_health: i32,

    /// Equipped weapon.
    pub weapon: Weapon,

    /// Collider in the hitbox scene. Removed on death.
    pub hitbox: Option<ColliderKey>,

    /// Simulation time of death.
    pub died_at: Option<f64>,
}

impl Player {
    /// Create a new player at the given spawn position.
    pub fn new(position: Vec3, yaw: f32, config: &SimulationConfig) -> Self {
        Self {
            body: KinematicState::new(position, config.player.half_extent),
            view: ViewAngles::new(0.0, yaw),
            health: config.player.max_health,
            max_health: config.player.max_health,
            weapon: Weapon::new(WeaponKind::Glock, &config.weapon),
            hitbox: None,
            died_at: None,
        }
    }

    /// Get the player's current position.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.body.position
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Camera position.
    pub fn eye(&self, camera_offset: Vec3) -> Vec3 {
        self.body.position + camera_offset
    }

    /// Advance the player by one tick.
    ///
    /// Dead players don't move, shoot or trigger anything.
    pub fn tick(&mut self, id: EntityId, ctx: &mut TickContext) {
        if !self.is_alive() {
            return;
        }
        let config = ctx.config;
        let input = ctx.input;

        self.view.apply_mouse(
            input.mouse_delta,
            config.player.mouse_accel,
            config.player.pitch_limit,
        );
        if let Some(kind) = input.select_weapon {
            self.weapon.switch_to(kind, &config.weapon);
        }

        let command = input.to_command(&self.view);
        ctx.controller
            .tick(&mut self.body, &command, ctx.world, ctx.clock.delta);

        // Other agents query this tick, so the hitbox follows immediately.
        if let Some(key) = self.hitbox {
            ctx.hitboxes
                .update(key, self.body.center(), self.body.half_extent * 2.0);
        }
        ctx.commands.poses.push(PoseUpdate {
            entity: id,
            position: self.body.position,
            rotation: Some(self.view.euler()),
        });

        let shooter = Shooter {
            id,
            eye: self.eye(config.player.camera_offset),
            forward: self.view.forward(),
            body_size: self.body.half_extent * 2.0,
        };
        self.weapon.update(
            input.actions.fire,
            &shooter,
            ctx.world,
            ctx.hitboxes,
            &config.weapon,
            ctx.clock.time,
            &mut ctx.commands.damage,
        );

        for key in ctx.triggers.overlapping(&self.body.bounds()) {
            if let Some(trigger) = ctx.triggers.get(key) {
                ctx.commands.triggered.push((trigger.user, id));
            }
        }
    }
}

impl Damageable for Player {
    fn on_damage(&mut self, amount: i32, _hit_position: Vec3) {
        if !self.is_alive() {
            return;
        }
        self.health = self.health.saturating_sub(amount).max(0);
    }

    fn kill(&mut self) {
        self.health = 0;
    }

    fn health(&self) -> i32 {
        self.health
    }
}
