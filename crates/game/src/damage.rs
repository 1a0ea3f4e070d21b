//! Damage and trigger dispatch.
//!
//! Hits are not applied where they are detected. The shooter records a
//! [`DamageEvent`] naming the target by [`EntityId`], and the simulation
//! resolves the id and calls [`Damageable::on_damage`] once the shooter's
//! tick is over. A target that despawned in between is skipped.

use glam::Vec3;

use crate::entity::EntityId;

/// Where a damage event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    /// A hit-scan or flame weapon.
    Weapon,
    Projectile,
    /// A periodic hurt volume.
    Trigger,
    /// A hurt volume with zero interval. Kills outright.
    KillVolume,
}

impl DamageSource {
    /// Damage that arrives through the hitbox scene. The no-damage flag only
    /// covers these.
    pub fn is_hitbox(self) -> bool {
        matches!(self, Self::Weapon | Self::Projectile)
    }
}

/// A pending hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageEvent {
    pub target: EntityId,
    pub amount: i32,
    pub position: Vec3,
    pub source: DamageSource,
}

/// Something with health that can sit in the hitbox scene.
pub trait Damageable {
    /// Take `amount` damage at `hit_position`. Ignored once dead.
    fn on_damage(&mut self, amount: i32, hit_position: Vec3);

    /// Drop health to zero regardless of amount.
    fn kill(&mut self);

    fn health(&self) -> i32;

    fn is_dead(&self) -> bool {
        self.health() <= 0
    }
}

/// A volume in the trigger scene that reacts to agents standing in it.
pub trait Triggerable {
    /// `activator` overlaps the volume this tick. Effects are pushed to
    /// `damage`.
    fn on_triggered(&mut self, activator: EntityId, now: f64, damage: &mut Vec<DamageEvent>);
}
