//! Hurt volumes.

use glam::Vec3;
use sps_physics::{Aabb, ColliderKey};

use crate::damage::{DamageEvent, DamageSource, Triggerable};
use crate::entity::EntityId;

/// Damages whoever stands inside it, at most once per `interval`. An interval
/// of zero kills instantly.
#[derive(Debug, Clone)]
pub struct HurtTrigger {
    pub aabb: Aabb,
    pub damage: i32,
    pub interval: f32,
    pub collider: Option<ColliderKey>,
    last_damage: Option<f64>,
}

impl HurtTrigger {
    pub fn new(aabb: Aabb, damage: i32, interval: f32) -> Self {
        Self {
            aabb,
            damage,
            interval,
            collider: None,
            last_damage: None,
        }
    }

    pub fn is_kill_volume(&self) -> bool {
        self.interval <= 0.0
    }
}

impl Triggerable for HurtTrigger {
    fn on_triggered(&mut self, activator: EntityId, now: f64, damage: &mut Vec<DamageEvent>) {
        if self.is_kill_volume() {
            damage.push(DamageEvent {
                target: activator,
                amount: self.damage,
                position: self.aabb.center,
                source: DamageSource::KillVolume,
            });
            return;
        }

        let due = self
            .last_damage
            .map_or(true, |t| now - t > f64::from(self.interval));
        if due {
            self.last_damage = Some(now);
            damage.push(DamageEvent {
                target: activator,
                amount: self.damage,
                position: self.aabb.center,
                source: DamageSource::Trigger,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn activator() -> EntityId {
        let mut ids = SlotMap::with_key();
        ids.insert(())
    }

    #[test]
    fn test_periodic_damage() {
        let who = activator();
        let mut trigger = HurtTrigger::new(Aabb::new(Vec3::ZERO, Vec3::splat(2.0)), 15, 0.25);
        let mut damage = Vec::new();

        trigger.on_triggered(who, 1.0, &mut damage);
        trigger.on_triggered(who, 1.1, &mut damage);
        trigger.on_triggered(who, 1.2, &mut damage);
        assert_eq!(damage.len(), 1);

        trigger.on_triggered(who, 1.3, &mut damage);
        assert_eq!(damage.len(), 2);
        assert!(damage.iter().all(|d| d.amount == 15 && d.source == DamageSource::Trigger));
        assert!(damage.iter().all(|d| d.target == who));
    }

    #[test]
    fn test_zero_interval_kills() {
        let who = activator();
        let mut trigger = HurtTrigger::new(Aabb::new(Vec3::ZERO, Vec3::ONE), 15, 0.0);
        let mut damage = Vec::new();

        trigger.on_triggered(who, 0.0, &mut damage);
        assert!(trigger.is_kill_volume());
        assert_eq!(damage[0].source, DamageSource::KillVolume);
    }
}
