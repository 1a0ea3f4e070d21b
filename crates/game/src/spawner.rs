//! Drone spawners.

use glam::Vec3;

use crate::ai::Drone;
use crate::entity::{Entity, EntityId, TickContext};

/// Emits a drone every spawn interval while the level is below its drone cap.
#[derive(Debug, Clone)]
pub struct Spawner {
    pub position: Vec3,
    /// Where new drones appear (drone center).
    pub spawn_point: Vec3,
    /// Drones emitted so far.
    pub spawned: u32,
    last_spawn: f64,
}

impl Spawner {
    pub fn new(position: Vec3, spawn_point: Vec3) -> Self {
        Self {
            position,
            spawn_point,
            spawned: 0,
            last_spawn: 0.0,
        }
    }

    /// Whether a drone should be emitted now.
    pub fn ready(&self, now: f64, interval: f32, active_drones: usize, max_drones: usize) -> bool {
        active_drones < max_drones && now - self.last_spawn > f64::from(interval)
    }

    pub fn tick(&mut self, id: EntityId, ctx: &mut TickContext) {
        let ai = &ctx.config.ai;
        let now = ctx.clock.time;
        if !self.ready(now, ai.spawn_interval, ctx.drone_count, ai.max_drones) {
            return;
        }

        self.last_spawn = now;
        self.spawned += 1;
        ctx.commands
            .spawn
            .push(Entity::Drone(Drone::new(self.spawn_point, ai)));
        log::debug!("spawner {id:?} emitted drone #{}", self.spawned);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_after_interval() {
        let spawner = Spawner::new(Vec3::ZERO, Vec3::Y);
        assert!(!spawner.ready(0.5, 0.5, 0, 8));
        assert!(spawner.ready(0.51, 0.5, 0, 8));
    }

    #[test]
    fn test_cap_blocks_spawning() {
        let spawner = Spawner::new(Vec3::ZERO, Vec3::Y);
        assert!(!spawner.ready(10.0, 0.5, 8, 8));
        assert!(spawner.ready(10.0, 0.5, 7, 8));
    }
}
