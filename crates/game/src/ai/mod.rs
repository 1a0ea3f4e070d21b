//! AI agents: turrets and drones.
//!
//! Both read the player through a [`Target`](crate::entity::Target) snapshot
//! taken at the start of the tick, run line-of-sight checks on a schedule, and
//! shoot [`Projectile`](crate::projectile::Projectile)s.

mod drone;
mod perception;
mod turret;

pub use drone::{desired_velocity, steer, Drone};
pub use perception::{line_of_sight, Perception};
pub use turret::{rotate_towards, Turret, TurretState};
