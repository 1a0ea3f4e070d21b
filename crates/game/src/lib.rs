//! SPS Game Logic
//!
//! This crate contains the gameplay layer on top of `sps-physics`:
//!
//! - Player state, view and input handling
//! - Weapons, hitboxes and damage dispatch
//! - AI agents (turrets, drones) and their perception
//! - Projectiles, hurt triggers and drone spawners
//! - Level loading, configuration and the task scheduler
//!
//! # Architecture
//!
//! A [`Simulation`] is advanced by explicit delta times. Entities live in a
//! generational arena and only interact through queued commands, resolved by
//! [`EntityId`] after each entity's tick.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Simulation                            │
//! │  ┌─────────┐   ┌───────────┐   ┌──────────────────────────┐  │
//! │  │ Input   │──►│ Entities  │──►│ Commands                 │  │
//! │  │ + Clock │   │ (player,  │   │ (damage, spawn, despawn, │  │
//! │  └─────────┘   │ AI, ...)  │   │  triggers, poses)        │  │
//! │       │        └───────────┘   └──────────────────────────┘  │
//! │       ▼              │                                       │
//! │  ┌─────────┐   ┌───────────────────────────────┐             │
//! │  │Scheduler│   │ world / hitbox / trigger      │             │
//! │  └─────────┘   │ collider scenes               │             │
//! │                └───────────────────────────────┘             │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod ai;
pub mod clock;
pub mod config;
pub mod damage;
pub mod entity;
pub mod error;
pub mod input;
pub mod level;
pub mod player;
pub mod projectile;
pub mod scheduler;
pub mod simulation;
pub mod spawner;
pub mod transform;
pub mod trigger;
pub mod view;
pub mod weapon;

// Re-export main types
pub use ai::{Drone, Perception, Turret, TurretState};
pub use clock::Clock;
pub use config::{AiConfig, PlayerConfig, SimulationConfig, WeaponConfig};
pub use damage::{DamageEvent, DamageSource, Damageable, Triggerable};
pub use entity::{Entity, EntityId, EntityKind};
pub use error::{ConfigError, SimError};
pub use input::PlayerInput;
pub use level::Level;
pub use player::Player;
pub use projectile::Projectile;
pub use scheduler::{Scheduler, SimEvent, TaskHandle, Trigger};
pub use simulation::{Simulation, Task};
pub use transform::{LatestPoses, PoseUpdate, TransformSink};
pub use trigger::HurtTrigger;
pub use view::ViewAngles;
pub use weapon::{Weapon, WeaponKind};

// Re-export physics types for convenience
pub use sps_physics::{
    Aabb, ColliderKey, ColliderScene, KinematicController, KinematicState, MoveCommand,
    MovementConfig, StuckPolicy, SweepHit, SweepQuery, ZoneConfig,
};
