//! Agent movement physics.
//!
//! This module implements kinematic box movement with:
//!
//! - Ground and air movement with different acceleration models
//! - Friction and over-speed damping
//! - Multi-plane sliding within a single tick
//! - Stepping up low ledges
//!
//! # Design
//!
//! Movement is driven by the [`KinematicController`], which takes a
//! [`MoveCommand`] and updates a [`KinematicState`] through a collider scene.
//! The collision half of a tick lives in [`resolve_motion`] and is usable on
//! its own (drones call it directly with their own steering).

mod config;
mod controller;
mod resolve;
mod state;

pub use config::{MovementConfig, StuckPolicy};
pub use controller::{
    air_accelerate, apply_friction, ground_accelerate, KinematicController, MAX_DELTA_TIME,
};
pub use resolve::{resolve_motion, MotionInput, MotionOutput, ResolveOutcome};
pub use state::{KinematicState, MotionState, MoveCommand};
