//! SPS Physics
//!
//! Swept-box collision and kinematic movement for the SPS gameplay layer.
//!
//! # Architecture
//!
//! The crate is split into three layers:
//!
//! - **Geometry**: Boxes, swept queries and the slab test. Pure math.
//! - **Collision**: Collider scenes holding boxes with user data, partitioned
//!   into named zones, answering nearest-hit and all-hits queries
//! - **Movement**: The kinematic controller and the iterative resolver that
//!   slides, steps and grounds an agent against a scene
//!
//! # Conventions
//!
//! Agent positions are the bottom center of the agent box. Every
//! normalization goes through a length check, and resolved positions and
//! velocities are guaranteed finite.

pub mod collision;
mod error;
pub mod geometry;
pub mod movement;

// Re-export commonly used types
pub use collision::{Collider, ColliderKey, ColliderScene, SweepHit, ZoneConfig, ZoneStats};
pub use error::ParameterError;
pub use geometry::{Aabb, SweepQuery};
pub use movement::{
    resolve_motion, KinematicController, KinematicState, MotionInput, MotionOutput, MotionState,
    MoveCommand, MovementConfig, ResolveOutcome, StuckPolicy, MAX_DELTA_TIME,
};
