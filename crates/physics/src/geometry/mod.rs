//! Geometry primitives: boxes, swept queries and vector helpers.
//!
//! Everything here is pure math with no state.

mod aabb;
mod sweep;
pub mod vector;

pub use aabb::Aabb;
pub use sweep::{slab_test, SlabHit, SweepQuery};
