//! Collider scenes and swept queries against them.
//!
//! A [`ColliderScene`] stores axis-aligned boxes with user data and answers
//! swept queries built from a [`SweepQuery`](crate::geometry::SweepQuery).
//!
//! # Key Types
//!
//! - [`ColliderScene`]: The container, partitioned into named zones
//! - [`SweepHit`]: Output of a query against one collider
//! - [`ColliderKey`]: Generation-checked handle returned by `add`
//!
//! # Hit Semantics
//!
//! Every query reports, per collider:
//! - `t_min`, the distance at which contact starts
//! - `t_out`, the distance at which the moving box leaves again, negated when
//!   the query started inside the collider
//! - the contact position and the normal of the face that was hit

mod scene;
mod zones;

pub use scene::{Collider, ColliderKey, ColliderScene, SweepHit};
pub use zones::{ZoneConfig, ZoneStats, ROOT_ZONE};
