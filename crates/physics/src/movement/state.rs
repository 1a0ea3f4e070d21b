//! Kinematic state and movement commands.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::geometry::vector::{flatten, is_finite_vec};
use crate::geometry::Aabb;

/// Whether an agent is standing on something.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionState {
    /// Standing on a walkable surface. Ground acceleration and friction apply.
    Grounded,
    /// Falling or jumping. Gravity applies.
    #[default]
    Airborne,
}

/// Complete kinematic state for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicState {
    /// Position in world space (bottom center of the collision box).
    pub position: Vec3,

    /// Velocity in world space.
    pub velocity: Vec3,

    /// Half size of the collision box.
    pub half_extent: Vec3,

    /// Ground or air.
    pub motion: MotionState,

    /// Normal of the surface below (valid while grounded).
    pub ground_normal: Vec3,
}

impl KinematicState {
    /// Create an airborne state at rest.
    pub fn new(position: Vec3, half_extent: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            half_extent: half_extent.abs(),
            motion: MotionState::Airborne,
            ground_normal: Vec3::Y,
        }
    }

    /// Whether the agent is standing on a surface.
    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.motion == MotionState::Grounded
    }

    /// Center of the collision box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        self.position + Vec3::new(0.0, self.half_extent.y, 0.0)
    }

    /// The collision box in world space.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_half_extent(self.center(), self.half_extent)
    }

    /// Current horizontal speed.
    pub fn horizontal_speed(&self) -> f32 {
        flatten(self.velocity).length()
    }

    /// Overwrite position and velocity, refusing non-finite values.
    ///
    /// Returns `false` (and leaves the state untouched) if either vector has a
    /// NaN or infinite component.
    pub fn commit(&mut self, position: Vec3, velocity: Vec3) -> bool {
        if !is_finite_vec(position) || !is_finite_vec(velocity) {
            return false;
        }
        self.position = position;
        self.velocity = velocity;
        true
    }
}

/// Movement intent for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveCommand {
    /// Desired horizontal direction in world space. Not required to be unit
    /// length; zero means no input.
    pub wish: Vec3,

    /// Facing direction used for the forward jump impulse.
    pub facing: Vec3,

    /// Sprint modifier.
    pub sprint: bool,

    /// Jump request.
    pub jump: bool,
}

impl MoveCommand {
    /// Whether any directional input is present.
    #[inline]
    pub fn has_input(&self) -> bool {
        flatten(self.wish).length_squared() > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_and_bounds() {
        let state = KinematicState::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.45, 0.95, 0.45));
        assert_eq!(state.center(), Vec3::new(1.0, 2.95, 3.0));

        let bounds = state.bounds();
        assert!((bounds.min().y - 2.0).abs() < 1.0e-6);
        assert!((bounds.max().y - 3.9).abs() < 1.0e-6);
    }

    #[test]
    fn test_commit_rejects_nan() {
        let mut state = KinematicState::new(Vec3::ZERO, Vec3::ONE);
        assert!(!state.commit(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::ZERO));
        assert_eq!(state.position, Vec3::ZERO);

        assert!(state.commit(Vec3::ONE, Vec3::X));
        assert_eq!(state.position, Vec3::ONE);
        assert_eq!(state.velocity, Vec3::X);
    }

    #[test]
    fn test_command_input() {
        assert!(!MoveCommand::default().has_input());
        let cmd = MoveCommand {
            wish: Vec3::X,
            ..Default::default()
        };
        assert!(cmd.has_input());
    }
}
