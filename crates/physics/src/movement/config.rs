//! Movement configuration constants.
//!
//! All movement parameters are grouped here for easy tuning. Speeds are in
//! units per second, accelerations in units per second squared.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ParameterError;

/// What happens to velocity when an agent starts a tick inside geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StuckPolicy {
    /// Leave velocity as computed. Position is not advanced.
    #[default]
    KeepVelocity,
    /// Zero velocity as well as stopping.
    ZeroVelocity,
}

/// Configuration for agent movement physics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    // ========================================================================
    // Ground Movement
    // ========================================================================
    /// Walking speed cap.
    pub walk_max_speed: f32,

    /// Walking acceleration.
    pub walk_accel: f32,

    /// Sprinting speed cap.
    pub sprint_max_speed: f32,

    /// Sprinting acceleration.
    pub sprint_accel: f32,

    /// Velocity decay rate when grounded with no input.
    pub ground_friction: f32,

    /// Extra damping applied in proportion to `speed / max_speed` while
    /// accelerating on the ground.
    pub overspeed_friction: f32,

    // ========================================================================
    // Air Movement
    // ========================================================================
    /// Acceleration from input while airborne.
    pub air_accel: f32,

    /// How strongly air acceleration is reduced when the input points along
    /// the current horizontal velocity (0.0 = no reduction, 1.0 = none left).
    pub air_strafe_bias: f32,

    /// Gravity, added to velocity every airborne tick.
    pub gravity: Vec3,

    /// Instant velocity change when jumping.
    pub jump_impulse: Vec3,

    /// Extra impulse along the facing direction when jumping.
    pub jump_forward_impulse: f32,

    /// Multiplier on `jump_forward_impulse`. Zero disables forward jumps.
    pub jump_forward_factor: f32,

    // ========================================================================
    // Stairs and Ground
    // ========================================================================
    /// Maximum ledge height an agent walks up without jumping.
    pub step_height: f32,

    /// How far past the contact the step probe reaches into the obstruction.
    pub step_probe_inset: f32,

    /// Horizontal half size of the step probe box.
    pub step_probe_thickness: f32,

    /// Minimum surface normal Y to be considered ground.
    pub min_ground_normal: f32,

    /// Grounding probe length when stepping is disabled.
    pub ground_probe_distance: f32,

    /// Upward speed above which the grounding probe is ignored.
    pub ground_rise_tolerance: f32,

    // ========================================================================
    // Collision
    // ========================================================================
    /// Small distance to back off from surfaces.
    pub surface_epsilon: f32,

    /// Maximum collision iterations per resolve.
    pub max_iterations: u32,

    /// Velocity handling when starting inside geometry.
    pub stuck_policy: StuckPolicy,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_max_speed: 1.6,
            walk_accel: 16.0,
            sprint_max_speed: 3.6,
            sprint_accel: 24.0,
            ground_friction: 16.0,
            overspeed_friction: 2.0,

            air_accel: 0.4,
            air_strafe_bias: 0.0,
            gravity: Vec3::new(0.0, -5.6, 0.0),
            jump_impulse: Vec3::new(0.0, 2.5, 0.0),
            jump_forward_impulse: 0.6,
            jump_forward_factor: 0.0,

            step_height: 0.3,
            step_probe_inset: 0.05,
            step_probe_thickness: 0.02,
            min_ground_normal: 0.7,
            ground_probe_distance: 0.05,
            ground_rise_tolerance: 0.01,

            surface_epsilon: 0.001,
            max_iterations: 32,
            stuck_policy: StuckPolicy::KeepVelocity,
        }
    }
}

impl MovementConfig {
    /// Faster movement with real air strafing.
    pub fn arcade() -> Self {
        Self {
            walk_max_speed: 3.0,
            walk_accel: 24.0,
            sprint_max_speed: 6.0,
            sprint_accel: 36.0,
            air_accel: 2.0,
            air_strafe_bias: 0.5,
            jump_forward_factor: 1.0,
            step_height: 0.45,
            ..Default::default()
        }
    }

    /// Max speed and acceleration for the current ground movement mode.
    pub fn ground_limits(&self, sprinting: bool) -> (f32, f32) {
        if sprinting {
            (self.sprint_max_speed, self.sprint_accel)
        } else {
            (self.walk_max_speed, self.walk_accel)
        }
    }

    /// Check that every parameter is usable.
    pub fn validate(&self) -> Result<(), ParameterError> {
        ParameterError::positive("walk_max_speed", self.walk_max_speed)?;
        ParameterError::non_negative("walk_accel", self.walk_accel)?;
        ParameterError::positive("sprint_max_speed", self.sprint_max_speed)?;
        ParameterError::non_negative("sprint_accel", self.sprint_accel)?;
        ParameterError::non_negative("ground_friction", self.ground_friction)?;
        ParameterError::non_negative("overspeed_friction", self.overspeed_friction)?;
        ParameterError::non_negative("air_accel", self.air_accel)?;
        ParameterError::in_range("air_strafe_bias", self.air_strafe_bias, 0.0, 1.0)?;
        for (name, v) in [("gravity", self.gravity), ("jump_impulse", self.jump_impulse)] {
            for c in v.to_array() {
                ParameterError::finite(name, c)?;
            }
        }
        ParameterError::finite("jump_forward_impulse", self.jump_forward_impulse)?;
        ParameterError::finite("jump_forward_factor", self.jump_forward_factor)?;
        ParameterError::non_negative("step_height", self.step_height)?;
        ParameterError::positive("step_probe_inset", self.step_probe_inset)?;
        ParameterError::positive("step_probe_thickness", self.step_probe_thickness)?;
        // The probe has to start past the obstruction face.
        ParameterError::in_range(
            "step_probe_thickness",
            self.step_probe_thickness,
            0.0,
            self.step_probe_inset,
        )?;
        ParameterError::in_range("min_ground_normal", self.min_ground_normal, 0.0, 1.0)?;
        ParameterError::positive("ground_probe_distance", self.ground_probe_distance)?;
        ParameterError::non_negative("ground_rise_tolerance", self.ground_rise_tolerance)?;
        ParameterError::positive("surface_epsilon", self.surface_epsilon)?;
        if self.max_iterations == 0 {
            return Err(ParameterError::ZeroIterations);
        }
        Ok(())
    }
}
