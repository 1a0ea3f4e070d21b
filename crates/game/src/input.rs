//! Player input handling.
//!
//! This module converts raw per-frame input (keys and mouse) into movement
//! commands for the physics system.

use serde::{Deserialize, Serialize};
use sps_physics::MoveCommand;

use crate::view::ViewAngles;
use crate::weapon::WeaponKind;

/// Raw player input for a single frame.
///
/// This is the input format received from the host's input system. Movement
/// keys get converted to a [`MoveCommand`] relative to the player's view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Movement keys held.
    pub movement: MovementInput,

    /// Mouse delta this frame (x, y).
    pub mouse_delta: (f32, f32),

    /// Action buttons held.
    pub actions: ActionInput,

    /// Weapon to switch to this frame.
    pub select_weapon: Option<WeaponKind>,

    /// A key went down this frame. Drives "press any key" waits.
    pub key_pressed: bool,
}

/// Movement key states.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MovementInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

/// Action button states.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ActionInput {
    pub fire: bool,
    pub jump: bool,
    pub sprint: bool,
}

impl PlayerInput {
    /// Convert to a movement command using the flat axes of `view`.
    pub fn to_command(&self, view: &ViewAngles) -> MoveCommand {
        let mut forward_move = 0.0_f32;
        let mut right_move = 0.0;

        if self.movement.forward {
            forward_move += 1.0;
        }
        if self.movement.backward {
            forward_move -= 1.0;
        }
        if self.movement.right {
            right_move += 1.0;
        }
        if self.movement.left {
            right_move -= 1.0;
        }

        // Normalize diagonal movement
        let magnitude: f32 = (forward_move * forward_move + right_move * right_move).sqrt();
        if magnitude > 1.0 {
            forward_move /= magnitude;
            right_move /= magnitude;
        }

        let forward = view.forward_flat();
        MoveCommand {
            wish: forward * forward_move + view.right_flat() * right_move,
            facing: forward,
            sprint: self.actions.sprint,
            jump: self.actions.jump,
        }
    }

    /// Check if any movement input is active.
    pub fn has_movement(&self) -> bool {
        self.movement.forward
            || self.movement.backward
            || self.movement.left
            || self.movement.right
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_no_input() {
        let input = PlayerInput::default();
        let cmd = input.to_command(&ViewAngles::default());
        assert!(!input.has_movement());
        assert!(!cmd.has_input());
        assert_eq!(cmd.facing, Vec3::NEG_Z);
    }

    #[test]
    fn test_forward_follows_yaw() {
        let mut input = PlayerInput::default();
        input.movement.forward = true;

        let cmd = input.to_command(&ViewAngles::new(45.0, 90.0));
        assert!((cmd.wish - Vec3::NEG_X).length() < 1e-5);
        assert_eq!(cmd.wish.y, 0.0);
    }

    #[test]
    fn test_diagonal_is_normalized() {
        let mut input = PlayerInput::default();
        input.movement.forward = true;
        input.movement.right = true;
        input.actions.sprint = true;

        let cmd = input.to_command(&ViewAngles::default());
        assert!((cmd.wish.length() - 1.0).abs() < 1e-5);
        assert!(cmd.wish.x > 0.0 && cmd.wish.z < 0.0);
        assert!(cmd.sprint);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut input = PlayerInput::default();
        input.movement.left = true;
        input.movement.right = true;
        input.actions.jump = true;

        let cmd = input.to_command(&ViewAngles::default());
        assert_eq!(cmd.wish, Vec3::ZERO);
        assert!(cmd.jump);
        assert!(input.has_movement());
    }
}
