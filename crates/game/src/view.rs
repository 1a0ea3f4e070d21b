//! First-person view angles.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use sps_physics::geometry::vector::checked_normalize;

/// Pitch and yaw in degrees.
///
/// Yaw 0 looks down -Z, positive pitch looks down. Angles accumulate without
/// wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewAngles {
    pub pitch: f32,
    pub yaw: f32,
}

impl ViewAngles {
    pub fn new(pitch: f32, yaw: f32) -> Self {
        Self { pitch, yaw }
    }

    /// Angles that look along `direction`. Falls back to the default view for
    /// a zero vector.
    pub fn from_direction(direction: Vec3) -> Self {
        let Some(dir) = checked_normalize(direction) else {
            return Self::default();
        };
        Self {
            pitch: (-dir.y).clamp(-1.0, 1.0).asin().to_degrees(),
            yaw: (-dir.x).atan2(-dir.z).to_degrees(),
        }
    }

    /// Integrate a mouse delta. `pitch_limit` optionally clamps pitch to
    /// `[-limit, limit]`.
    pub fn apply_mouse(&mut self, delta: (f32, f32), accel: f32, pitch_limit: Option<f32>) {
        let (dx, dy) = delta;
        if !(dx.is_finite() && dy.is_finite()) {
            return;
        }
        self.pitch += dy * accel;
        self.yaw -= dx * accel;
        if let Some(limit) = pitch_limit {
            self.pitch = self.pitch.clamp(-limit, limit);
        }
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.to_radians().sin_cos();
        let (sp, cp) = self.pitch.to_radians().sin_cos();
        -Vec3::new(sy * cp, sp, cy * cp)
    }

    /// View direction projected onto the ground plane.
    pub fn forward_flat(&self) -> Vec3 {
        let (sy, cy) = self.yaw.to_radians().sin_cos();
        -Vec3::new(sy, 0.0, cy)
    }

    /// Right vector on the ground plane.
    pub fn right_flat(&self) -> Vec3 {
        let (sy, cy) = self.yaw.to_radians().sin_cos();
        Vec3::new(cy, 0.0, -sy)
    }

    /// Euler rotation in degrees, as pushed to the transform sink.
    pub fn euler(&self) -> Vec3 {
        Vec3::new(self.pitch, self.yaw, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-5, "{a} != {b}");
    }

    #[test]
    fn test_default_view_vectors() {
        let view = ViewAngles::default();
        assert_close(view.forward(), Vec3::NEG_Z);
        assert_close(view.forward_flat(), Vec3::NEG_Z);
        assert_close(view.right_flat(), Vec3::X);
    }

    #[test]
    fn test_yaw_turns_left() {
        let view = ViewAngles::new(0.0, 90.0);
        assert_close(view.forward_flat(), Vec3::NEG_X);
        assert_close(view.right_flat(), Vec3::NEG_Z);
    }

    #[test]
    fn test_positive_pitch_looks_down() {
        let view = ViewAngles::new(90.0, 0.0);
        assert_close(view.forward(), Vec3::NEG_Y);
        // The flat vectors ignore pitch.
        assert_close(view.forward_flat(), Vec3::NEG_Z);
    }

    #[test]
    fn test_mouse_accumulates_unbounded() {
        let mut view = ViewAngles::default();
        for _ in 0..10 {
            view.apply_mouse((-100.0, 100.0), 0.2, None);
        }
        assert!((view.pitch - 200.0).abs() < 1e-3);
        assert!((view.yaw - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_pitch_limit() {
        let mut view = ViewAngles::default();
        view.apply_mouse((0.0, 1000.0), 0.2, Some(89.0));
        assert_eq!(view.pitch, 89.0);
        view.apply_mouse((0.0, -5000.0), 0.2, Some(89.0));
        assert_eq!(view.pitch, -89.0);
    }

    #[test]
    fn test_from_direction_round_trip() {
        let view = ViewAngles::new(30.0, -45.0);
        let back = ViewAngles::from_direction(view.forward());
        assert!((back.pitch - 30.0).abs() < 1e-3);
        assert!((back.yaw + 45.0).abs() < 1e-3);
        assert_eq!(ViewAngles::from_direction(Vec3::ZERO), ViewAngles::default());
    }
}
