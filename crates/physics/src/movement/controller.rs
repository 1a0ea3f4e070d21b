//! Kinematic movement controller.
//!
//! This is the main entry point for agent movement. It turns a
//! [`MoveCommand`] into a velocity change according to the agent's
//! [`MotionState`], then hands the result to [`resolve_motion`].

use glam::Vec3;

use crate::collision::ColliderScene;
use crate::geometry::vector::{checked_normalize, clamp_magnitude, flatten};
use crate::geometry::SweepQuery;

use super::config::MovementConfig;
use super::resolve::{resolve_motion, MotionInput, MotionOutput};
use super::state::{KinematicState, MotionState, MoveCommand};

/// Longest step the controller integrates in one go. Longer ticks are split
/// into equal substeps so the whole tick is always simulated.
pub const MAX_DELTA_TIME: f32 = 0.1;

/// Upper bound on substeps per tick. Beyond it the substeps grow longer
/// instead of dropping time.
const MAX_SUBSTEPS: f32 = 64.0;

/// How far above the spawn point the spawn probe starts.
const SPAWN_PROBE_UP: f32 = 1.0;

/// How far below the spawn point the spawn probe reaches.
const SPAWN_PROBE_DOWN: f32 = 2.0;

/// Ground/air movement controller.
///
/// # Example
///
/// ```ignore
/// let controller = KinematicController::new(MovementConfig::default());
/// let mut state = KinematicState::new(spawn_position, half_extent);
/// controller.spawn_at(&mut state, &world);
///
/// // Each tick:
/// controller.tick(&mut state, &command, &world, delta_time);
/// ```
#[derive(Debug, Clone, Default)]
pub struct KinematicController {
    /// Movement configuration.
    pub config: MovementConfig,
}

impl KinematicController {
    /// Create a controller with the given configuration.
    pub fn new(config: MovementConfig) -> Self {
        Self { config }
    }

    /// Settle a freshly spawned agent onto the ground below it.
    ///
    /// Probes from slightly above the spawn point. Without ground in reach the
    /// agent is left where it is, airborne.
    pub fn spawn_at<U: Copy>(&self, state: &mut KinematicState, scene: &ColliderScene<U>) {
        state.velocity = Vec3::ZERO;
        state.motion = MotionState::Airborne;
        state.ground_normal = Vec3::Y;

        let start = state.center() + Vec3::new(0.0, SPAWN_PROBE_UP, 0.0);
        let Some(query) = SweepQuery::swept_box(start, Vec3::NEG_Y, state.half_extent) else {
            return;
        };
        let Some(hit) = scene.first_hit(&query, SPAWN_PROBE_UP + SPAWN_PROBE_DOWN) else {
            return;
        };
        if hit.is_stuck() || hit.normal.y < self.config.min_ground_normal {
            return;
        }
        if let Some(collider) = scene.get(hit.collider) {
            state.position.y = collider.aabb.max().y + self.config.surface_epsilon;
            state.motion = MotionState::Grounded;
            state.ground_normal = hit.normal;
        }
    }

    /// Advance one agent by one tick.
    ///
    /// Ticks longer than [`MAX_DELTA_TIME`] run as several equal substeps.
    /// A jump is only taken on the first of them. Returns the result of the
    /// last substep.
    pub fn tick<U: Copy>(
        &self,
        state: &mut KinematicState,
        command: &MoveCommand,
        scene: &ColliderScene<U>,
        delta_time: f32,
    ) -> MotionOutput {
        let delta_time = if delta_time.is_finite() { delta_time.max(0.0) } else { 0.0 };
        // The small bias keeps an exact multiple of the step from rounding up
        // into one extra substep.
        let substeps = (delta_time / MAX_DELTA_TIME - 1.0e-4)
            .ceil()
            .clamp(1.0, MAX_SUBSTEPS);
        let dt = delta_time / substeps;

        let mut out = self.substep(state, command, scene, dt);
        let held = MoveCommand {
            jump: false,
            ..*command
        };
        for _ in 1..substeps as u32 {
            out = self.substep(state, &held, scene, dt);
        }
        out
    }

    /// One integration step of at most [`MAX_DELTA_TIME`].
    ///
    /// The ground/air transition is decided solely by the grounding result of
    /// the resolve at the end of the step.
    fn substep<U: Copy>(
        &self,
        state: &mut KinematicState,
        command: &MoveCommand,
        scene: &ColliderScene<U>,
        dt: f32,
    ) -> MotionOutput {
        let mut velocity = state.velocity;
        let mut motion = state.motion;

        if motion == MotionState::Grounded {
            if command.jump {
                velocity += self.jump_impulse(command);
                motion = MotionState::Airborne;
            } else if command.has_input() {
                let (max_speed, accel) = self.config.ground_limits(command.sprint);
                velocity = ground_accelerate(
                    velocity,
                    command.wish,
                    max_speed,
                    accel,
                    self.config.overspeed_friction,
                    dt,
                );
            } else {
                velocity = apply_friction(velocity, self.config.ground_friction, dt);
            }
        }

        // Runs in the same tick as a jump.
        if motion == MotionState::Airborne {
            velocity = air_accelerate(
                velocity,
                command.wish,
                self.config.air_accel,
                self.config.air_strafe_bias,
                dt,
            );
            velocity += self.config.gravity * dt;
        }

        let grounded = motion == MotionState::Grounded;
        let out = resolve_motion(
            scene,
            &self.config,
            &MotionInput {
                position: state.position,
                velocity,
                half_extent: state.half_extent,
                delta_time: dt,
                allow_step: grounded,
                grounded,
                snap_to_ground: true,
            },
        );

        if state.commit(out.position, out.velocity) {
            state.motion = if out.grounded {
                MotionState::Grounded
            } else {
                MotionState::Airborne
            };
            state.ground_normal = out.ground_normal;
        } else {
            log::warn!("kinematic tick produced non-finite state, keeping previous");
        }

        out
    }

    fn jump_impulse(&self, command: &MoveCommand) -> Vec3 {
        let forward = checked_normalize(flatten(command.facing)).unwrap_or(Vec3::ZERO);
        self.config.jump_impulse
            + forward * self.config.jump_forward_impulse * self.config.jump_forward_factor
    }
}

/// Pure friction decay: `v / (1 + friction * dt)`.
#[inline]
pub fn apply_friction(velocity: Vec3, friction: f32, dt: f32) -> Vec3 {
    velocity / (1.0 + friction * dt)
}

/// Ground acceleration with over-speed damping.
///
/// Velocity is first damped in proportion to `|v| / max_speed`, then the
/// input acceleration is added, and the result is clamped to the larger of
/// `max_speed` and the damped speed. An agent already above the cap keeps
/// steering without a sudden loss of speed, and a standing agent never
/// accelerates past the cap.
pub fn ground_accelerate(
    velocity: Vec3,
    wish: Vec3,
    max_speed: f32,
    accel: f32,
    overspeed_friction: f32,
    dt: f32,
) -> Vec3 {
    let wish = clamp_magnitude(flatten(wish), 1.0);

    let damped = velocity / (1.0 + velocity.length() / max_speed * overspeed_friction * dt);
    let accelerated = damped + wish * accel * dt;

    let cap = damped.length().max(max_speed);
    accelerated / (accelerated.length() / cap).max(1.0)
}

/// Air acceleration, reduced when pushing along the current horizontal
/// velocity.
pub fn air_accelerate(velocity: Vec3, wish: Vec3, accel: f32, strafe_bias: f32, dt: f32) -> Vec3 {
    let wish = clamp_magnitude(flatten(wish), 1.0);
    let alignment = match (checked_normalize(wish), checked_normalize(flatten(velocity))) {
        (Some(w), Some(v)) => w.dot(v).abs(),
        _ => 0.0,
    };
    let weight = 1.0 - strafe_bias * alignment;
    velocity + wish * accel * dt * weight
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Aabb;
    use proptest::prelude::*;

    const HALF: Vec3 = Vec3::new(0.45, 0.95, 0.45);
    const DT: f32 = 1.0 / 60.0;

    fn create_test_world() -> ColliderScene<()> {
        let mut scene = ColliderScene::new();
        scene.add(Aabb::new(Vec3::new(0.0, -0.5, 0.0), Vec3::new(100.0, 1.0, 100.0)), ());
        scene
    }

    fn grounded_state(controller: &KinematicController, scene: &ColliderScene<()>) -> KinematicState {
        let mut state = KinematicState::new(Vec3::ZERO, HALF);
        controller.spawn_at(&mut state, scene);
        state
    }

    fn forward() -> MoveCommand {
        MoveCommand {
            wish: Vec3::X,
            facing: Vec3::X,
            ..Default::default()
        }
    }

    #[test]
    fn test_gravity_settles_on_floor() {
        let mut scene = ColliderScene::new();
        scene.add(Aabb::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(10.0, 1.0, 10.0)), ());
        let controller = KinematicController::default();
        let mut state = KinematicState::new(Vec3::new(0.0, 5.0, 10.0), HALF);
        controller.spawn_at(&mut state, &scene);
        assert!(!state.is_grounded());

        for _ in 0..300 {
            controller.tick(&mut state, &MoveCommand::default(), &scene, DT);
        }

        assert!(state.is_grounded());
        assert!((state.position.y - (0.5 + controller.config.surface_epsilon)).abs() < 1.0e-5);
        assert!(state.velocity.y >= 0.0);
        assert_eq!(state.position.x, 0.0);
        assert_eq!(state.position.z, 10.0);
    }

    #[test]
    fn test_long_tick_covers_full_time() {
        let controller = KinematicController::default();
        let empty: ColliderScene<()> = ColliderScene::new();
        let start = Vec3::new(0.0, 50.0, 0.0);

        let mut once = KinematicState::new(start, HALF);
        controller.tick(&mut once, &MoveCommand::default(), &empty, 0.3);
        let mut split = KinematicState::new(start, HALF);
        for _ in 0..3 {
            controller.tick(&mut split, &MoveCommand::default(), &empty, 0.1);
        }

        assert!((once.position - split.position).length() < 1.0e-4);
        assert!((once.velocity - split.velocity).length() < 1.0e-4);
        // The whole 0.3 s of gravity was applied.
        let expected = controller.config.gravity.y * 0.3;
        assert!((once.velocity.y - expected).abs() < 1.0e-3);

        let scene = create_test_world();
        let mut once = grounded_state(&controller, &scene);
        let mut split = once.clone();
        controller.tick(&mut once, &forward(), &scene, 0.3);
        for _ in 0..3 {
            controller.tick(&mut split, &forward(), &scene, 0.1);
        }
        assert!(once.position.x > 0.0);
        assert!((once.position - split.position).length() < 1.0e-4);
    }

    #[test]
    fn test_zero_input_is_idempotent() {
        let scene = create_test_world();
        let controller = KinematicController::default();
        let mut state = grounded_state(&controller, &scene);
        assert!(state.is_grounded());
        let start = state.position;

        for _ in 0..10 {
            let out = controller.tick(&mut state, &MoveCommand::default(), &scene, DT);
            assert_eq!(out.iterations, 0);
        }
        assert_eq!(state.position, start);
        assert!(state.is_grounded());
    }

    #[test]
    fn test_walk_never_exceeds_cap_from_standstill() {
        let scene = create_test_world();
        let controller = KinematicController::default();
        let mut state = grounded_state(&controller, &scene);

        for _ in 0..60 {
            controller.tick(&mut state, &forward(), &scene, DT);
            assert!(state.horizontal_speed() <= controller.config.walk_max_speed + 1.0e-4);
        }
        assert!(state.horizontal_speed() > 1.0);
        assert!(state.is_grounded());
    }

    #[test]
    fn test_sprint_uses_higher_cap() {
        let scene = create_test_world();
        let controller = KinematicController::default();
        let mut state = grounded_state(&controller, &scene);
        let command = MoveCommand {
            sprint: true,
            ..forward()
        };

        for _ in 0..120 {
            controller.tick(&mut state, &command, &scene, DT);
        }
        assert!(state.horizontal_speed() > controller.config.walk_max_speed);
        assert!(state.horizontal_speed() <= controller.config.sprint_max_speed + 1.0e-4);
    }

    #[test]
    fn test_overspeed_steering_keeps_speed() {
        let v = ground_accelerate(Vec3::new(5.0, 0.0, 0.0), Vec3::Z, 1.6, 16.0, 2.0, DT);
        let speed = v.length();
        assert!(speed > 1.6);
        assert!(speed < 5.0);
        assert!(v.z > 0.0);
    }

    #[test]
    fn test_no_input_applies_friction() {
        let scene = create_test_world();
        let controller = KinematicController::default();
        let mut state = grounded_state(&controller, &scene);
        state.velocity = Vec3::new(1.0, 0.0, 0.0);

        controller.tick(&mut state, &MoveCommand::default(), &scene, DT);
        let expected = 1.0 / (1.0 + controller.config.ground_friction * DT);
        assert!((state.velocity.x - expected).abs() < 1.0e-6);
    }

    #[test]
    fn test_jump_goes_airborne_same_tick() {
        let scene = create_test_world();
        let controller = KinematicController::default();
        let mut state = grounded_state(&controller, &scene);
        let start_y = state.position.y;

        let command = MoveCommand {
            jump: true,
            ..Default::default()
        };
        controller.tick(&mut state, &command, &scene, DT);

        assert!(!state.is_grounded());
        let expected = controller.config.jump_impulse.y + controller.config.gravity.y * DT;
        assert!((state.velocity.y - expected).abs() < 1.0e-5);
        assert!(state.position.y > start_y);
    }

    #[test]
    fn test_jump_lands_again() {
        let scene = create_test_world();
        let controller = KinematicController::default();
        let mut state = grounded_state(&controller, &scene);

        let jump = MoveCommand {
            jump: true,
            ..Default::default()
        };
        controller.tick(&mut state, &jump, &scene, DT);
        for _ in 0..180 {
            controller.tick(&mut state, &MoveCommand::default(), &scene, DT);
        }
        assert!(state.is_grounded());
        assert!((state.position.y - controller.config.surface_epsilon).abs() < 1.0e-5);
    }

    #[test]
    fn test_walks_up_step() {
        let mut scene = create_test_world();
        scene.add(Aabb::new(Vec3::new(6.0, 0.1, 0.0), Vec3::new(8.0, 0.2, 20.0)), ());
        let controller = KinematicController::default();
        let mut state = grounded_state(&controller, &scene);

        for _ in 0..150 {
            controller.tick(&mut state, &forward(), &scene, DT);
        }

        assert!(state.position.x > 2.5);
        assert!(state.is_grounded());
        assert!((state.position.y - 0.2).abs() <= 2.0 * controller.config.surface_epsilon);
    }

    #[test]
    fn test_air_strafe_bias() {
        let vel = Vec3::new(2.0, 0.0, 0.0);
        let along = air_accelerate(vel, Vec3::X, 1.0, 0.5, 1.0) - vel;
        let across = air_accelerate(vel, Vec3::Z, 1.0, 0.5, 1.0) - vel;

        assert!((along.length() - 0.5).abs() < 1.0e-6);
        assert!((across.length() - 1.0).abs() < 1.0e-6);
    }

    #[test]
    fn test_spawn_without_ground_stays_airborne() {
        let scene: ColliderScene<()> = ColliderScene::new();
        let controller = KinematicController::default();
        let mut state = KinematicState::new(Vec3::new(0.0, 3.0, 0.0), HALF);
        controller.spawn_at(&mut state, &scene);
        assert!(!state.is_grounded());
        assert_eq!(state.position.y, 3.0);
    }

    proptest! {
        #[test]
        fn prop_friction_strictly_decreases(
            friction in 0.1f32..100.0,
            dt in 0.001f32..0.1,
            speed in 0.1f32..100.0,
        ) {
            let mut v = Vec3::new(speed, 0.0, 0.0);
            for _ in 0..20 {
                let next = apply_friction(v, friction, dt);
                prop_assert!(next.length() < v.length());
                prop_assert!(next.length() > 0.0);
                v = next;
            }
        }
    }
}
