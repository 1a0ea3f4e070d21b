//! Iterative swept-collision resolution.
//!
//! [`resolve_motion`] moves an agent box through a [`ColliderScene`] for one
//! tick. Each iteration sweeps the box along its velocity; a hit either steps
//! the agent up onto a low ledge or slides it along the surface, and the
//! remaining time is spent on the next iteration. A final downward probe
//! decides whether the agent is standing on something.

use glam::Vec3;

use crate::collision::{ColliderScene, SweepHit};
use crate::geometry::vector::{checked_normalize, flatten, is_finite_vec, remove_component};
use crate::geometry::{Aabb, SweepQuery};

use super::config::{MovementConfig, StuckPolicy};

/// Input to a single resolve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionInput {
    /// Bottom center of the agent box.
    pub position: Vec3,
    /// Velocity for this tick.
    pub velocity: Vec3,
    /// Half size of the agent box.
    pub half_extent: Vec3,
    /// Tick length in seconds.
    pub delta_time: f32,
    /// Whether the agent may step up ledges and snap down to ground within
    /// the step height.
    pub allow_step: bool,
    /// Whether the agent started the tick on the ground.
    pub grounded: bool,
    /// Whether to probe for ground below the resolved position and snap onto
    /// it. Flying agents turn this off.
    pub snap_to_ground: bool,
}

/// How the iteration loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// All of the tick's motion was consumed.
    Completed,
    /// The agent started an iteration inside a collider and was left where it
    /// was.
    Stuck,
    /// The iteration budget ran out first. The current position is accepted.
    BudgetExhausted,
}

/// Result of a single resolve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionOutput {
    /// Resolved bottom center.
    pub position: Vec3,
    /// Velocity with blocked components removed.
    pub velocity: Vec3,
    /// Whether a walkable surface is directly below.
    pub grounded: bool,
    /// Normal of that surface, `Vec3::Y` when airborne.
    pub ground_normal: Vec3,
    /// How the loop ended.
    pub outcome: ResolveOutcome,
    /// Number of sweeps issued by the loop.
    pub iterations: u32,
    /// Whether a step-up happened.
    pub stepped: bool,
}

/// Move an agent box through `scene` for one tick.
///
/// Degenerate input (zero velocity or time, a velocity too short to
/// normalize) skips the sweep and only probes for ground. Non-finite input is
/// returned unchanged.
pub fn resolve_motion<U: Copy>(
    scene: &ColliderScene<U>,
    config: &MovementConfig,
    input: &MotionInput,
) -> MotionOutput {
    let half = input.half_extent.abs();
    let lift = Vec3::new(0.0, half.y, 0.0);
    let eps = config.surface_epsilon;

    let mut out = MotionOutput {
        position: input.position,
        velocity: input.velocity,
        grounded: false,
        ground_normal: Vec3::Y,
        outcome: ResolveOutcome::Completed,
        iterations: 0,
        stepped: false,
    };

    if !is_finite_vec(input.position) || !is_finite_vec(input.velocity) || !input.delta_time.is_finite()
    {
        log::warn!("resolve_motion: non-finite input at {:?}", input.position);
        out.grounded = input.grounded;
        return out;
    }

    let mut pos = input.position;
    let mut vel = input.velocity;
    let mut dt = input.delta_time.max(0.0);

    if vel != Vec3::ZERO && dt > 0.0 {
        out.outcome = ResolveOutcome::BudgetExhausted;

        while out.iterations < config.max_iterations {
            let t_max = vel.length() * dt;
            let Some(query) = SweepQuery::swept_box(pos + lift, vel, half) else {
                out.outcome = ResolveOutcome::Completed;
                break;
            };
            out.iterations += 1;

            let Some(hit) = scene.first_hit(&query, t_max) else {
                pos += vel * dt;
                out.outcome = ResolveOutcome::Completed;
                break;
            };

            if hit.is_stuck() {
                // Sitting within epsilon of a face counts as contact.
                let depth = scene
                    .get(hit.collider)
                    .map(|c| face_distance(query.origin, &c.aabb.expanded(half), hit.normal));
                if let Some(depth) = depth.filter(|d| *d <= eps) {
                    pos += hit.normal * (depth + eps);
                    if vel.dot(hit.normal) < 0.0 {
                        vel = remove_component(vel, hit.normal);
                    }
                    continue;
                }

                log::debug!("resolve_motion: stuck inside collider at {pos:?}");
                if config.stuck_policy == StuckPolicy::ZeroVelocity {
                    vel = Vec3::ZERO;
                }
                out.outcome = ResolveOutcome::Stuck;
                break;
            }

            let frac = if t_max > 0.0 {
                (hit.t_min / t_max).clamp(0.0, 1.0)
            } else {
                0.0
            };

            if input.allow_step && input.grounded && hit.normal.y < config.min_ground_normal {
                if let Some(step) = try_step_up(scene, config, half, &hit) {
                    log::debug!("resolve_motion: stepped up to {:?}", step.position);
                    pos = step.position;
                    vel = remove_component(vel, step.normal);
                    dt -= dt * frac;
                    out.stepped = true;
                    continue;
                }
            }

            pos += vel * dt * frac;
            vel = remove_component(vel, hit.normal);
            dt *= 1.0 - frac;
            pos += hit.normal * eps;
        }

        if out.outcome == ResolveOutcome::BudgetExhausted {
            log::debug!(
                "resolve_motion: iteration budget of {} exhausted at {pos:?}",
                config.max_iterations
            );
        }
    }

    if input.snap_to_ground {
        let probe = if input.allow_step {
            config.step_height.max(config.ground_probe_distance)
        } else {
            config.ground_probe_distance
        };
        if let Some((surface_y, normal)) = probe_ground(scene, config, pos, vel, half, probe) {
            pos.y = surface_y + eps;
            vel.y = vel.y.max(0.0);
            out.grounded = true;
            out.ground_normal = normal;
        }
    }

    if !is_finite_vec(pos) || !is_finite_vec(vel) {
        log::warn!("resolve_motion: rejected non-finite result, keeping {:?}", input.position);
        out.position = input.position;
        out.velocity = input.velocity;
        out.grounded = input.grounded;
        return out;
    }

    out.position = pos;
    out.velocity = vel;
    out
}

/// Distance from a point inside `aabb` to the face with outward `normal`.
fn face_distance(point: Vec3, aabb: &Aabb, normal: Vec3) -> f32 {
    let face = if normal.max_element() > 0.0 {
        aabb.max()
    } else {
        aabb.min()
    };
    (face - point).dot(normal).abs()
}

/// Top of the walkable surface within `distance` below the agent, if any.
fn probe_ground<U: Copy>(
    scene: &ColliderScene<U>,
    config: &MovementConfig,
    pos: Vec3,
    vel: Vec3,
    half: Vec3,
    distance: f32,
) -> Option<(f32, Vec3)> {
    if vel.y > config.ground_rise_tolerance {
        return None;
    }

    let query = SweepQuery::swept_box(pos + Vec3::new(0.0, half.y, 0.0), Vec3::NEG_Y, half)?;
    let hit = scene.first_hit(&query, distance + config.surface_epsilon)?;
    if hit.normal.y < config.min_ground_normal {
        return None;
    }

    let surface_y = scene.get(hit.collider)?.aabb.max().y;
    // Sunk deeper than a step is not something to snap out of.
    if hit.is_stuck() && surface_y - pos.y > config.step_height {
        return None;
    }
    Some((surface_y, hit.normal))
}

struct StepUp {
    position: Vec3,
    normal: Vec3,
}

/// Try to climb the obstruction described by `hit`.
fn try_step_up<U: Copy>(
    scene: &ColliderScene<U>,
    config: &MovementConfig,
    half: Vec3,
    hit: &SweepHit<U>,
) -> Option<StepUp> {
    let eps = config.surface_epsilon;
    let into = checked_normalize(-flatten(hit.normal))?;

    let contact = hit.position + hit.normal * eps;
    let bottom_y = contact.y - half.y;

    // Thin box just past the obstruction face, dropped from step height.
    let reach = half.dot(into.abs()) + eps + config.step_probe_inset;
    let probe_at = contact + into * reach;
    let probe = SweepQuery::swept_box(
        Vec3::new(probe_at.x, bottom_y + config.step_height + eps, probe_at.z),
        Vec3::NEG_Y,
        Vec3::new(config.step_probe_thickness, 0.0, config.step_probe_thickness),
    )?;
    let ground = scene.first_hit(&probe, config.step_height + eps)?;
    if ground.is_stuck() || ground.normal.y < config.min_ground_normal {
        return None;
    }

    let surface_y = scene.get(ground.collider)?.aabb.max().y;
    let rise = surface_y - bottom_y;
    if rise <= 0.0 || rise > config.step_height {
        return None;
    }

    let clearance = SweepQuery::swept_box(contact, Vec3::Y, half)?;
    if scene.first_hit(&clearance, rise + eps).is_some() {
        return None;
    }

    Some(StepUp {
        position: Vec3::new(contact.x, surface_y + eps, contact.z),
        normal: ground.normal,
    })
}
