//! Player weapons.
//!
//! Both weapons resolve instantly against the two scenes: the world scene
//! decides how far a shot can travel, the hitbox scene decides who it hits.
//! Hits are reported as [`DamageEvent`]s.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use sps_physics::geometry::vector::DEGENERATE_LENGTH;
use sps_physics::{ColliderScene, SweepHit, SweepQuery};

use crate::config::WeaponConfig;
use crate::damage::{DamageEvent, DamageSource};
use crate::entity::EntityId;

/// Which weapon is equipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    #[default]
    Glock,
    Flamethrower,
}

/// The shooter's side of a shot.
#[derive(Debug, Clone, Copy)]
pub struct Shooter {
    pub id: EntityId,
    /// Eye position.
    pub eye: Vec3,
    /// Unit view direction.
    pub forward: Vec3,
    /// Box the muzzle has to clear, measured from the eye.
    pub body_size: Vec3,
}

/// Equipped weapon with its ammo and timers.
#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    pub kind: WeaponKind,
    pub ammo: u32,
    last_shot: Option<f64>,
    regen_at: f64,
}

impl Weapon {
    pub fn new(kind: WeaponKind, config: &WeaponConfig) -> Self {
        let mut weapon = Self {
            kind,
            ammo: config.start_ammo,
            last_shot: None,
            regen_at: 0.0,
        };
        weapon.ammo = weapon.ammo.min(weapon.max_ammo(config));
        weapon
    }

    pub fn max_ammo(&self, config: &WeaponConfig) -> u32 {
        match self.kind {
            WeaponKind::Glock => config.glock.max_ammo,
            WeaponKind::Flamethrower => config.flamethrower.max_ammo,
        }
    }

    /// Swap weapons, keeping the shared ammo pool within the new cap.
    pub fn switch_to(&mut self, kind: WeaponKind, config: &WeaponConfig) {
        if self.kind == kind {
            return;
        }
        self.kind = kind;
        self.ammo = self.ammo.min(self.max_ammo(config));
        log::debug!("switched weapon to {kind:?}");
    }

    /// Advance one tick: fire if the trigger is held and the weapon is ready,
    /// then regenerate ammo. Returns whether a shot went off.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        trigger_held: bool,
        shooter: &Shooter,
        world: &ColliderScene<()>,
        hitboxes: &ColliderScene<EntityId>,
        config: &WeaponConfig,
        now: f64,
        damage: &mut Vec<DamageEvent>,
    ) -> bool {
        let fired = trigger_held && self.ammo > 0 && self.ready(config, now);
        if fired {
            self.ammo -= 1;
            self.last_shot = Some(now);
            self.regen_at = now + f64::from(config.regen_delay);

            match self.kind {
                WeaponKind::Glock => fire_glock(shooter, world, hitboxes, config, damage),
                WeaponKind::Flamethrower => fire_flame(shooter, world, hitboxes, config, damage),
            }
        }

        self.regenerate(config, now);
        fired
    }

    fn ready(&self, config: &WeaponConfig, now: f64) -> bool {
        match self.kind {
            WeaponKind::Glock => self
                .last_shot
                .map_or(true, |t| now - t > f64::from(config.glock.cooldown)),
            WeaponKind::Flamethrower => true,
        }
    }

    fn regenerate(&mut self, config: &WeaponConfig, now: f64) {
        let max = self.max_ammo(config);
        if self.ammo < max && now > self.regen_at {
            self.ammo = (self.ammo + config.regen_amount).min(max);
            self.regen_at = now;
        }
    }
}

/// Distance along `forward` from the center of a box of full size `size` to
/// its surface. Axes the direction doesn't move along are ignored.
pub fn muzzle_distance(forward: Vec3, size: Vec3) -> f32 {
    forward
        .to_array()
        .into_iter()
        .zip(size.to_array())
        .filter(|(f, _)| f.abs() > DEGENERATE_LENGTH)
        .map(|(f, s)| (s / f).abs())
        .reduce(f32::min)
        .unwrap_or(0.0)
}

/// Nearest hitbox along a ray, not counting `shooter` and not past the first
/// piece of world geometry.
pub fn hitscan(
    world: &ColliderScene<()>,
    hitboxes: &ColliderScene<EntityId>,
    origin: Vec3,
    direction: Vec3,
    range: f32,
    shooter: EntityId,
) -> Option<SweepHit<EntityId>> {
    let query = SweepQuery::ray(origin, direction)?;
    let bound = world
        .first_hit(&query, range)
        .map_or(range, |hit| hit.t_min);
    hitboxes.first_hit_where(&query, bound, |_, &id| id != shooter)
}

fn fire_glock(
    shooter: &Shooter,
    world: &ColliderScene<()>,
    hitboxes: &ColliderScene<EntityId>,
    config: &WeaponConfig,
    damage: &mut Vec<DamageEvent>,
) {
    let origin = shooter.eye + shooter.forward * muzzle_distance(shooter.forward, shooter.body_size);
    let hit = hitscan(
        world,
        hitboxes,
        origin,
        shooter.forward,
        config.glock.range,
        shooter.id,
    );
    if let Some(hit) = hit {
        damage.push(DamageEvent {
            target: hit.user,
            amount: config.glock.damage,
            position: hit.position,
            source: DamageSource::Weapon,
        });
    }
}

fn fire_flame(
    shooter: &Shooter,
    world: &ColliderScene<()>,
    hitboxes: &ColliderScene<EntityId>,
    config: &WeaponConfig,
    damage: &mut Vec<DamageEvent>,
) {
    let flame = &config.flamethrower;
    let padded = shooter.body_size + Vec3::splat(flame.muzzle_padding);
    let origin = shooter.eye + shooter.forward * muzzle_distance(shooter.forward, padded);

    let Some(probe) = SweepQuery::swept_box(origin, shooter.forward, flame.probe_half_extent) else {
        return;
    };
    let reach = world
        .first_hit(&probe, flame.reach)
        .map_or(flame.reach, |hit| hit.t_min.min(flame.reach));

    let Some(sweep) = SweepQuery::swept_box(origin, shooter.forward, flame.half_extent) else {
        return;
    };
    damage.extend(
        hitboxes
            .all_hits(&sweep, reach)
            .into_iter()
            .filter(|hit| hit.user != shooter.id)
            .map(|hit| DamageEvent {
                target: hit.user,
                amount: flame.damage,
                position: hit.position,
                source: DamageSource::Weapon,
            }),
    );
}
