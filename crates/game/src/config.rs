//! Simulation configuration.
//!
//! Everything is serde with defaults, so a TOML file only needs the values
//! it changes:
//!
//! ```toml
//! time_scale = 0.5
//!
//! [movement]
//! walk_max_speed = 2.0
//!
//! [ai]
//! max_drones = 4
//! ```

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use sps_physics::{MovementConfig, ParameterError, ZoneConfig};

use crate::error::ConfigError;

/// Game simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulation tick rate (ticks per second).
    pub tick_rate: u32,

    /// Multiplier applied to every incoming delta time.
    pub time_scale: f32,

    /// The player ignores weapon and projectile damage.
    pub no_damage: bool,

    /// Movement physics configuration, shared by the player and drones.
    pub movement: MovementConfig,

    pub player: PlayerConfig,

    pub weapon: WeaponConfig,

    pub ai: AiConfig,

    /// Zone hierarchy used by all three scenes.
    pub zones: ZoneConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            time_scale: 1.0,
            no_damage: false,
            movement: MovementConfig::default(),
            player: PlayerConfig::default(),
            weapon: WeaponConfig::default(),
            ai: AiConfig::default(),
            zones: ZoneConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Get the time step per tick in seconds.
    pub fn delta_time(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), ParameterError> {
        ParameterError::positive("tick_rate", self.tick_rate as f32)?;
        ParameterError::non_negative("time_scale", self.time_scale)?;
        self.movement.validate()?;
        self.player.validate()?;
        self.weapon.validate()?;
        self.ai.validate()
    }
}

// ============================================================================
// Player
// ============================================================================

/// Player body, view and life cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Collision half extent of the player box.
    pub half_extent: Vec3,

    /// Eye position relative to the box bottom center.
    pub camera_offset: Vec3,

    /// Degrees of view rotation per unit of mouse movement.
    pub mouse_accel: f32,

    /// Optional symmetric pitch clamp in degrees. `None` leaves pitch free.
    pub pitch_limit: Option<f32>,

    pub max_health: i32,

    /// Seconds after death before a key press reloads the level.
    pub respawn_delay: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            half_extent: Vec3::new(0.45, 0.95, 0.45),
            camera_offset: Vec3::new(0.0, 0.8, 0.0),
            mouse_accel: 0.2,
            pitch_limit: None,
            max_health: 100,
            respawn_delay: 1.2,
        }
    }
}

impl PlayerConfig {
    pub fn validate(&self) -> Result<(), ParameterError> {
        for c in self.half_extent.to_array() {
            ParameterError::positive("player.half_extent", c)?;
        }
        for c in self.camera_offset.to_array() {
            ParameterError::finite("player.camera_offset", c)?;
        }
        ParameterError::finite("player.mouse_accel", self.mouse_accel)?;
        if let Some(limit) = self.pitch_limit {
            ParameterError::in_range("player.pitch_limit", limit, 0.0, 180.0)?;
        }
        ParameterError::positive("player.max_health", self.max_health as f32)?;
        ParameterError::non_negative("player.respawn_delay", self.respawn_delay)
    }
}

// ============================================================================
// Weapons
// ============================================================================

/// Weapon tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    /// Ammo the player spawns with.
    pub start_ammo: u32,

    /// Ammo restored per regeneration step.
    pub regen_amount: u32,

    /// Seconds after the last shot before ammo starts regenerating.
    pub regen_delay: f32,

    pub glock: HitscanConfig,

    pub flamethrower: FlamethrowerConfig,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            start_ammo: 15,
            regen_amount: 2,
            regen_delay: 2.0,
            glock: HitscanConfig::default(),
            flamethrower: FlamethrowerConfig::default(),
        }
    }
}

impl WeaponConfig {
    pub fn validate(&self) -> Result<(), ParameterError> {
        ParameterError::non_negative("weapon.regen_delay", self.regen_delay)?;
        ParameterError::non_negative("weapon.glock.cooldown", self.glock.cooldown)?;
        ParameterError::positive("weapon.glock.range", self.glock.range)?;
        ParameterError::positive("weapon.flamethrower.reach", self.flamethrower.reach)?;
        ParameterError::non_negative("weapon.flamethrower.muzzle_padding", self.flamethrower.muzzle_padding)?;
        for c in self.flamethrower.half_extent.to_array() {
            ParameterError::non_negative("weapon.flamethrower.half_extent", c)?;
        }
        for c in self.flamethrower.probe_half_extent.to_array() {
            ParameterError::non_negative("weapon.flamethrower.probe_half_extent", c)?;
        }
        Ok(())
    }
}

/// A single-target hit-scan gun.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitscanConfig {
    /// Seconds between shots.
    pub cooldown: f32,
    pub damage: i32,
    pub max_ammo: u32,
    /// Furthest distance a shot can land.
    pub range: f32,
}

impl Default for HitscanConfig {
    fn default() -> Self {
        Self {
            cooldown: 0.05,
            damage: 1000,
            max_ammo: 100,
            range: 1000.0,
        }
    }
}

/// A short-range cone approximated by a wide swept box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlamethrowerConfig {
    /// Damage dealt to every target in reach, per tick of firing.
    pub damage: i32,
    pub max_ammo: u32,
    /// Maximum reach of the flame.
    pub reach: f32,
    /// Extra distance added to the player box when placing the muzzle.
    pub muzzle_padding: f32,
    /// Half extent of the box swept against hitboxes.
    pub half_extent: Vec3,
    /// Half extent of the box used to find the wall the flame stops at.
    pub probe_half_extent: Vec3,
}

impl Default for FlamethrowerConfig {
    fn default() -> Self {
        Self {
            damage: 5,
            max_ammo: 250,
            reach: 2.0,
            muzzle_padding: 0.5,
            half_extent: Vec3::ONE,
            probe_half_extent: Vec3::splat(0.1),
        }
    }
}

// ============================================================================
// AI
// ============================================================================

/// Turret, drone, projectile and spawner tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Aggro level set while the player is visible.
    pub max_aggro: f32,

    /// Aggro lost per second while the player is hidden.
    pub aggro_decay: f32,

    /// Seconds between line-of-sight checks. Zero checks every tick.
    pub perception_interval: f32,

    /// Minimum dot product between view and target direction to count as
    /// aligned.
    pub align_tolerance: f32,

    /// Turret turn rate in radians per second.
    pub turret_turn_speed: f32,

    /// Seconds between turret shots while aligned.
    pub turret_fire_interval: f32,

    pub drone_half_extent: Vec3,
    pub drone_health: i32,
    pub drone_max_speed: f32,

    /// Distance over which drones slow down when approaching a target.
    pub drone_speed_falloff: f32,

    /// Steering acceleration limit.
    pub drone_max_accel: f32,

    pub drone_fire_range: f32,
    pub drone_fire_interval: f32,

    /// A nav node counts as reached within this distance.
    pub nav_arrive_radius: f32,

    pub projectile_speed: f32,
    pub projectile_damage: i32,
    pub projectile_half_extent: Vec3,

    /// Projectiles despawn after this many seconds.
    pub projectile_lifetime: f32,

    /// Seconds between spawner drones.
    pub spawn_interval: f32,

    /// Spawners pause while this many drones are alive.
    pub max_drones: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            max_aggro: 100.0,
            aggro_decay: 15.0,
            perception_interval: 0.0,
            align_tolerance: 0.98,
            turret_turn_speed: 3.0,
            turret_fire_interval: 1.0,
            drone_half_extent: Vec3::splat(0.3),
            drone_health: 40,
            drone_max_speed: 3.0,
            drone_speed_falloff: 2.0,
            drone_max_accel: 6.0,
            drone_fire_range: 8.0,
            drone_fire_interval: 1.5,
            nav_arrive_radius: 0.5,
            projectile_speed: 4.0,
            projectile_damage: 5,
            projectile_half_extent: Vec3::splat(0.1),
            projectile_lifetime: 10.0,
            spawn_interval: 0.5,
            max_drones: 8,
        }
    }
}

impl AiConfig {
    pub fn validate(&self) -> Result<(), ParameterError> {
        ParameterError::positive("ai.max_aggro", self.max_aggro)?;
        ParameterError::non_negative("ai.aggro_decay", self.aggro_decay)?;
        ParameterError::non_negative("ai.perception_interval", self.perception_interval)?;
        ParameterError::in_range("ai.align_tolerance", self.align_tolerance, -1.0, 1.0)?;
        ParameterError::positive("ai.turret_turn_speed", self.turret_turn_speed)?;
        ParameterError::non_negative("ai.turret_fire_interval", self.turret_fire_interval)?;
        for c in self.drone_half_extent.to_array() {
            ParameterError::positive("ai.drone_half_extent", c)?;
        }
        ParameterError::positive("ai.drone_health", self.drone_health as f32)?;
        ParameterError::non_negative("ai.drone_max_speed", self.drone_max_speed)?;
        ParameterError::positive("ai.drone_speed_falloff", self.drone_speed_falloff)?;
        ParameterError::non_negative("ai.drone_max_accel", self.drone_max_accel)?;
        ParameterError::non_negative("ai.drone_fire_range", self.drone_fire_range)?;
        ParameterError::non_negative("ai.drone_fire_interval", self.drone_fire_interval)?;
        ParameterError::positive("ai.nav_arrive_radius", self.nav_arrive_radius)?;
        ParameterError::positive("ai.projectile_speed", self.projectile_speed)?;
        for c in self.projectile_half_extent.to_array() {
            ParameterError::non_negative("ai.projectile_half_extent", c)?;
        }
        ParameterError::positive("ai.projectile_lifetime", self.projectile_lifetime)?;
        ParameterError::non_negative("ai.spawn_interval", self.spawn_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.delta_time() - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimulationConfig::from_toml_str(
            r#"
            time_scale = 0.5
            no_damage = true

            [movement]
            walk_max_speed = 2.0
            stuck_policy = "zero_velocity"

            [player]
            pitch_limit = 89.0

            [ai]
            max_drones = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.time_scale, 0.5);
        assert!(config.no_damage);
        assert_eq!(config.movement.walk_max_speed, 2.0);
        assert_eq!(
            config.movement.stuck_policy,
            sps_physics::StuckPolicy::ZeroVelocity
        );
        assert_eq!(config.movement.sprint_max_speed, 3.6);
        assert_eq!(config.player.pitch_limit, Some(89.0));
        assert_eq!(config.player.max_health, 100);
        assert_eq!(config.ai.max_drones, 3);
        assert_eq!(config.weapon.glock.damage, 1000);
    }

    #[test]
    fn test_vectors_parse_as_arrays() {
        let config = SimulationConfig::from_toml_str(
            r#"
            [player]
            half_extent = [0.3, 0.9, 0.3]
            "#,
        )
        .unwrap();
        assert_eq!(config.player.half_extent, Vec3::new(0.3, 0.9, 0.3));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = SimulationConfig::from_toml_str("[ai]\ndrone_speed_falloff = 0.0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(ParameterError::NotPositive {
                name: "ai.drone_speed_falloff",
                ..
            })
        ));

        let err = SimulationConfig::from_toml_str("tick_rate = \"fast\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SimulationConfig::load(Path::new("/nonexistent/sps.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
