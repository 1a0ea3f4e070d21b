//! Level description.
//!
//! A level is plain data: static boxes plus placements for everything the
//! simulation spawns when the level loads. Levels can be written in TOML:
//!
//! ```toml
//! name = "corridor"
//! nav_nodes = [[0.0, 2.0, 0.0], [10.0, 2.0, 0.0]]
//!
//! [player_spawn]
//! position = [0.0, 0.0, 0.0]
//! yaw = 0.0
//!
//! [[brushes]]
//! center = [0.0, -0.5, 0.0]
//! size = [40.0, 1.0, 40.0]
//! ```

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use sps_physics::Aabb;

use crate::error::ConfigError;

/// A game level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Level {
    /// Display name.
    pub name: String,

    /// Static collision boxes.
    pub brushes: Vec<Aabb>,

    /// Where the player appears.
    pub player_spawn: Option<PlayerSpawn>,

    pub turrets: Vec<TurretPlacement>,

    pub spawners: Vec<SpawnerPlacement>,

    pub hurt_triggers: Vec<HurtTriggerPlacement>,

    /// Drone patrol route, visited in order.
    pub nav_nodes: Vec<Vec3>,
}

/// Player start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSpawn {
    /// Box bottom center.
    pub position: Vec3,

    /// Initial yaw in degrees.
    pub yaw: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretPlacement {
    /// Hitbox center.
    pub position: Vec3,
    pub hitbox_size: Vec3,
    pub facing: Vec3,
    pub health: i32,
}

impl Default for TurretPlacement {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            hitbox_size: Vec3::ONE,
            facing: Vec3::NEG_Z,
            health: 120,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerPlacement {
    pub position: Vec3,
    /// Drone spawn point relative to `position`.
    pub spawn_offset: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HurtTriggerPlacement {
    pub center: Vec3,
    pub size: Vec3,
    pub damage: i32,
    /// Seconds between hits. Zero makes a kill volume.
    pub interval: f32,
}

impl Default for HurtTriggerPlacement {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            size: Vec3::splat(2.0),
            damage: 15,
            interval: 0.25,
        }
    }
}

impl Level {
    /// Create an empty level.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Parse a level from TOML.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Read and parse a TOML level file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Create a simple test level for development.
    pub fn test_arena() -> Self {
        let mut level = Self::new("test_arena");

        // Floor, top face at y = 0
        level.add_box(Vec3::new(0.0, -0.5, 0.0), Vec3::new(100.0, 1.0, 100.0));

        // Walls
        let wall_height = 5.0;
        let wall_thickness = 1.0;
        let arena_size = 50.0;
        for (center, size) in [
            (Vec3::new(0.0, 0.0, -arena_size), Vec3::new(2.0 * arena_size, 0.0, wall_thickness)),
            (Vec3::new(0.0, 0.0, arena_size), Vec3::new(2.0 * arena_size, 0.0, wall_thickness)),
            (Vec3::new(arena_size, 0.0, 0.0), Vec3::new(wall_thickness, 0.0, 2.0 * arena_size)),
            (Vec3::new(-arena_size, 0.0, 0.0), Vec3::new(wall_thickness, 0.0, 2.0 * arena_size)),
        ] {
            level.add_box(
                center + Vec3::new(0.0, wall_height / 2.0, 0.0),
                size + Vec3::new(0.0, wall_height, 0.0),
            );
        }

        // Central pillar
        level.add_box(Vec3::new(0.0, 2.0, 0.0), Vec3::new(4.0, 4.0, 4.0));

        // Cover crates
        level.add_box(Vec3::new(-15.0, 1.0, 10.0), Vec3::new(3.0, 2.0, 3.0));
        level.add_box(Vec3::new(15.0, 1.0, -10.0), Vec3::new(3.0, 2.0, 3.0));

        // A low platform to walk up onto
        level.add_box(Vec3::new(-10.0, 0.1, 0.0), Vec3::new(4.0, 0.2, 6.0));

        level.player_spawn = Some(PlayerSpawn {
            position: Vec3::new(-20.0, 0.0, 0.0),
            yaw: -90.0,
        });

        level.turrets.push(TurretPlacement {
            position: Vec3::new(0.0, 3.0, -15.0),
            facing: Vec3::Z,
            ..Default::default()
        });

        level.spawners.push(SpawnerPlacement {
            position: Vec3::new(20.0, 3.0, 20.0),
            spawn_offset: Vec3::new(0.0, 1.0, 0.0),
        });

        level.nav_nodes = vec![
            Vec3::new(20.0, 3.0, 20.0),
            Vec3::new(-20.0, 3.0, 20.0),
            Vec3::new(-20.0, 3.0, -20.0),
            Vec3::new(20.0, 3.0, -20.0),
        ];

        level.hurt_triggers.push(HurtTriggerPlacement {
            center: Vec3::new(25.0, 1.0, 0.0),
            ..Default::default()
        });

        level
    }

    fn add_box(&mut self, center: Vec3, size: Vec3) {
        self.brushes.push(Aabb::new(center, size));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_creation() {
        let level = Level::new("test");
        assert_eq!(level.name, "test");
        assert!(level.brushes.is_empty());
        assert!(level.player_spawn.is_none());
    }

    #[test]
    fn test_test_arena() {
        let level = Level::test_arena();
        assert!(level.brushes.len() >= 8);
        assert!(level.player_spawn.is_some());
        assert_eq!(level.turrets.len(), 1);
        assert_eq!(level.turrets[0].health, 120);
        assert_eq!(level.nav_nodes.len(), 4);
        // Floor top sits at zero.
        assert_eq!(level.brushes[0].max().y, 0.0);
    }

    #[test]
    fn test_parse_toml_level() {
        let level = Level::from_toml_str(
            r#"
            name = "corridor"
            nav_nodes = [[0.0, 2.0, 0.0], [10.0, 2.0, 0.0]]

            [player_spawn]
            position = [1.0, 0.0, 2.0]

            [[brushes]]
            center = [0.0, -0.5, 0.0]
            size = [40.0, 1.0, 40.0]

            [[turrets]]
            position = [0.0, 2.0, -10.0]

            [[hurt_triggers]]
            center = [5.0, 1.0, 0.0]
            interval = 0.0
            "#,
        )
        .unwrap();

        assert_eq!(level.name, "corridor");
        assert_eq!(level.brushes.len(), 1);
        assert_eq!(level.player_spawn.map(|s| s.position), Some(Vec3::new(1.0, 0.0, 2.0)));
        assert_eq!(level.turrets[0].health, 120);
        assert_eq!(level.turrets[0].facing, Vec3::NEG_Z);
        assert_eq!(level.hurt_triggers[0].interval, 0.0);
        assert_eq!(level.hurt_triggers[0].damage, 15);
        assert_eq!(level.nav_nodes[1], Vec3::new(10.0, 2.0, 0.0));
    }
}
