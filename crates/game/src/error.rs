//! Error types for the game crate.

use std::path::PathBuf;

use sps_physics::ParameterError;
use thiserror::Error;

use crate::entity::EntityId;

/// Loading or validating a configuration file failed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for the expected shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is out of range.
    #[error("invalid config: {0}")]
    Invalid(#[from] ParameterError),
}

/// A simulation operation was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// The id is stale or was never issued.
    #[error("unknown or despawned entity {0:?}")]
    UnknownEntity(EntityId),

    /// Levels need somewhere to put the player.
    #[error("level `{0}` has no player spawn")]
    NoPlayerSpawn(String),

    /// The configuration failed validation.
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ParameterError),
}
