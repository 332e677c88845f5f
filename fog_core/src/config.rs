//! Configuration for the fog-of-war engine.
//!
//! Loaded from `fog_config.json` with support for an environment variable
//! override. Grid bounds and resolution are fixed at engine construction
//! and mutable only through an explicit rebuild.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Deserialize;
use thiserror::Error;

use crate::faction::DEFAULT_MAX_FACTIONS;

pub const BUILTIN_FOG_CONFIG: &str = include_str!("data/fog_config.json");

/// Environment variable naming an override config path.
pub const FOG_CONFIG_PATH_ENV: &str = "FOG_CONFIG_PATH";

/// Root configuration for the fog engine.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FogConfig {
    /// World-space corner of the grid rectangle (x, z plane).
    pub world_min: [f32; 2],
    /// Opposite world-space corner; must exceed `world_min` on both axes.
    pub world_max: [f32; 2],
    /// Edge length of one square cell in world units.
    pub cell_size: f32,
    /// Faction slot capacity, fixed for the engine's lifetime.
    pub max_factions: u32,
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            world_min: [0.0, 0.0],
            world_max: [128.0, 128.0],
            cell_size: 1.0,
            max_factions: DEFAULT_MAX_FACTIONS,
        }
    }
}

impl FogConfig {
    pub fn builtin() -> Arc<Self> {
        Arc::new(serde_json::from_str(BUILTIN_FOG_CONFIG).expect("builtin fog config should parse"))
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, FogConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| FogConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = FogConfig::from_json_str(&contents)?;
        Ok(config)
    }
}

#[derive(Debug, Error)]
pub enum FogConfigError {
    #[error("failed to parse fog config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read fog config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Load the fog configuration from `FOG_CONFIG_PATH` if set, falling back
/// to the builtin defaults. Returns the config together with the path it
/// was loaded from, if any.
pub fn load_fog_config_from_env() -> (Arc<FogConfig>, Option<PathBuf>) {
    if let Some(path) = env::var(FOG_CONFIG_PATH_ENV).ok().map(PathBuf::from) {
        match FogConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "fog::config",
                    path = %path.display(),
                    "fog_config.loaded=file"
                );
                return (Arc::new(config), Some(path));
            }
            Err(err) => {
                tracing::warn!(
                    target: "fog::config",
                    path = %path.display(),
                    error = %err,
                    "fog_config.load_failed"
                );
            }
        }
    }

    tracing::info!(target: "fog::config", "fog_config.loaded=builtin");
    (FogConfig::builtin(), None)
}
