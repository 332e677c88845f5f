//! Multi-faction fog-of-war engine.
//!
//! Tracks, for each faction, which grid cells are currently in sight
//! (Visible) and which have ever been seen (Revealed) over a discretized
//! world rectangle. Each simulation tick the caller feeds the engine one
//! ephemeral [`Observer`] per vision-capable entity, bracketed by
//! [`FogEngine::begin_frame`] and [`FogEngine::end_frame`] (or via
//! [`FogEngine::run_frame`]); AI, rendering, and minimap consumers read the
//! result through O(1) point queries between frames.
//!
//! Visibility is purely radius-based: no terrain occlusion, no shared
//! vision between factions, no elevation.

mod config;
mod engine;
mod export;
mod faction;
mod grid;
mod observer;
mod plane;
mod snapshot;
mod stamp;

pub use config::{
    load_fog_config_from_env, FogConfig, FogConfigError, BUILTIN_FOG_CONFIG, FOG_CONFIG_PATH_ENV,
};
pub use engine::{CellState, FogEngine, FogError};
pub use faction::{FactionId, DEFAULT_MAX_FACTIONS};
pub use grid::{GridDescriptor, GridError};
pub use observer::Observer;
pub use snapshot::{decode_snapshot, encode_snapshot, FogSnapshot, SnapshotError};
