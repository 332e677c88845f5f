//! Optional persistence of exploration history.
//!
//! Only the Revealed plane is worth persisting: Visible is rebuilt from
//! scratch every frame. A snapshot carries the grid descriptor it was
//! captured under so a restore can reject a mismatched engine instead of
//! scrambling cell indices.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{engine::FogEngine, plane::BitPlane};

/// Serializable capture of the Revealed plane for every faction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FogSnapshot {
    pub world_min: [f32; 2],
    pub world_max: [f32; 2],
    pub cell_size: f32,
    pub width: u32,
    pub height: u32,
    pub max_factions: u32,
    pub frame: u64,
    revealed_words: Vec<u64>,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to encode fog snapshot: {0}")]
    Encode(#[source] bincode::Error),
    #[error("failed to decode fog snapshot: {0}")]
    Decode(#[source] bincode::Error),
    #[error(
        "snapshot grid {snapshot_width}x{snapshot_height}x{snapshot_factions} does not match \
         engine grid {engine_width}x{engine_height}x{engine_factions}"
    )]
    GridMismatch {
        snapshot_width: u32,
        snapshot_height: u32,
        snapshot_factions: u32,
        engine_width: u32,
        engine_height: u32,
        engine_factions: u32,
    },
    #[error("snapshot payload length does not match its declared dimensions")]
    CorruptPayload,
}

pub fn encode_snapshot(snapshot: &FogSnapshot) -> Result<Vec<u8>, SnapshotError> {
    bincode::serialize(snapshot).map_err(SnapshotError::Encode)
}

pub fn decode_snapshot(bytes: &[u8]) -> Result<FogSnapshot, SnapshotError> {
    bincode::deserialize(bytes).map_err(SnapshotError::Decode)
}

impl FogEngine {
    /// Capture the Revealed planes of all factions.
    pub fn capture_snapshot(&self) -> FogSnapshot {
        let grid = self.grid();
        FogSnapshot {
            world_min: grid.world_min.to_array(),
            world_max: grid.world_max.to_array(),
            cell_size: grid.cell_size,
            width: grid.width,
            height: grid.height,
            max_factions: self.max_factions(),
            frame: self.frame(),
            revealed_words: self.revealed_plane().words().to_vec(),
        }
    }

    /// Overwrite the Revealed planes from a snapshot captured under an
    /// identical grid. Visible is cleared; the next frame restamps it.
    pub fn restore_snapshot(&mut self, snapshot: &FogSnapshot) -> Result<(), SnapshotError> {
        let grid = self.grid();
        if snapshot.width != grid.width
            || snapshot.height != grid.height
            || snapshot.max_factions != self.max_factions()
            || snapshot.cell_size != grid.cell_size
            || snapshot.world_min != grid.world_min.to_array()
            || snapshot.world_max != grid.world_max.to_array()
        {
            return Err(SnapshotError::GridMismatch {
                snapshot_width: snapshot.width,
                snapshot_height: snapshot.height,
                snapshot_factions: snapshot.max_factions,
                engine_width: grid.width,
                engine_height: grid.height,
                engine_factions: self.max_factions(),
            });
        }

        let bits = grid.cell_count() * self.max_factions() as usize;
        let revealed = BitPlane::from_words(bits, snapshot.revealed_words.clone())
            .ok_or(SnapshotError::CorruptPayload)?;

        tracing::info!(
            target: "fog::snapshot",
            frame = snapshot.frame,
            "fog.snapshot_restored"
        );
        self.restore_planes(revealed, snapshot.frame);
        Ok(())
    }
}
