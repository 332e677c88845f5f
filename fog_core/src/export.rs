//! Bulk raster export for external visualization consumers.
//!
//! The engine itself exposes only point queries; minimap shading and
//! overlay textures are built by external consumers on top of this one
//! explicit export operation instead of scanning engine internals.

use crate::{engine::FogEngine, faction::FactionId};

impl FogEngine {
    /// Export one faction's fog state as a flat byte raster (row-major),
    /// one byte per cell: 0 hidden, 1 revealed, 2 visible (see
    /// [`crate::CellState`]). An out-of-capacity faction exports an
    /// all-hidden raster.
    pub fn state_raster(&self, faction: FactionId) -> Vec<u8> {
        let grid = self.grid();
        let mut raster = Vec::with_capacity(grid.cell_count());
        for y in 0..grid.height {
            for x in 0..grid.width {
                raster.push(self.cell_state(faction, bevy_math::UVec2::new(x, y)).as_u8());
            }
        }
        raster
    }
}
