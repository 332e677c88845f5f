//! The fog-of-war engine: per-faction Visible/Revealed planes, the
//! per-frame update lifecycle, point queries, and grid rebuilds.
//!
//! One [`FogEngine`] instance is constructed by the simulation root and
//! passed by reference to every consumer; there is no ambient global state.
//! The engine is single-threaded by contract: one frame is exactly
//! `begin_frame` -> N `stamp` calls -> `end_frame`, and queries may run at
//! any point between frames.

use bevy_math::{UVec2, Vec2};
use thiserror::Error;

use crate::{
    config::FogConfig,
    faction::FactionId,
    grid::{GridDescriptor, GridError},
    plane::BitPlane,
    stamp::stamp_footprint,
};

/// Error raised by fog engine operations.
#[derive(Debug, Error)]
pub enum FogError {
    #[error("faction {0} is outside the configured capacity")]
    UnknownFaction(FactionId),
    #[error("faction capacity must be at least 1")]
    ZeroFactionCapacity,
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Fog state of one cell from one faction's perspective.
///
/// - `Hidden`: never seen.
/// - `Revealed`: seen at some earlier frame, not currently in sight.
/// - `Visible`: in sight this frame.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellState {
    #[default]
    Hidden = 0,
    Revealed = 1,
    Visible = 2,
}

impl CellState {
    /// Convert to u8 for raster export.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Convert from u8, defaulting to Hidden for invalid values.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Revealed,
            2 => Self::Visible,
            _ => Self::Hidden,
        }
    }
}

/// Multi-faction fog-of-war tracker over a discretized world rectangle.
///
/// Two bit planes are kept per faction: Visible (current frame's line of
/// sight) and Revealed (ever seen). Four invariants hold at every
/// observable instant:
///
/// 1. a Visible cell is always also Revealed (both bits are set in the
///    same stamp pass),
/// 2. Revealed is monotonic until an explicit [`FogEngine::rebuild`],
/// 3. [`FogEngine::begin_frame`] fully clears Visible with no carry-over,
/// 4. faction planes are mutually independent.
#[derive(Debug, Clone)]
pub struct FogEngine {
    grid: GridDescriptor,
    max_factions: u32,
    visible: BitPlane,
    revealed: BitPlane,
    frame: u64,
}

impl FogEngine {
    /// Build an engine from a validated configuration.
    pub fn new(config: &FogConfig) -> Result<Self, FogError> {
        let grid = GridDescriptor::new(
            Vec2::from(config.world_min),
            Vec2::from(config.world_max),
            config.cell_size,
        )?;
        Self::with_grid(grid, config.max_factions)
    }

    /// Build an engine over an already-constructed grid descriptor.
    pub fn with_grid(grid: GridDescriptor, max_factions: u32) -> Result<Self, FogError> {
        if max_factions == 0 {
            return Err(FogError::ZeroFactionCapacity);
        }
        let bits = grid.cell_count() * max_factions as usize;
        tracing::info!(
            target: "fog::engine",
            width = grid.width,
            height = grid.height,
            cell_size = grid.cell_size,
            max_factions,
            "fog.engine_created"
        );
        Ok(Self {
            grid,
            max_factions,
            visible: BitPlane::new(bits),
            revealed: BitPlane::new(bits),
            frame: 0,
        })
    }

    pub fn grid(&self) -> &GridDescriptor {
        &self.grid
    }

    pub fn max_factions(&self) -> u32 {
        self.max_factions
    }

    /// Number of completed frames since construction or last rebuild.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Map a faction id to its plane slot, rejecting ids at or above the
    /// configured capacity.
    #[inline]
    fn faction_slot(&self, faction: FactionId) -> Option<usize> {
        (faction.0 < self.max_factions).then_some(faction.0 as usize)
    }

    #[inline]
    fn base_bit(&self, slot: usize) -> usize {
        slot * self.grid.cell_count()
    }

    /// Start a frame: clear every faction's Visible plane. Revealed is
    /// untouched.
    pub fn begin_frame(&mut self) {
        self.visible.clear_all();
        tracing::trace!(target: "fog::frame", frame = self.frame, "fog.begin_frame");
    }

    /// Rasterize one observer footprint into the owning faction's planes.
    ///
    /// Callers must bracket all stamps for a tick between [`Self::begin_frame`]
    /// and [`Self::end_frame`]; the engine does not detect an unbracketed
    /// stamp, and Visible state would accumulate across frames instead of
    /// resetting. A footprint wholly outside the grid clips to a no-op, and
    /// a non-positive radius still reveals the observer's own cell.
    pub fn stamp(
        &mut self,
        faction: FactionId,
        world_pos: Vec2,
        radius: f32,
    ) -> Result<(), FogError> {
        let slot = self
            .faction_slot(faction)
            .ok_or(FogError::UnknownFaction(faction))?;
        let base_bit = self.base_bit(slot);
        let stamped = stamp_footprint(
            &self.grid,
            &mut self.visible,
            &mut self.revealed,
            base_bit,
            world_pos,
            radius,
        );
        tracing::trace!(
            target: "fog::stamp",
            faction = faction.0,
            x = world_pos.x,
            y = world_pos.y,
            radius,
            stamped,
            "fog.stamp"
        );
        Ok(())
    }

    /// Finish a frame. Owns no rendering side effects; consumers read the
    /// result through the query API.
    pub fn end_frame(&mut self) {
        self.frame += 1;
        if tracing::enabled!(target: "fog::frame", tracing::Level::DEBUG) {
            let cells = self.grid.cell_count();
            for slot in 0..self.max_factions as usize {
                let base = self.base_bit(slot);
                tracing::debug!(
                    target: "fog::frame",
                    frame = self.frame,
                    faction = slot,
                    visible = self.visible.count_ones_range(base, cells),
                    revealed = self.revealed.count_ones_range(base, cells),
                    "fog.end_frame"
                );
            }
        }
    }

    /// Whether the faction currently sees the cell containing `world_pos`.
    /// Out-of-bounds positions and out-of-capacity factions read as `false`.
    pub fn is_visible(&self, faction: FactionId, world_pos: Vec2) -> bool {
        self.query_bit(&self.visible, faction, world_pos)
    }

    /// Whether the faction has ever seen the cell containing `world_pos`.
    /// Visible cells are always also Revealed, so this never needs a second
    /// plane lookup.
    pub fn is_revealed(&self, faction: FactionId, world_pos: Vec2) -> bool {
        self.query_bit(&self.revealed, faction, world_pos)
    }

    #[inline]
    fn query_bit(&self, plane: &BitPlane, faction: FactionId, world_pos: Vec2) -> bool {
        let Some(slot) = self.faction_slot(faction) else {
            return false;
        };
        let Some(cell) = self.grid.world_to_cell(world_pos) else {
            return false;
        };
        plane.get(self.base_bit(slot) + self.grid.cell_index(cell))
    }

    /// Fog state of one cell. Out-of-capacity factions read as Hidden.
    pub fn cell_state(&self, faction: FactionId, cell: UVec2) -> CellState {
        let Some(slot) = self.faction_slot(faction) else {
            return CellState::Hidden;
        };
        if cell.x >= self.grid.width || cell.y >= self.grid.height {
            return CellState::Hidden;
        }
        let bit = self.base_bit(slot) + self.grid.cell_index(cell);
        if self.visible.get(bit) {
            CellState::Visible
        } else if self.revealed.get(bit) {
            CellState::Revealed
        } else {
            CellState::Hidden
        }
    }

    /// Count a faction's cells by fog state as `(hidden, revealed, visible)`,
    /// where `revealed` excludes currently visible cells.
    pub fn count_by_state(&self, faction: FactionId) -> (usize, usize, usize) {
        let Some(slot) = self.faction_slot(faction) else {
            return (self.grid.cell_count(), 0, 0);
        };
        let cells = self.grid.cell_count();
        let base = self.base_bit(slot);
        let visible = self.visible.count_ones_range(base, cells);
        let ever_seen = self.revealed.count_ones_range(base, cells);
        (cells - ever_seen, ever_seen - visible, visible)
    }

    /// Reallocate the grid under new bounds or resolution.
    ///
    /// Old and new cell indices do not correspond to the same world
    /// locations, so Visible is always cleared and restamped on the next
    /// frame. With `clear_revealed` set, exploration history is dropped as
    /// well; otherwise each new cell samples the old Revealed plane at its
    /// center world position, preserving history where the rectangles
    /// overlap. Invalid dimensions leave the previous grid fully intact.
    pub fn rebuild(
        &mut self,
        world_min: Vec2,
        world_max: Vec2,
        cell_size: f32,
        clear_revealed: bool,
    ) -> Result<(), FogError> {
        let grid = GridDescriptor::new(world_min, world_max, cell_size)?;
        let cells = grid.cell_count();
        let bits = cells * self.max_factions as usize;

        let mut revealed = BitPlane::new(bits);
        if !clear_revealed {
            for slot in 0..self.max_factions as usize {
                let old_base = self.base_bit(slot);
                let new_base = slot * cells;
                for y in 0..grid.height {
                    for x in 0..grid.width {
                        let cell = UVec2::new(x, y);
                        let center = grid.cell_center_world(cell);
                        let Some(old_cell) = self.grid.world_to_cell(center) else {
                            continue;
                        };
                        if self.revealed.get(old_base + self.grid.cell_index(old_cell)) {
                            revealed.set(new_base + grid.cell_index(cell));
                        }
                    }
                }
            }
        }

        tracing::info!(
            target: "fog::engine",
            width = grid.width,
            height = grid.height,
            cell_size = grid.cell_size,
            clear_revealed,
            "fog.rebuilt"
        );

        self.grid = grid;
        self.visible = BitPlane::new(bits);
        self.revealed = revealed;
        self.frame = 0;
        Ok(())
    }

    pub(crate) fn revealed_plane(&self) -> &BitPlane {
        &self.revealed
    }

    pub(crate) fn restore_planes(&mut self, revealed: BitPlane, frame: u64) {
        debug_assert_eq!(revealed.len(), self.revealed.len());
        self.visible.clear_all();
        self.revealed = revealed;
        self.frame = frame;
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    use super::*;

    fn engine_10x10() -> FogEngine {
        let grid = GridDescriptor::new(Vec2::ZERO, Vec2::new(10.0, 10.0), 1.0).unwrap();
        FogEngine::with_grid(grid, 8).unwrap()
    }

    #[test]
    fn cell_state_byte_conversion() {
        assert_eq!(CellState::Hidden.as_u8(), 0);
        assert_eq!(CellState::Revealed.as_u8(), 1);
        assert_eq!(CellState::Visible.as_u8(), 2);

        assert_eq!(CellState::from_u8(0), CellState::Hidden);
        assert_eq!(CellState::from_u8(1), CellState::Revealed);
        assert_eq!(CellState::from_u8(2), CellState::Visible);
        assert_eq!(CellState::from_u8(255), CellState::Hidden);
    }

    #[test]
    fn visible_implies_revealed_everywhere() {
        let mut engine = engine_10x10();
        engine.begin_frame();
        engine.stamp(FactionId(0), Vec2::new(2.0, 2.0), 2.5).unwrap();
        engine.stamp(FactionId(3), Vec2::new(7.0, 7.0), 1.0).unwrap();
        engine.end_frame();

        for f in 0..8 {
            for x in 0..10 {
                for y in 0..10 {
                    let pos = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                    if engine.is_visible(FactionId(f), pos) {
                        assert!(engine.is_revealed(FactionId(f), pos));
                    }
                }
            }
        }
    }

    #[test]
    fn begin_frame_clears_visible_and_keeps_revealed() {
        let mut engine = engine_10x10();
        let a = FactionId(0);
        engine.begin_frame();
        engine.stamp(a, Vec2::new(1.0, 1.0), 0.5).unwrap();
        engine.end_frame();
        assert!(engine.is_visible(a, Vec2::new(1.0, 1.0)));
        assert!(engine.is_revealed(a, Vec2::new(1.0, 1.0)));

        // Next tick, the observer is gone.
        engine.begin_frame();
        engine.end_frame();
        assert!(!engine.is_visible(a, Vec2::new(1.0, 1.0)));
        assert!(engine.is_revealed(a, Vec2::new(1.0, 1.0)));
    }

    #[test]
    fn faction_planes_are_isolated() {
        let mut engine = engine_10x10();
        engine.begin_frame();
        engine.stamp(FactionId(0), Vec2::new(5.0, 5.0), 2.0).unwrap();
        engine.end_frame();

        let (hidden_b, revealed_b, visible_b) = engine.count_by_state(FactionId(1));
        assert_eq!(hidden_b, 100);
        assert_eq!(revealed_b, 0);
        assert_eq!(visible_b, 0);
        assert!(!engine.is_visible(FactionId(1), Vec2::new(5.0, 5.0)));
        assert!(!engine.is_revealed(FactionId(1), Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn stamp_rejects_out_of_capacity_faction() {
        let mut engine = engine_10x10();
        engine.begin_frame();
        let err = engine
            .stamp(FactionId(8), Vec2::new(5.0, 5.0), 2.0)
            .unwrap_err();
        assert!(matches!(err, FogError::UnknownFaction(FactionId(8))));
        engine.end_frame();
        // Queries with a bad id degrade to "sees nothing".
        assert!(!engine.is_visible(FactionId(8), Vec2::new(5.0, 5.0)));
        assert!(!engine.is_revealed(FactionId(200), Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn out_of_bounds_queries_are_false() {
        let mut engine = engine_10x10();
        engine.begin_frame();
        engine.stamp(FactionId(0), Vec2::new(0.5, 0.5), 5.0).unwrap();
        engine.end_frame();
        assert!(!engine.is_visible(FactionId(0), Vec2::new(-1.0, 0.5)));
        assert!(!engine.is_revealed(FactionId(0), Vec2::new(0.5, 11.0)));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let grid = GridDescriptor::new(Vec2::ZERO, Vec2::new(10.0, 10.0), 1.0).unwrap();
        assert!(matches!(
            FogEngine::with_grid(grid, 0),
            Err(FogError::ZeroFactionCapacity)
        ));
    }

    #[test]
    fn cell_state_reflects_both_planes() {
        let mut engine = engine_10x10();
        let a = FactionId(0);
        engine.begin_frame();
        engine.stamp(a, Vec2::new(2.5, 2.5), 1.0).unwrap();
        engine.end_frame();
        assert_eq!(engine.cell_state(a, UVec2::new(2, 2)), CellState::Visible);
        assert_eq!(engine.cell_state(a, UVec2::new(9, 9)), CellState::Hidden);

        engine.begin_frame();
        engine.end_frame();
        assert_eq!(engine.cell_state(a, UVec2::new(2, 2)), CellState::Revealed);
        assert_eq!(engine.cell_state(a, UVec2::new(50, 2)), CellState::Hidden);
    }

    #[test]
    fn rebuild_clear_drops_history() {
        let mut engine = engine_10x10();
        let a = FactionId(0);
        engine.begin_frame();
        engine.stamp(a, Vec2::new(5.0, 5.0), 2.0).unwrap();
        engine.end_frame();

        engine
            .rebuild(Vec2::ZERO, Vec2::new(10.0, 10.0), 1.0, true)
            .unwrap();
        assert!(!engine.is_revealed(a, Vec2::new(5.0, 5.0)));
        assert_eq!(engine.frame(), 0);
    }

    #[test]
    fn rebuild_preserve_reprojects_history_through_world_space() {
        let mut engine = engine_10x10();
        let a = FactionId(0);
        engine.begin_frame();
        engine.stamp(a, Vec2::new(5.0, 5.0), 2.0).unwrap();
        engine.end_frame();
        assert!(engine.is_revealed(a, Vec2::new(5.0, 5.0)));

        // Halve the resolution; world position (5, 5) still maps to a
        // previously-revealed region.
        engine
            .rebuild(Vec2::ZERO, Vec2::new(10.0, 10.0), 2.0, false)
            .unwrap();
        assert_eq!(engine.grid().width, 5);
        assert!(engine.is_revealed(a, Vec2::new(5.0, 5.0)));
        assert!(!engine.is_visible(a, Vec2::new(5.0, 5.0)));
        assert!(!engine.is_revealed(a, Vec2::new(9.5, 9.5)));
    }

    #[test]
    fn failed_rebuild_leaves_state_intact() {
        let mut engine = engine_10x10();
        let a = FactionId(0);
        engine.begin_frame();
        engine.stamp(a, Vec2::new(5.0, 5.0), 2.0).unwrap();
        engine.end_frame();

        let err = engine
            .rebuild(Vec2::ZERO, Vec2::new(10.0, 10.0), -1.0, true)
            .unwrap_err();
        assert!(matches!(err, FogError::Grid(GridError::InvalidCellSize(_))));
        assert!(engine.is_visible(a, Vec2::new(5.0, 5.0)));
        assert!(engine.is_revealed(a, Vec2::new(5.0, 5.0)));
        assert_eq!(engine.grid().width, 10);
        assert_eq!(engine.frame(), 1);
    }

    #[test]
    fn randomized_stamps_hold_invariants() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let mut engine = engine_10x10();
        let mut rng = SmallRng::seed_from_u64(0xF06);
        let mut revealed_history: Vec<(FactionId, Vec2)> = Vec::new();

        for _ in 0..50 {
            engine.begin_frame();
            for _ in 0..rng.gen_range(0..6) {
                let faction = FactionId(rng.gen_range(0..8));
                let pos = Vec2::new(rng.gen_range(-2.0..12.0), rng.gen_range(-2.0..12.0));
                let radius = rng.gen_range(-1.0..4.0);
                engine.stamp(faction, pos, radius).unwrap();
                if engine.grid().world_to_cell(pos).is_some() {
                    assert!(engine.is_visible(faction, pos));
                    revealed_history.push((faction, pos));
                }
            }
            engine.end_frame();

            // Monotonicity: everything ever revealed stays revealed.
            for (faction, pos) in &revealed_history {
                assert!(engine.is_revealed(*faction, *pos));
            }
        }
    }
}
