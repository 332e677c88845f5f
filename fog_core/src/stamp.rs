//! Rasterization of one observer's circular footprint into the bit planes.
//!
//! The rasterizer works entirely in grid space: the observer position maps
//! to continuous cell coordinates, the radius converts to cell units, and a
//! clamped axis-aligned bounding box is scanned with a squared-distance test
//! against each candidate cell's center. No square roots on the hot path.

use bevy_math::Vec2;

use crate::{grid::GridDescriptor, plane::BitPlane};

/// Minimum effective stamp radius in world units. A zero or negative radius
/// still reveals the observer's own cell.
pub(crate) const RADIUS_EPSILON: f32 = 1e-3;

/// Stamp one footprint for the faction sub-plane starting at `base_bit`,
/// setting the Visible and Revealed bit of every accepted cell in the same
/// pass. A footprint entirely outside the grid clips down to a no-op.
pub(crate) fn stamp_footprint(
    grid: &GridDescriptor,
    visible: &mut BitPlane,
    revealed: &mut BitPlane,
    base_bit: usize,
    world_pos: Vec2,
    radius: f32,
) -> usize {
    let g = grid.world_to_cell_f32(world_pos);
    let r = radius.max(RADIUS_EPSILON) / grid.cell_size;
    let r_sq = r * r;

    let mut stamped = 0usize;

    // The containing cell is always revealed, even when the radius is too
    // small for any cell center to pass the circle test.
    if let Some(cell) = grid.world_to_cell(world_pos) {
        let bit = base_bit + grid.cell_index(cell);
        visible.set(bit);
        revealed.set(bit);
        stamped += 1;
    }

    let lo_x = (g.x - r).floor().max(0.0);
    let hi_x = (g.x + r).ceil().min(grid.width as f32 - 1.0);
    let lo_y = (g.y - r).floor().max(0.0);
    let hi_y = (g.y + r).ceil().min(grid.height as f32 - 1.0);
    if lo_x > hi_x || lo_y > hi_y {
        return stamped;
    }
    let (lo_x, hi_x) = (lo_x as u32, hi_x as u32);
    let (lo_y, hi_y) = (lo_y as u32, hi_y as u32);

    for y in lo_y..=hi_y {
        let dy = (y as f32 + 0.5) - g.y;
        let dy_sq = dy * dy;
        let row_bit = base_bit + (y * grid.width) as usize;
        for x in lo_x..=hi_x {
            let dx = (x as f32 + 0.5) - g.x;
            if dx * dx + dy_sq <= r_sq {
                let bit = row_bit + x as usize;
                visible.set(bit);
                revealed.set(bit);
                stamped += 1;
            }
        }
    }

    stamped
}
