//! Affine mapping between planar world coordinates and integer grid cells.
//!
//! The fog grid discretizes a world-space rectangle `[world_min, world_max)`
//! into square cells of `cell_size` world units. Cell coordinates are
//! row-major: cell `(x, y)` flattens to index `y * width + x`.

use bevy_math::{UVec2, Vec2};
use thiserror::Error;

/// Error raised when grid dimensions cannot be derived from a configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("cell size must be a positive finite number, got {0}")]
    InvalidCellSize(f32),
    #[error("world bounds {min:?}..{max:?} produce an empty grid")]
    EmptyBounds { min: Vec2, max: Vec2 },
}

/// Immutable description of one grid allocation.
///
/// `width` and `height` are derived once at construction:
/// `width = ceil((world_max.x - world_min.x) / cell_size)`, analogous for
/// height. A [`GridDescriptor`] never changes after construction; resizing
/// the fog grid allocates a fresh descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDescriptor {
    pub world_min: Vec2,
    pub world_max: Vec2,
    pub cell_size: f32,
    pub width: u32,
    pub height: u32,
}

impl GridDescriptor {
    pub fn new(world_min: Vec2, world_max: Vec2, cell_size: f32) -> Result<Self, GridError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GridError::InvalidCellSize(cell_size));
        }

        let span = world_max - world_min;
        let width = (span.x / cell_size).ceil();
        let height = (span.y / cell_size).ceil();
        if !width.is_finite() || !height.is_finite() || width < 1.0 || height < 1.0 {
            return Err(GridError::EmptyBounds {
                min: world_min,
                max: world_max,
            });
        }

        Ok(Self {
            world_min,
            world_max,
            cell_size,
            width: width as u32,
            height: height as u32,
        })
    }

    /// Map a world position to its containing cell, or `None` when the
    /// position falls outside `[0, width) x [0, height)`.
    #[inline]
    pub fn world_to_cell(&self, pos: Vec2) -> Option<UVec2> {
        let g = self.world_to_cell_f32(pos);
        let x = g.x.floor();
        let y = g.y.floor();
        if x < 0.0 || y < 0.0 || x >= self.width as f32 || y >= self.height as f32 {
            None
        } else {
            Some(UVec2::new(x as u32, y as u32))
        }
    }

    /// Continuous grid-space coordinates of a world position. Used by the
    /// stamp rasterizer, which needs sub-cell precision for its circle test.
    #[inline]
    pub fn world_to_cell_f32(&self, pos: Vec2) -> Vec2 {
        (pos - self.world_min) / self.cell_size
    }

    /// World position of a cell's center.
    #[inline]
    pub fn cell_center_world(&self, cell: UVec2) -> Vec2 {
        self.world_min + (cell.as_vec2() + Vec2::splat(0.5)) * self.cell_size
    }

    /// Row-major flat index of a cell. Callers must pass an in-bounds cell.
    #[inline]
    pub fn cell_index(&self, cell: UVec2) -> usize {
        debug_assert!(cell.x < self.width && cell.y < self.height);
        (cell.y * self.width + cell.x) as usize
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
