//! Drop-zone placement grid.
//!
//! Stack mode lays items out on a 3x3 horizontal grid centered on the drop
//! origin; every nine items the grid starts a new layer one step higher.
//! The mapping from placed-count to `(row, column, layer)` is a bijection,
//! so no two items are ever assigned the same cell.

use nalgebra::Vector3;

use graspers_core::config::DropZoneConfig;

/// Cells per grid side.
const GRID_SIDE: usize = 3;
/// Cells per layer.
const LAYER_CELLS: usize = GRID_SIDE * GRID_SIDE;

/// Placement geometry for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementGrid {
    origin: Vector3<f64>,
    cell_pitch: f64,
    layer_height: f64,
}

impl PlacementGrid {
    /// Build from the drop-zone configuration.
    #[must_use]
    pub fn from_config(config: &DropZoneConfig) -> Self {
        Self {
            origin: Vector3::new(config.origin[0], config.origin[1], config.origin[2]),
            cell_pitch: config.cell_pitch,
            layer_height: config.layer_height,
        }
    }

    /// Grid cell for the `n`-th placed item, as `(row, column, layer)`.
    #[must_use]
    pub const fn cell(placed_count: usize) -> (usize, usize, usize) {
        let index = placed_count % LAYER_CELLS;
        (index / GRID_SIDE, index % GRID_SIDE, placed_count / LAYER_CELLS)
    }

    /// World position of the `n`-th item's drop slot.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn slot(&self, placed_count: usize) -> Vector3<f64> {
        let (row, column, layer) = Self::cell(placed_count);
        self.origin
            + Vector3::new(
                (column as f64 - 1.0) * self.cell_pitch,
                (row as f64 - 1.0) * self.cell_pitch,
                layer as f64 * self.layer_height,
            )
    }

    /// Grid origin (the center cell of layer zero).
    #[must_use]
    pub const fn origin(&self) -> Vector3<f64> {
        self.origin
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
