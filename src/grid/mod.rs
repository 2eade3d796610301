//! Uniform tile grid over a terrain.
//!
//! `TileGrid` holds the integer grid derived from a terrain extent and a tile
//! size. `GridPlanner` dispatches the split kernel over that grid to place
//! one anchor per tile.

pub mod config;
pub mod corner;
pub mod params;
pub mod planner;

pub use config::GridConfig;
pub use corner::StartCorner;
pub use params::SplitTerrainParams;
pub use planner::{GridPlanner, TileLayout, TilePositions};

use serde::Serialize;

use crate::core::{Error, Result};
use crate::terrain::TerrainExtent;

/// Reject zero, negative and non-finite sizes.
pub(crate) fn require_positive(name: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::DegenerateGrid(format!(
            "{} must be a positive finite number, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Tiles needed to cover `length`; any positive length gets at least one.
fn tiles_along(length: f32, tile_size: f32) -> f32 {
    let tiles = (length / tile_size).ceil();
    if length > 0.0 { tiles.max(1.0) } else { tiles }
}

/// Tile grid covering a terrain: `columns x rows` squares of `tile_size`.
///
/// The last column and row overhang the terrain when its size is not a
/// multiple of the tile size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TileGrid {
    extent: TerrainExtent,
    tile_size: f32,
    columns: u32,
    rows: u32,
    start_corner: StartCorner,
}

impl TileGrid {
    /// Compute the grid for a terrain extent.
    ///
    /// `columns = ceil(width / tile_size)`, `rows = ceil(height / tile_size)`.
    pub fn new(extent: TerrainExtent, tile_size: f32, start_corner: StartCorner) -> Result<Self> {
        require_positive("tile size", tile_size)?;
        extent.validate()?;

        let columns = tiles_along(extent.width, tile_size);
        let rows = tiles_along(extent.height, tile_size);
        if columns > u32::MAX as f32 || rows > u32::MAX as f32 {
            return Err(Error::DegenerateGrid(format!(
                "tile size {} is too small for a {} x {} terrain",
                tile_size, extent.width, extent.height
            )));
        }

        let grid = Self {
            extent,
            tile_size,
            columns: columns as u32,
            rows: rows as u32,
            start_corner,
        };
        if grid.checked_tile_count().is_none() {
            return Err(Error::DegenerateGrid(format!(
                "{} x {} tiles do not fit in memory",
                grid.columns, grid.rows
            )));
        }
        Ok(grid)
    }

    pub fn extent(&self) -> TerrainExtent {
        self.extent
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn start_corner(&self) -> StartCorner {
        self.start_corner
    }

    fn checked_tile_count(&self) -> Option<usize> {
        (self.columns as usize).checked_mul(self.rows as usize)
    }

    /// Total number of tiles (`columns * rows`).
    pub fn tile_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    pub fn is_empty(&self) -> bool {
        self.tile_count() == 0
    }

    /// Kernel dispatch size: one invocation per tile.
    pub fn dispatch_size(&self) -> [u32; 3] {
        [self.columns, self.rows, 1]
    }

    /// World-space size actually covered by tiles, including overhang.
    pub fn covered_extent(&self) -> TerrainExtent {
        TerrainExtent::new(
            self.columns as f32 * self.tile_size,
            self.rows as f32 * self.tile_size,
        )
    }

    /// Row-major index of tile `(x, z)`, or `None` outside the grid.
    pub fn tile_index(&self, x: u32, z: u32) -> Option<usize> {
        (x < self.columns && z < self.rows)
            .then(|| z as usize * self.columns as usize + x as usize)
    }

    /// Blade cells along each side of a tile: `floor(tile_size / blade_size)`.
    pub fn blades_per_side(&self, blade_size: f32) -> Result<u32> {
        require_positive("grass blade size", blade_size)?;
        let per_side = (self.tile_size / blade_size).floor();
        if per_side > u32::MAX as f32 {
            return Err(Error::DegenerateGrid(format!(
                "grass blade size {} is too small for {}m tiles",
                blade_size, self.tile_size
            )));
        }
        Ok(per_side as u32)
    }

    /// Blade slots for the whole grid: `tile_count * blades_per_side^2`.
    pub fn blade_count(&self, blades_per_side: u32) -> Result<usize> {
        let per_side = blades_per_side as usize;
        self.tile_count()
            .checked_mul(per_side)
            .and_then(|n| n.checked_mul(per_side))
            .ok_or_else(|| {
                Error::DegenerateGrid(format!(
                    "{} tiles with {} x {} blades do not fit in memory",
                    self.tile_count(),
                    blades_per_side,
                    blades_per_side
                ))
            })
    }

    /// Parameters for the split kernel.
    pub fn split_params(&self) -> SplitTerrainParams {
        SplitTerrainParams {
            terrain_width: self.extent.width,
            terrain_height: self.extent.height,
            tile_size: self.tile_size,
            start_corner: self.start_corner.index(),
            columns: self.columns,
            rows: self.rows,
            _pad: [0; 2],
        }
    }
}
