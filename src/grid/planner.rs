//! Tile anchor planning.

use std::ops::Deref;

use glam::Vec3;
use serde::Serialize;

use super::{GridConfig, TileGrid};
use crate::compute::{ComputeDevice, KernelDispatch, run_kernel};
use crate::core::{Error, Result};
use crate::terrain::TerrainSource;

/// One anchor per tile, row-major (`z * columns + x`). Immutable.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TilePositions(Box<[Vec3]>);

impl TilePositions {
    pub fn as_slice(&self) -> &[Vec3] {
        &self.0
    }
}

impl Deref for TilePositions {
    type Target = [Vec3];

    fn deref(&self) -> &[Vec3] {
        &self.0
    }
}

/// Grid plus the anchors computed for it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TileLayout {
    grid: TileGrid,
    positions: TilePositions,
}

impl TileLayout {
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn positions(&self) -> &TilePositions {
        &self.positions
    }

    /// Anchor of tile `(x, z)`.
    pub fn anchor(&self, x: u32, z: u32) -> Option<Vec3> {
        self.grid.tile_index(x, z).map(|i| self.positions[i])
    }
}

/// Splits a terrain into tiles and places their anchors on a compute device.
pub struct GridPlanner<'a, D: ComputeDevice> {
    device: &'a D,
    config: GridConfig,
    terrain: Option<&'a dyn TerrainSource>,
}

impl<'a, D: ComputeDevice> GridPlanner<'a, D> {
    pub fn new(device: &'a D, config: GridConfig) -> Self {
        Self {
            device,
            config,
            terrain: None,
        }
    }

    /// Attach the terrain to split.
    pub fn with_terrain(mut self, terrain: &'a dyn TerrainSource) -> Self {
        self.terrain = Some(terrain);
        self
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Compute the tile grid and one anchor per tile.
    ///
    /// Blocks until the anchors are in host memory. The device buffer is
    /// released before returning, on success and on error.
    pub fn compute_grid(&self) -> Result<TileLayout> {
        let Some(terrain) = self.terrain else {
            log::error!("Terrain is not assigned");
            return Err(Error::Configuration("terrain is not assigned".into()));
        };

        let extent = terrain.extent();
        let grid = TileGrid::new(extent, self.config.tile_size, self.config.start_corner)?;
        let positions = run_kernel(self.device, &KernelDispatch::SplitTerrain(grid.split_params()))?;

        log::info!(
            "Split {} x {} terrain into {} x {} tiles of {}m ({:?})",
            extent.width,
            extent.height,
            grid.columns(),
            grid.rows(),
            grid.tile_size(),
            grid.start_corner()
        );

        Ok(TileLayout {
            grid,
            positions: TilePositions(positions),
        })
    }
}
