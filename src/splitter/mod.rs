//! One-shot startup orchestration: tiles first, then grass.

pub mod config;

pub use config::{Backend, SplitterConfig};

use glam::Vec3;
use serde::Serialize;

use crate::compute::ComputeDevice;
use crate::core::{Error, Result};
use crate::grass::{GrassConfig, GrassPositions, GrassScatterPlanner};
use crate::grid::{GridConfig, GridPlanner, TileLayout};
use crate::terrain::TerrainSource;

/// What to plan.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SplitterSettings {
    pub grid: GridConfig,
    /// Grass is skipped when `None`.
    pub grass: Option<GrassConfig>,
}

/// Everything one split produced.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SplitResult {
    pub tiles: TileLayout,
    pub grass: Option<GrassPositions>,
}

/// Splits a terrain into tiles and optionally scatters grass over them.
///
/// Either every requested position set is produced or the call fails with
/// nothing.
pub struct TerrainSplitter<'a> {
    settings: SplitterSettings,
    terrain: Option<&'a dyn TerrainSource>,
    viewpoint: Option<Vec3>,
}

impl<'a> TerrainSplitter<'a> {
    pub fn new(settings: SplitterSettings) -> Self {
        Self {
            settings,
            terrain: None,
            viewpoint: None,
        }
    }

    pub fn with_terrain(mut self, terrain: &'a dyn TerrainSource) -> Self {
        self.terrain = Some(terrain);
        self
    }

    /// Camera position the grass kernel culls against.
    pub fn with_viewpoint(mut self, viewpoint: Vec3) -> Self {
        self.viewpoint = Some(viewpoint);
        self
    }

    pub fn settings(&self) -> &SplitterSettings {
        &self.settings
    }

    /// Run the planners on `device`.
    ///
    /// Missing collaborators are reported before any device work starts.
    pub fn split<D: ComputeDevice>(&self, device: &D) -> Result<SplitResult> {
        let Some(terrain) = self.terrain else {
            log::error!("Terrain is not assigned");
            return Err(Error::Configuration("terrain is not assigned".into()));
        };
        let grass_job = match (self.settings.grass, self.viewpoint) {
            (Some(config), Some(viewpoint)) => Some((config, viewpoint)),
            (Some(_), None) => {
                log::error!("Viewpoint is not assigned");
                return Err(Error::Configuration("grass needs a viewpoint".into()));
            }
            (None, _) => None,
        };

        let tiles = GridPlanner::new(device, self.settings.grid)
            .with_terrain(terrain)
            .compute_grid()?;

        let grass = match grass_job {
            Some((config, viewpoint)) => Some(
                GrassScatterPlanner::new(device, config).compute_grass_positions(tiles.grid(), viewpoint)?,
            ),
            None => None,
        };

        Ok(SplitResult { tiles, grass })
    }
}
