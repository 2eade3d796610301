//! JSON configuration for a split run.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::SplitterSettings;
use crate::core::{Error, Result};
use crate::grass::GrassConfig;
use crate::grid::{GridConfig, TileGrid};
use crate::terrain::TerrainExtent;

/// Compute backend to run the kernels on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    Cpu,
    Gpu,
}

impl std::str::FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cpu" => Ok(Backend::Cpu),
            "gpu" => Ok(Backend::Gpu),
            other => Err(Error::Configuration(format!("unknown backend '{}', expected cpu or gpu", other))),
        }
    }
}

/// On-disk description of a split run.
///
/// ```json
/// {
///   "terrain": { "width": 95.0, "height": 42.0 },
///   "grid": { "tile_size": 10.0, "start_corner": "bottom_left" },
///   "grass": { "blade_size": 1.0, "max_distance": 80.0 },
///   "camera_position": [50.0, 10.0, 20.0]
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterConfig {
    /// Terrain to split. Required.
    pub terrain: Option<TerrainExtent>,
    pub grid: GridConfig,
    /// Grass is skipped when absent.
    pub grass: Option<GrassConfig>,
    /// Required when `grass` is set.
    pub camera_position: Option<Vec3>,
    pub backend: Backend,
}

impl SplitterConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = Self::from_json(&std::fs::read_to_string(path)?)?;
        log::debug!("Loaded splitter config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Check everything that can be checked without a device.
    pub fn validate(&self) -> Result<()> {
        let terrain = self
            .terrain
            .ok_or_else(|| Error::Configuration("terrain is not assigned".into()))?;
        let grid = TileGrid::new(terrain, self.grid.tile_size, self.grid.start_corner)?;

        if let Some(grass) = &self.grass {
            grid.blade_count(grid.blades_per_side(grass.blade_size)?)?;
            if self.camera_position.is_none() {
                return Err(Error::Configuration("grass needs a camera_position".into()));
            }
        }
        Ok(())
    }

    pub fn settings(&self) -> SplitterSettings {
        SplitterSettings {
            grid: self.grid,
            grass: self.grass,
        }
    }
}
