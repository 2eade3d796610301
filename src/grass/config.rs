//! Grass scatter configuration.

use serde::{Deserialize, Serialize};

/// User-facing grass settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrassConfig {
    /// Side length of one blade cell; each tile holds
    /// `floor(tile_size / blade_size)` cells per side.
    pub blade_size: f32,
    /// Blades farther than this from the viewpoint are culled.
    pub max_distance: f32,
}

impl Default for GrassConfig {
    fn default() -> Self {
        Self {
            blade_size: 1.0,
            max_distance: 80.0,
        }
    }
}
