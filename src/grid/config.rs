//! Grid planner settings.

use serde::{Deserialize, Serialize};

use super::StartCorner;

/// User-facing tiling settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Side length of one square tile in meters.
    pub tile_size: f32,
    /// Corner the anchors are measured from.
    pub start_corner: StartCorner,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tile_size: 10.0,
            start_corner: StartCorner::BottomLeft,
        }
    }
}
