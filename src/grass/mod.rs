//! Grass blade scatter within terrain tiles.
//!
//! Every tile is divided into `blades_per_side x blades_per_side` cells and
//! the grass kernel places one candidate blade per cell, culling blades the
//! viewpoint cannot use.

pub mod config;
pub mod params;
pub mod planner;

pub use config::GrassConfig;
pub use params::SpawnGrassParams;
pub use planner::{GrassPositions, GrassScatterPlanner};
