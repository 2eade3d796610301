//! Terrain sources queried once at startup for their horizontal extent.

pub mod extent;

pub use extent::{TerrainExtent, TerrainSource};
