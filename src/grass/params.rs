//! GPU-ready grass kernel uniform (48 bytes, 16-byte aligned).

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::grid::TileGrid;

/// Uniform for the grass kernel. Must match `SpawnGrassParams` in spawn_grass.wgsl.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SpawnGrassParams {
    pub camera_position: [f32; 3],
    pub grass_blade_size: f32,
    // -- 16 bytes --
    pub terrain_width: f32,
    pub terrain_height: f32,
    pub tile_size: f32,
    pub max_distance: f32,
    // -- 16 bytes --
    pub columns: u32,
    pub rows: u32,
    pub blades_per_side: u32,
    pub _pad: u32,
    // -- 16 bytes --
    // Total: 48 bytes
}

impl SpawnGrassParams {
    pub fn new(
        grid: &TileGrid,
        blade_size: f32,
        blades_per_side: u32,
        camera_position: Vec3,
        max_distance: f32,
    ) -> Self {
        let extent = grid.extent();
        Self {
            camera_position: camera_position.to_array(),
            grass_blade_size: blade_size,
            terrain_width: extent.width,
            terrain_height: extent.height,
            tile_size: grid.tile_size(),
            max_distance,
            columns: grid.columns(),
            rows: grid.rows(),
            blades_per_side,
            _pad: 0,
        }
    }
}
