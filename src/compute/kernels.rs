//! Reference position kernels.
//!
//! These are the host versions of `shaders/split_terrain.wgsl` and
//! `shaders/spawn_grass.wgsl`; both devices must agree on them.

use glam::Vec3;

use crate::grass::SpawnGrassParams;
use crate::grid::SplitTerrainParams;

/// Anchor for tile `(x, z)`: the tile center at ground level, measured from
/// the start corner.
pub fn tile_anchor(params: &SplitTerrainParams, x: u32, z: u32) -> Vec3 {
    let cx = (x as f32 + 0.5) * params.tile_size;
    let cz = (z as f32 + 0.5) * params.tile_size;

    // 1 = bottom-right, 2 = top-left, 3 = top-right; anything else is bottom-left
    let px = match params.start_corner {
        1 | 3 => params.terrain_width - cx,
        _ => cx,
    };
    let pz = match params.start_corner {
        2 | 3 => params.terrain_height - cz,
        _ => cz,
    };
    Vec3::new(px, 0.0, pz)
}

/// Position of blade `(bx, bz)` inside tile `(x, z)`, or `Vec3::ZERO` when culled.
///
/// A blade sits at the center of its sub-cell. It is culled when it falls
/// outside the terrain (overhanging tiles) or beyond `max_distance` from
/// the camera. Blade centers are never exactly at the origin, so zero is an
/// unambiguous marker.
pub fn blade_position(params: &SpawnGrassParams, x: u32, z: u32, bx: u32, bz: u32) -> Vec3 {
    let px = x as f32 * params.tile_size + (bx as f32 + 0.5) * params.grass_blade_size;
    let pz = z as f32 * params.tile_size + (bz as f32 + 0.5) * params.grass_blade_size;
    let position = Vec3::new(px, 0.0, pz);

    let outside = px > params.terrain_width || pz > params.terrain_height;
    let camera = Vec3::from_array(params.camera_position);
    if outside || position.distance(camera) > params.max_distance {
        return Vec3::ZERO;
    }
    position
}

/// Whether a slot written by [`blade_position`] was culled.
pub fn is_culled(position: Vec3) -> bool {
    position == Vec3::ZERO
}
