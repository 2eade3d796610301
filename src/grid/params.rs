//! GPU-ready split kernel uniform (32 bytes, 16-byte aligned).

use bytemuck::{Pod, Zeroable};

/// Uniform for the split kernel. Must match `SplitTerrainParams` in split_terrain.wgsl.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SplitTerrainParams {
    pub terrain_width: f32,
    pub terrain_height: f32,
    pub tile_size: f32,
    pub start_corner: u32,
    // -- 16 bytes --
    pub columns: u32,
    pub rows: u32,
    pub _pad: [u32; 2],
    // -- 16 bytes --
    // Total: 32 bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_params_size() {
        assert_eq!(std::mem::size_of::<SplitTerrainParams>(), 32);
        assert_eq!(std::mem::size_of::<SplitTerrainParams>() % 16, 0);
    }

    #[test]
    fn test_bytemuck_cast() {
        let p = SplitTerrainParams::zeroed();
        assert_eq!(bytemuck::bytes_of(&p).len(), 32);
    }
}
