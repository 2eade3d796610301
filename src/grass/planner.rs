//! Grass blade planning.

use std::ops::Deref;

use glam::Vec3;
use serde::Serialize;

use super::{GrassConfig, SpawnGrassParams};
use crate::compute::kernels::is_culled;
use crate::compute::{ComputeDevice, KernelDispatch, run_kernel};
use crate::core::{Error, Result};
use crate::grid::TileGrid;

/// Candidate blade positions, one `blades_per_side^2` block per tile.
///
/// Tiles are row-major and blades within a tile are row-major, so blade
/// `(bx, bz)` of tile `(x, z)` lives at `((z * columns + x) * n + bz) * n + bx`.
/// Culled slots hold `Vec3::ZERO`; the sequence length never shrinks.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GrassPositions {
    columns: u32,
    rows: u32,
    blades_per_side: u32,
    positions: Box<[Vec3]>,
}

impl GrassPositions {
    fn empty(grid: &TileGrid) -> Self {
        Self {
            columns: grid.columns(),
            rows: grid.rows(),
            ..Self::default()
        }
    }

    pub fn blades_per_side(&self) -> u32 {
        self.blades_per_side
    }

    pub fn blades_per_tile(&self) -> usize {
        self.blades_per_side as usize * self.blades_per_side as usize
    }

    pub fn as_slice(&self) -> &[Vec3] {
        &self.positions
    }

    /// Blade slots of tile `(x, z)`.
    pub fn tile(&self, x: u32, z: u32) -> Option<&[Vec3]> {
        if x >= self.columns || z >= self.rows {
            return None;
        }
        let per_tile = self.blades_per_tile();
        let start = (z as usize * self.columns as usize + x as usize) * per_tile;
        self.positions.get(start..start + per_tile)
    }

    /// Slots that survived culling.
    pub fn visible(&self) -> impl Iterator<Item = &Vec3> + '_ {
        self.positions.iter().filter(|p| !is_culled(**p))
    }

    pub fn visible_count(&self) -> usize {
        self.visible().count()
    }
}

impl Deref for GrassPositions {
    type Target = [Vec3];

    fn deref(&self) -> &[Vec3] {
        &self.positions
    }
}

/// Scatters grass blade candidates over an existing tile grid.
pub struct GrassScatterPlanner<'a, D: ComputeDevice> {
    device: &'a D,
    config: GrassConfig,
}

impl<'a, D: ComputeDevice> GrassScatterPlanner<'a, D> {
    pub fn new(device: &'a D, config: GrassConfig) -> Self {
        Self { device, config }
    }

    pub fn config(&self) -> &GrassConfig {
        &self.config
    }

    /// Compute blade candidates for every tile of `grid` as seen from `viewpoint`.
    ///
    /// A blade size larger than the tile size yields an empty result.
    pub fn compute_grass_positions(&self, grid: &TileGrid, viewpoint: Vec3) -> Result<GrassPositions> {
        let blades_per_side = grid.blades_per_side(self.config.blade_size)?;
        grid.blade_count(blades_per_side)?;
        let max_distance = self.config.max_distance;
        if !max_distance.is_finite() || max_distance < 0.0 {
            return Err(Error::DegenerateGrid(format!(
                "grass max distance must be finite and non-negative, got {}",
                max_distance
            )));
        }
        if !viewpoint.is_finite() {
            return Err(Error::Configuration(format!("viewpoint {} is not finite", viewpoint)));
        }

        if blades_per_side == 0 {
            log::warn!(
                "Grass blade size {} exceeds tile size {}, no blades placed",
                self.config.blade_size,
                grid.tile_size()
            );
            return Ok(GrassPositions::empty(grid));
        }

        let params = SpawnGrassParams::new(grid, self.config.blade_size, blades_per_side, viewpoint, max_distance);
        let positions = run_kernel(self.device, &KernelDispatch::SpawnGrass(params))?;

        let grass = GrassPositions {
            columns: grid.columns(),
            rows: grid.rows(),
            blades_per_side,
            positions,
        };
        log::info!(
            "Scattered {} grass blade slots ({} per tile, {} visible from {})",
            grass.len(),
            grass.blades_per_tile(),
            grass.visible_count(),
            viewpoint
        );
        Ok(grass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::CpuDevice;
    use crate::compute::testing::CountingDevice;
    use crate::grid::StartCorner;
    use crate::terrain::TerrainExtent;

    fn grid(tile_size: f32) -> TileGrid {
        TileGrid::new(TerrainExtent::new(95.0, 42.0), tile_size, StartCorner::BottomLeft).unwrap()
    }

    fn config(blade_size: f32) -> GrassConfig {
        GrassConfig {
            blade_size,
            max_distance: 1000.0,
        }
    }

    #[test]
    fn test_example_count() {
        let device = CpuDevice::new();
        let grass = GrassScatterPlanner::new(&device, config(1.0))
            .compute_grass_positions(&grid(10.0), Vec3::ZERO)
            .unwrap();
        assert_eq!(grass.blades_per_side(), 10);
        assert_eq!(grass.len(), 5000);
    }

    #[test]
    fn test_count_formula() {
        let device = CpuDevice::new();
        for (tile, blade) in [(10.0, 3.0), (7.5, 0.5), (4.0, 3.9)] {
            let g = grid(tile);
            let grass = GrassScatterPlanner::new(&device, config(blade))
                .compute_grass_positions(&g, Vec3::ZERO)
                .unwrap();
            let n = (tile / blade).floor() as usize;
            assert_eq!(grass.len(), g.tile_count() * n * n);
        }
    }

    #[test]
    fn test_blade_larger_than_tile_is_empty() {
        let device = CountingDevice::new();
        let grass = GrassScatterPlanner::new(&device, config(12.0))
            .compute_grass_positions(&grid(10.0), Vec3::ZERO)
            .unwrap();
        assert!(grass.is_empty());
        assert_eq!(grass.blades_per_side(), 0);
        assert_eq!(grass.tile(0, 0), Some(&[][..]));
        assert_eq!(device.acquired(), 0);
    }

    #[test]
    fn test_degenerate_blade_size() {
        let device = CountingDevice::new();
        for blade in [0.0, -1.0, f32::NAN] {
            let result = GrassScatterPlanner::new(&device, config(blade))
                .compute_grass_positions(&grid(10.0), Vec3::ZERO);
            assert!(matches!(result, Err(Error::DegenerateGrid(_))));
        }
        assert_eq!(device.acquired(), 0);
    }

    #[test]
    fn test_tiny_blade_size_rejected() {
        let device = CountingDevice::new();
        // 1e-9 overflows blades per side, 1e-8 overflows the total slot count
        for blade in [1e-9, 1e-8] {
            let result = GrassScatterPlanner::new(&device, config(blade))
                .compute_grass_positions(&grid(10.0), Vec3::ZERO);
            assert!(matches!(result, Err(Error::DegenerateGrid(_))));
        }
        assert_eq!(device.acquired(), 0);
    }

    #[test]
    fn test_unallocatable_grass_is_an_error() {
        // 50 tiles * 100_000^2 blades is far beyond the cpu device cap
        let device = CpuDevice::new();
        let result = GrassScatterPlanner::new(&device, config(1e-4))
            .compute_grass_positions(&grid(10.0), Vec3::ZERO);
        assert!(matches!(result, Err(Error::Compute(_))));
    }

    #[test]
    fn test_invalid_max_distance() {
        let device = CpuDevice::new();
        let planner = GrassScatterPlanner::new(&device, GrassConfig { blade_size: 1.0, max_distance: -5.0 });
        assert!(matches!(
            planner.compute_grass_positions(&grid(10.0), Vec3::ZERO),
            Err(Error::DegenerateGrid(_))
        ));
    }

    #[test]
    fn test_invalid_viewpoint() {
        let device = CpuDevice::new();
        let result = GrassScatterPlanner::new(&device, config(1.0))
            .compute_grass_positions(&grid(10.0), Vec3::new(f32::NAN, 0.0, 0.0));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_viewpoint_culls_without_changing_length() {
        let device = CpuDevice::new();
        let planner = GrassScatterPlanner::new(&device, GrassConfig { blade_size: 1.0, max_distance: 15.0 });
        let near = planner.compute_grass_positions(&grid(10.0), Vec3::new(5.0, 0.0, 5.0)).unwrap();
        let far = planner.compute_grass_positions(&grid(10.0), Vec3::new(500.0, 0.0, 500.0)).unwrap();

        assert_eq!(near.len(), far.len());
        assert!(near.visible_count() > 0);
        assert!(near.visible_count() < near.len());
        assert_eq!(far.visible_count(), 0);
    }

    #[test]
    fn test_overhang_culled() {
        let device = CpuDevice::new();
        let grass = GrassScatterPlanner::new(&device, config(1.0))
            .compute_grass_positions(&grid(10.0), Vec3::ZERO)
            .unwrap();
        // 95 x 42 terrain covers 95 * 42 unit cells of the 100 x 50 grid
        assert_eq!(grass.visible_count(), 95 * 42);
    }

    #[test]
    fn test_tile_slice() {
        let device = CpuDevice::new();
        let grass = GrassScatterPlanner::new(&device, config(2.5))
            .compute_grass_positions(&grid(10.0), Vec3::ZERO)
            .unwrap();
        let tile = grass.tile(1, 2).unwrap();
        assert_eq!(tile.len(), 16);
        assert_eq!(tile[0], Vec3::new(11.25, 0.0, 21.25));
        assert!(grass.tile(10, 0).is_none());
    }

    #[test]
    fn test_buffers_released() {
        let device = CountingDevice::new();
        GrassScatterPlanner::new(&device, config(1.0))
            .compute_grass_positions(&grid(10.0), Vec3::ZERO)
            .unwrap();
        assert_eq!(device.acquired(), 1);
        assert_eq!(device.live(), 0);
    }
}
