//! CPU device running the reference kernels with rayon.

use glam::Vec3;
use rayon::prelude::*;

use super::kernels::{blade_position, tile_anchor};
use super::{ComputeDevice, KernelDispatch, KernelKind};
use crate::core::{Error, Result};

/// Host-memory position buffer.
#[derive(Debug)]
pub struct CpuBuffer {
    kind: KernelKind,
    data: Vec<Vec3>,
}

/// Default cap on positions per buffer (3 GiB of `Vec3`).
pub const DEFAULT_MAX_POSITIONS: usize = 1 << 28;

/// Runs position kernels on the thread pool.
#[derive(Clone, Copy, Debug)]
pub struct CpuDevice {
    max_positions: usize,
}

impl CpuDevice {
    pub fn new() -> Self {
        Self::with_max_positions(DEFAULT_MAX_POSITIONS)
    }

    /// Device that refuses buffers larger than `max_positions`.
    pub fn with_max_positions(max_positions: usize) -> Self {
        Self { max_positions }
    }

    pub fn max_positions(&self) -> usize {
        self.max_positions
    }
}

impl Default for CpuDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeDevice for CpuDevice {
    type Buffer = CpuBuffer;

    fn name(&self) -> &str {
        "cpu"
    }

    fn acquire(&self, kind: KernelKind, len: usize) -> Result<CpuBuffer> {
        if len > self.max_positions {
            return Err(Error::Compute(format!(
                "{} needs {} positions, cpu device allows {}",
                kind.output_name(),
                len,
                self.max_positions
            )));
        }

        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|e| {
            Error::Compute(format!("failed to allocate {} positions for {}: {}", len, kind.output_name(), e))
        })?;
        data.resize(len, Vec3::ZERO);
        Ok(CpuBuffer { kind, data })
    }

    fn dispatch(&self, dispatch: &KernelDispatch, output: &mut CpuBuffer) -> Result<()> {
        if output.kind != dispatch.kind() || output.data.len() != dispatch.output_len() {
            return Err(Error::Compute(format!(
                "{} needs {} positions, buffer holds {}",
                dispatch.kind().entry_point(),
                dispatch.output_len(),
                output.data.len()
            )));
        }
        if output.data.is_empty() {
            return Ok(());
        }

        match dispatch {
            KernelDispatch::SplitTerrain(params) => {
                let columns = params.columns as usize;
                output
                    .data
                    .par_chunks_mut(columns)
                    .enumerate()
                    .for_each(|(z, row)| {
                        for (x, slot) in row.iter_mut().enumerate() {
                            *slot = tile_anchor(params, x as u32, z as u32);
                        }
                    });
            }
            KernelDispatch::SpawnGrass(params) => {
                let columns = params.columns as usize;
                let per_side = params.blades_per_side as usize;
                output
                    .data
                    .par_chunks_mut(per_side * per_side)
                    .enumerate()
                    .for_each(|(tile, blades)| {
                        let x = (tile % columns) as u32;
                        let z = (tile / columns) as u32;
                        for (i, slot) in blades.iter_mut().enumerate() {
                            let bx = (i % per_side) as u32;
                            let bz = (i / per_side) as u32;
                            *slot = blade_position(params, x, z, bx, bz);
                        }
                    });
            }
        }
        Ok(())
    }

    fn read_back(&self, buffer: &CpuBuffer) -> Result<Vec<Vec3>> {
        Ok(buffer.data.clone())
    }

    fn release(&self, buffer: &mut CpuBuffer) {
        buffer.data = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grass::SpawnGrassParams;
    use crate::grid::{StartCorner, TileGrid};
    use crate::terrain::TerrainExtent;

    fn grid() -> TileGrid {
        TileGrid::new(TerrainExtent::new(95.0, 42.0), 10.0, StartCorner::BottomLeft).unwrap()
    }

    #[test]
    fn test_split_row_major() {
        let device = CpuDevice::new();
        let dispatch = KernelDispatch::SplitTerrain(grid().split_params());
        let mut buffer = device.acquire(KernelKind::SplitTerrain, 50).unwrap();
        device.dispatch(&dispatch, &mut buffer).unwrap();

        let positions = device.read_back(&buffer).unwrap();
        assert_eq!(positions.len(), 50);
        assert_eq!(positions[0], Vec3::new(5.0, 0.0, 5.0));
        assert_eq!(positions[1], Vec3::new(15.0, 0.0, 5.0));
        assert_eq!(positions[10], Vec3::new(5.0, 0.0, 15.0));
        assert_eq!(positions[49], Vec3::new(95.0, 0.0, 45.0));
    }

    #[test]
    fn test_grass_tile_blocks() {
        let device = CpuDevice::new();
        let params = SpawnGrassParams::new(&grid(), 2.5, 4, Vec3::ZERO, 1000.0);
        let dispatch = KernelDispatch::SpawnGrass(params);
        let mut buffer = device.acquire(KernelKind::SpawnGrass, dispatch.output_len()).unwrap();
        device.dispatch(&dispatch, &mut buffer).unwrap();

        let positions = device.read_back(&buffer).unwrap();
        assert_eq!(positions.len(), 50 * 16);
        // second tile starts at x = 10
        assert_eq!(positions[16], Vec3::new(11.25, 0.0, 1.25));
        // last blade of first tile
        assert_eq!(positions[15], Vec3::new(8.75, 0.0, 8.75));
    }

    #[test]
    fn test_wrong_size_rejected() {
        let device = CpuDevice::new();
        let dispatch = KernelDispatch::SplitTerrain(grid().split_params());
        let mut buffer = device.acquire(KernelKind::SplitTerrain, 3).unwrap();
        assert!(matches!(device.dispatch(&dispatch, &mut buffer), Err(Error::Compute(_))));
    }

    #[test]
    fn test_release_frees_storage() {
        let device = CpuDevice::new();
        let mut buffer = device.acquire(KernelKind::SplitTerrain, 50).unwrap();
        device.release(&mut buffer);
        assert!(buffer.data.is_empty());
    }

    #[test]
    fn test_oversized_acquire_is_an_error() {
        let device = CpuDevice::with_max_positions(100);
        assert!(device.acquire(KernelKind::SpawnGrass, 100).is_ok());
        assert!(matches!(device.acquire(KernelKind::SpawnGrass, 101), Err(Error::Compute(_))));
    }

    #[test]
    fn test_unallocatable_acquire_is_an_error() {
        // byte size overflows isize, so the reservation fails without allocating
        let device = CpuDevice::with_max_positions(usize::MAX);
        assert!(matches!(device.acquire(KernelKind::SpawnGrass, usize::MAX / 2), Err(Error::Compute(_))));
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let device = CpuDevice::new();
        let dispatch = KernelDispatch::SplitTerrain(grid().split_params());
        let mut buffer = device.acquire(KernelKind::SpawnGrass, 50).unwrap();
        assert!(matches!(device.dispatch(&dispatch, &mut buffer), Err(Error::Compute(_))));
    }
}
