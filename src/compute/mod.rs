//! Compute devices that run the position kernels.
//!
//! Planners talk to a [`ComputeDevice`] only through [`run_kernel`], which
//! scopes the output buffer to a single dispatch and readback. The device
//! decides how the kernel actually runs: [`CpuDevice`] evaluates the
//! reference kernels with rayon, [`GpuDevice`] runs the WGSL versions.

pub mod buffer;
pub mod cpu;
pub mod gpu;
pub mod kernels;

#[cfg(test)]
pub(crate) mod testing;

pub use buffer::{DeviceBuffer, run_kernel};
pub use cpu::{CpuBuffer, CpuDevice};
pub use gpu::{GpuBuffer, GpuDevice};

use glam::Vec3;

use crate::core::Result;
use crate::grass::SpawnGrassParams;
use crate::grid::SplitTerrainParams;

/// Which position kernel a buffer or dispatch belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KernelKind {
    SplitTerrain,
    SpawnGrass,
}

impl KernelKind {
    /// Kernel entry point name, shared by the WGSL shaders.
    pub fn entry_point(self) -> &'static str {
        match self {
            KernelKind::SplitTerrain => "split_terrain",
            KernelKind::SpawnGrass => "spawn_grass",
        }
    }

    /// Name of the output buffer the kernel writes.
    pub fn output_name(self) -> &'static str {
        match self {
            KernelKind::SplitTerrain => "tile_positions",
            KernelKind::SpawnGrass => "grass_blade_positions",
        }
    }
}

/// A single kernel invocation over a `(columns, rows, 1)` grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum KernelDispatch {
    SplitTerrain(SplitTerrainParams),
    SpawnGrass(SpawnGrassParams),
}

impl KernelDispatch {
    pub fn kind(&self) -> KernelKind {
        match self {
            KernelDispatch::SplitTerrain(_) => KernelKind::SplitTerrain,
            KernelDispatch::SpawnGrass(_) => KernelKind::SpawnGrass,
        }
    }

    /// Dispatch grid: one invocation per tile.
    pub fn workgroups(&self) -> [u32; 3] {
        match self {
            KernelDispatch::SplitTerrain(p) => [p.columns, p.rows, 1],
            KernelDispatch::SpawnGrass(p) => [p.columns, p.rows, 1],
        }
    }

    /// Number of positions the kernel writes.
    ///
    /// Saturates at `usize::MAX`, which no device can allocate.
    pub fn output_len(&self) -> usize {
        let [columns, rows, _] = self.workgroups();
        let tiles = (columns as usize).saturating_mul(rows as usize);
        match self {
            KernelDispatch::SplitTerrain(_) => tiles,
            KernelDispatch::SpawnGrass(p) => {
                let per_side = p.blades_per_side as usize;
                tiles.saturating_mul(per_side).saturating_mul(per_side)
            }
        }
    }
}

/// Device capable of running the position kernels.
///
/// Buffers are acquired per planning call and must be handed back to
/// [`ComputeDevice::release`]; [`DeviceBuffer`] does that on drop.
pub trait ComputeDevice {
    type Buffer;

    /// Human-readable device name for logs.
    fn name(&self) -> &str;

    /// Allocate an output buffer of `len` positions for `kind`.
    fn acquire(&self, kind: KernelKind, len: usize) -> Result<Self::Buffer>;

    /// Run the kernel, writing every slot of `output`. Blocks until done.
    fn dispatch(&self, dispatch: &KernelDispatch, output: &mut Self::Buffer) -> Result<()>;

    /// Copy the buffer contents to host memory.
    fn read_back(&self, buffer: &Self::Buffer) -> Result<Vec<Vec3>>;

    /// Free the device-side storage. The buffer must not be used afterwards.
    fn release(&self, buffer: &mut Self::Buffer);
}
