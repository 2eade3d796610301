//! Scoped device buffers.

use glam::Vec3;

use super::{ComputeDevice, KernelDispatch, KernelKind};
use crate::core::{Error, Result};

/// Output buffer that is released back to its device when dropped.
pub struct DeviceBuffer<'d, D: ComputeDevice> {
    device: &'d D,
    kind: KernelKind,
    len: usize,
    buffer: D::Buffer,
}

impl<'d, D: ComputeDevice> DeviceBuffer<'d, D> {
    pub fn acquire(device: &'d D, kind: KernelKind, len: usize) -> Result<Self> {
        let buffer = device.acquire(kind, len)?;
        log::trace!("Acquired {} buffer ({} positions) on {}", kind.output_name(), len, device.name());
        Ok(Self { device, kind, len, buffer })
    }

    /// Run `dispatch` into this buffer.
    pub fn dispatch(&mut self, dispatch: &KernelDispatch) -> Result<()> {
        if dispatch.kind() != self.kind {
            return Err(Error::Compute(format!(
                "{:?} dispatch into a {} buffer",
                dispatch.kind(),
                self.kind.output_name()
            )));
        }
        if dispatch.output_len() != self.len {
            return Err(Error::Compute(format!(
                "{} writes {} positions, buffer holds {}",
                self.kind.entry_point(),
                dispatch.output_len(),
                self.len
            )));
        }
        self.device.dispatch(dispatch, &mut self.buffer)
    }

    /// Copy the results to host memory.
    pub fn read_back(&self) -> Result<Box<[Vec3]>> {
        let positions = self.device.read_back(&self.buffer)?;
        if positions.len() != self.len {
            return Err(Error::Compute(format!(
                "read back {} positions from {}, expected {}",
                positions.len(),
                self.kind.output_name(),
                self.len
            )));
        }
        Ok(positions.into_boxed_slice())
    }
}

impl<D: ComputeDevice> Drop for DeviceBuffer<'_, D> {
    fn drop(&mut self) {
        self.device.release(&mut self.buffer);
        log::trace!("Released {} buffer on {}", self.kind.output_name(), self.device.name());
    }
}

/// Acquire, dispatch, read back and release in one blocking call.
///
/// Empty dispatches return an empty result without touching the device.
pub fn run_kernel<D: ComputeDevice>(device: &D, dispatch: &KernelDispatch) -> Result<Box<[Vec3]>> {
    let len = dispatch.output_len();
    if len == 0 {
        return Ok(Box::default());
    }

    let mut buffer = DeviceBuffer::acquire(device, dispatch.kind(), len)?;
    log::debug!(
        "Dispatching {} over {:?} on {}",
        dispatch.kind().entry_point(),
        dispatch.workgroups(),
        device.name()
    );
    buffer.dispatch(dispatch)?;
    buffer.read_back()
}
