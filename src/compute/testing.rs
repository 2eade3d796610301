//! Counting device for resource-lifecycle tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use glam::Vec3;

use super::{ComputeDevice, CpuBuffer, CpuDevice, KernelDispatch, KernelKind};
use crate::core::{Error, Result};

/// Wraps [`CpuDevice`] and tracks acquire/release pairs.
pub(crate) struct CountingDevice {
    inner: CpuDevice,
    acquired: AtomicUsize,
    released: AtomicUsize,
    dispatched: AtomicUsize,
    fail_dispatch: bool,
}

impl CountingDevice {
    pub fn new() -> Self {
        Self {
            inner: CpuDevice::new(),
            acquired: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
            dispatched: AtomicUsize::new(0),
            fail_dispatch: false,
        }
    }

    /// Device whose every dispatch fails after the buffer is acquired.
    pub fn failing_dispatch() -> Self {
        Self {
            fail_dispatch: true,
            ..Self::new()
        }
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn dispatched(&self) -> usize {
        self.dispatched.load(Ordering::SeqCst)
    }

    /// Buffers acquired but not yet released.
    pub fn live(&self) -> usize {
        self.acquired() - self.released.load(Ordering::SeqCst)
    }
}

impl ComputeDevice for CountingDevice {
    type Buffer = CpuBuffer;

    fn name(&self) -> &str {
        "counting"
    }

    fn acquire(&self, kind: KernelKind, len: usize) -> Result<CpuBuffer> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        self.inner.acquire(kind, len)
    }

    fn dispatch(&self, dispatch: &KernelDispatch, output: &mut CpuBuffer) -> Result<()> {
        self.dispatched.fetch_add(1, Ordering::SeqCst);
        if self.fail_dispatch {
            return Err(Error::Compute("injected dispatch failure".into()));
        }
        self.inner.dispatch(dispatch, output)
    }

    fn read_back(&self, buffer: &CpuBuffer) -> Result<Vec<Vec3>> {
        self.inner.read_back(buffer)
    }

    fn release(&self, buffer: &mut CpuBuffer) {
        self.released.fetch_add(1, Ordering::SeqCst);
        self.inner.release(buffer);
    }
}
