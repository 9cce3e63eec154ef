//! Shared device handle for concurrent callers
//!
//! The bus is serial, so all register operations on one chip must be
//! mutually exclusive. A plain [`Lm3554`] enforces that through `&mut
//! self`; facades that expose several entry points over one chip (e.g.
//! separate torch and strobe attribute files) instead clone a
//! `SharedLm3554`, which holds a lock for the whole logical operation so
//! the multi-write torch/strobe sequences never interleave.
//!
//! Sync mode only: lock-across-await is not a pattern this crate wants.

use crate::device::Lm3554;
use crate::error::Result;
use crate::regs::{Defaults, FaultFlags};
use crate::transport::Transport;
use std::sync::{Arc, Mutex, MutexGuard};

/// Cloneable, mutex-guarded handle for one chip
pub struct SharedLm3554<T: Transport> {
    inner: Arc<Mutex<Lm3554<T>>>,
}

impl<T: Transport> Clone for SharedLm3554<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> SharedLm3554<T> {
    /// Wrap an attached device handle
    pub fn new(device: Lm3554<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(device)),
        }
    }

    /// Attach to a chip and wrap the handle in one step
    pub fn attach(transport: T, defaults: Defaults) -> Result<Self> {
        Ok(Self::new(Lm3554::attach(transport, defaults)?))
    }

    /// Lock the device for a sequence of direct calls
    ///
    /// A poisoned lock is recovered: the device carries no invariant a
    /// panicking operation could have half-applied beyond what a bus
    /// failure leaves anyway.
    pub fn lock(&self) -> MutexGuard<'_, Lm3554<T>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// See [`Lm3554::set_torch_brightness`]
    pub fn set_torch_brightness(&self, level: u32) -> Result<()> {
        self.lock().set_torch_brightness(level)
    }

    /// See [`Lm3554::set_strobe_brightness`]
    pub fn set_strobe_brightness(&self, level: u32) -> Result<()> {
        self.lock().set_strobe_brightness(level)
    }

    /// See [`Lm3554::read_and_clear_faults`]
    pub fn read_and_clear_faults(&self) -> Result<FaultFlags> {
        self.lock().read_and_clear_faults()
    }

    /// See [`Lm3554::read_faults`]
    pub fn read_faults(&self) -> Result<FaultFlags> {
        self.lock().read_faults()
    }

    /// Cached torch brightness (no bus access)
    pub fn torch_brightness(&self) -> u32 {
        self.lock().torch_brightness()
    }

    /// Cached strobe brightness (no bus access)
    pub fn strobe_brightness(&self) -> u32 {
        self.lock().strobe_brightness()
    }
}
