//! Transport trait definitions
//!
//! The transport is the host's two-wire bus binding for one chip address.
//! It moves raw byte frames; clocking, addressing and ACK/NACK handling
//! live below this trait.
//!
//! Uses `maybe_async` to support both sync and async modes:
//! - With the `is_sync` feature: blocking/synchronous
//! - Without it: async

use crate::error::Result;
use maybe_async::maybe_async;

/// Two-wire bus transport bound to one chip address (sync or async
/// depending on the `is_sync` feature)
///
/// A transfer that moves fewer bytes than requested is reported through the
/// returned count, not as an error; the access layer decides whether to
/// retry. Hard failures (NACK with no partial transfer, lost device) are
/// reported as errors.
#[maybe_async(AFIT)]
pub trait Transport {
    /// Send a byte frame to the chip, returning the number of bytes the bus
    /// confirmed sent
    async fn send(&mut self, bytes: &[u8]) -> Result<usize>;

    /// Receive bytes from the chip into `buf`, returning the number of
    /// bytes actually received
    async fn receive(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Pause for `ms` milliseconds between retry attempts
    ///
    /// The pause is interruptible: implementations return
    /// [`Error::Cancelled`](crate::Error::Cancelled) when a cancellation
    /// signal arrives during the wait, and the caller abandons its retry
    /// loop.
    async fn delay_ms(&mut self, ms: u32) -> Result<()>;
}

// Blanket impl for boxed transports to allow trait objects (sync mode only)
// In async mode, traits with async fn are not object-safe
#[cfg(all(feature = "alloc", feature = "is_sync"))]
impl Transport for alloc::boxed::Box<dyn Transport + Send> {
    fn send(&mut self, bytes: &[u8]) -> Result<usize> {
        (**self).send(bytes)
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).receive(buf)
    }

    fn delay_ms(&mut self, ms: u32) -> Result<()> {
        (**self).delay_ms(ms)
    }
}
