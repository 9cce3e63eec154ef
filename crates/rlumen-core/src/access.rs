//! Retrying register access primitives
//!
//! The bus is assumed lossy and contended: every register transaction is
//! retried a bounded number of times with a fixed pause in between. No
//! exponential backoff; chip transactions are short and retries are rare
//! in practice.
//!
//! A read is the 1-byte register address followed by a 1-byte reply. A
//! write is a single 2-byte frame, address then value. Anything else on
//! the wire is a protocol violation.

use crate::error::{Error, Result};
use crate::regs::Register;
use crate::transport::Transport;
use maybe_async::maybe_async;

/// Maximum number of attempts for one register transaction
pub const MAX_RW_RETRIES: u32 = 5;
/// Pause between attempts, in milliseconds
pub const RETRY_DELAY_MS: u32 = 10;

/// Whether a failed transfer attempt is worth retrying
///
/// `NoDevice` and `Cancelled` abort immediately; bus-level errors count as
/// a failed attempt like a short transfer does.
fn bail_out(err: Error) -> bool {
    matches!(err, Error::NoDevice | Error::Cancelled)
}

/// Read one register, retrying on short or failed transfers
///
/// Each attempt sends the address byte and expects a 1-byte reply. Any
/// attempt where exactly one byte was sent and exactly one received is a
/// success; otherwise the transport pauses [`RETRY_DELAY_MS`] and the
/// attempt repeats, up to [`MAX_RW_RETRIES`] times, then the read fails
/// with [`Error::BusError`].
#[maybe_async]
pub async fn read_reg<T: Transport + ?Sized>(transport: &mut T, reg: Register) -> Result<u8> {
    let frame = [reg.addr()];
    let mut reply = [0u8; 1];

    for attempt in 1..=MAX_RW_RETRIES {
        match transport.send(&frame).await {
            Ok(1) => match transport.receive(&mut reply).await {
                Ok(1) => return Ok(reply[0]),
                Ok(n) => {
                    log::debug!("read {:#04x}: short receive ({} bytes), attempt {}", reg.addr(), n, attempt);
                }
                Err(e) if bail_out(e) => return Err(e),
                Err(e) => {
                    log::debug!("read {:#04x}: receive failed ({}), attempt {}", reg.addr(), e, attempt);
                }
            },
            Ok(n) => {
                log::debug!("read {:#04x}: short send ({} bytes), attempt {}", reg.addr(), n, attempt);
            }
            Err(e) if bail_out(e) => return Err(e),
            Err(e) => {
                log::debug!("read {:#04x}: send failed ({}), attempt {}", reg.addr(), e, attempt);
            }
        }
        // The original driver pauses after every failed attempt, the last
        // one included
        transport.delay_ms(RETRY_DELAY_MS).await?;
    }

    log::warn!("read {:#04x}: giving up after {} attempts", reg.addr(), MAX_RW_RETRIES);
    Err(Error::BusError)
}

/// Write one register, retrying on short or failed transfers
///
/// The address/value pair goes out as a single 2-byte frame. An attempt
/// succeeds only when both bytes are confirmed sent; retry discipline
/// matches [`read_reg`].
#[maybe_async]
pub async fn write_reg<T: Transport + ?Sized>(
    transport: &mut T,
    reg: Register,
    value: u8,
) -> Result<()> {
    let frame = [reg.addr(), value];

    for attempt in 1..=MAX_RW_RETRIES {
        match transport.send(&frame).await {
            Ok(2) => return Ok(()),
            Ok(n) => {
                log::debug!("write {:#04x}: short send ({} bytes), attempt {}", reg.addr(), n, attempt);
            }
            Err(e) if bail_out(e) => return Err(e),
            Err(e) => {
                log::debug!("write {:#04x}: send failed ({}), attempt {}", reg.addr(), e, attempt);
            }
        }
        transport.delay_ms(RETRY_DELAY_MS).await?;
    }

    log::warn!("write {:#04x}: giving up after {} attempts", reg.addr(), MAX_RW_RETRIES);
    Err(Error::BusError)
}
