//! LM3554 device handle
//!
//! `Lm3554` owns the transport for one physical chip and layers the
//! initialization sequence, the torch/strobe brightness controllers and
//! the fault readout on top of the register access primitives. The last
//! successfully programmed brightness levels are mirrored in the handle so
//! read-back needs no bus round trip.

use crate::access::{read_reg, write_reg};
use crate::error::{Error, Result};
use crate::regs::{
    encode_strobe, encode_torch, strobe_config1, Defaults, FaultFlags, Register,
    CONFIG2_VIN_MONITOR, LEVEL_MAX,
};
use crate::transport::Transport;
use maybe_async::maybe_async;

/// Wrap a lower-layer failure into a sequence-level error kind
///
/// `Cancelled` passes through so callers can tell an aborted retry pause
/// from a dead bus.
fn wrap(err: Error, kind: Error) -> Error {
    match err {
        Error::Cancelled => Error::Cancelled,
        _ => kind,
    }
}

/// Handle for one LM3554 chip instance
///
/// Created by [`Lm3554::attach`], which runs the full register
/// initialization sequence; a handle that failed to initialize is never
/// returned. One handle per physical chip; methods take `&mut self`, so a
/// single handle serializes its bus transactions by construction. For
/// shared access see [`SharedLm3554`](crate::shared::SharedLm3554).
#[derive(Debug)]
pub struct Lm3554<T: Transport> {
    transport: T,
    defaults: Defaults,
    torch_brightness: u32,
    strobe_brightness: u32,
}

impl<T: Transport> Lm3554<T> {
    /// Attach to a chip: bind the transport and program the power-on
    /// defaults
    ///
    /// Writes, in order, torch brightness, flash brightness, flash
    /// duration, config-1, config-2, VIN monitor and GPIO from `defaults`.
    /// The first failing write aborts with [`Error::InitFailed`]; register
    /// state is then partially written (there is no rollback, matching the
    /// hardware) and no handle is returned.
    #[maybe_async]
    pub async fn attach(transport: T, defaults: Defaults) -> Result<Self> {
        let mut dev = Self {
            transport,
            defaults,
            torch_brightness: 0,
            strobe_brightness: 0,
        };
        dev.init_registers().await?;
        log::debug!("lm3554: attached and initialized");
        Ok(dev)
    }

    #[maybe_async]
    async fn init_registers(&mut self) -> Result<()> {
        let sequence = [
            (Register::TorchBrightness, self.defaults.torch_brightness),
            (Register::FlashBrightness, self.defaults.flash_brightness),
            (Register::FlashDuration, self.defaults.flash_duration),
            (Register::Config1, self.defaults.config_reg_1),
            (Register::Config2, self.defaults.config_reg_2),
            (Register::VinMonitor, self.defaults.vin_monitor),
            (Register::Gpio, self.defaults.gpio_reg),
        ];

        for (reg, value) in sequence {
            write_reg(&mut self.transport, reg, value)
                .await
                .map_err(|e| {
                    log::error!("lm3554: register initialization failed at {:#04x}", reg.addr());
                    wrap(e, Error::InitFailed)
                })?;
        }
        Ok(())
    }

    /// Set the torch (continuous) brightness
    ///
    /// Level 0 turns the torch off. The VIN monitor mode select in
    /// config-2 is written before the brightness register; if it fails the
    /// brightness register is left untouched. On success the cached torch
    /// level is updated.
    #[maybe_async]
    pub async fn set_torch_brightness(&mut self, level: u32) -> Result<()> {
        if level > LEVEL_MAX {
            return Err(Error::InvalidArgument);
        }

        let current = read_reg(&mut self.transport, Register::TorchBrightness)
            .await
            .map_err(|e| wrap(e, Error::ConfigFailed))?;
        let value = encode_torch(current, level);

        // VIN monitor select must precede the brightness write
        write_reg(&mut self.transport, Register::Config2, CONFIG2_VIN_MONITOR)
            .await
            .map_err(|e| {
                log::error!("lm3554: configuring the VIN monitor failed");
                wrap(e, Error::ConfigFailed)
            })?;

        write_reg(&mut self.transport, Register::TorchBrightness, value)
            .await
            .map_err(|e| {
                log::error!("lm3554: torch brightness write failed");
                wrap(e, Error::ConfigFailed)
            })?;

        self.torch_brightness = level;
        Ok(())
    }

    /// Set the strobe (flash) brightness
    ///
    /// Entering strobe mode restores the torch brightness register to its
    /// default; the two modes share chip state. The trailing config-1
    /// write is checked here, unlike in the original driver, so a failure
    /// anywhere in the sequence surfaces as [`Error::ConfigFailed`].
    #[maybe_async]
    pub async fn set_strobe_brightness(&mut self, level: u32) -> Result<()> {
        if level > LEVEL_MAX {
            return Err(Error::InvalidArgument);
        }

        let config1 = read_reg(&mut self.transport, Register::Config1)
            .await
            .map_err(|e| wrap(e, Error::ConfigFailed))?;

        write_reg(
            &mut self.transport,
            Register::TorchBrightness,
            self.defaults.torch_brightness,
        )
        .await
        .map_err(|e| {
            log::error!("lm3554: restoring default torch brightness failed");
            wrap(e, Error::ConfigFailed)
        })?;

        let current = read_reg(&mut self.transport, Register::FlashBrightness)
            .await
            .map_err(|e| wrap(e, Error::ConfigFailed))?;
        let value = encode_strobe(current, level);

        write_reg(&mut self.transport, Register::FlashBrightness, value)
            .await
            .map_err(|e| {
                log::error!("lm3554: flash brightness write failed");
                wrap(e, Error::ConfigFailed)
            })?;

        self.strobe_brightness = level;

        write_reg(
            &mut self.transport,
            Register::Config1,
            strobe_config1(config1, level),
        )
        .await
        .map_err(|e| {
            log::error!("lm3554: config-1 write failed after strobe update");
            wrap(e, Error::ConfigFailed)
        })?;

        Ok(())
    }

    /// Read the fault flags and clear the flag register
    ///
    /// Not idempotent: a successful call wipes the chip-side flags, so an
    /// immediate second call reports nothing. If the clearing write fails
    /// the flags read beforehand are discarded and the call fails; the
    /// register content cannot be trusted either way.
    #[maybe_async]
    pub async fn read_and_clear_faults(&mut self) -> Result<FaultFlags> {
        let raw = read_reg(&mut self.transport, Register::Flag)
            .await
            .map_err(|e| wrap(e, Error::ConfigFailed))?;

        write_reg(&mut self.transport, Register::Flag, 0x00)
            .await
            .map_err(|e| {
                log::error!("lm3554: clearing the fault flags failed, flags discarded");
                wrap(e, Error::ConfigFailed)
            })?;

        Ok(FaultFlags::from_register(raw))
    }

    /// Read the fault flags without clearing them
    #[maybe_async]
    pub async fn read_faults(&mut self) -> Result<FaultFlags> {
        let raw = read_reg(&mut self.transport, Register::Flag)
            .await
            .map_err(|e| wrap(e, Error::ConfigFailed))?;
        Ok(FaultFlags::from_register(raw))
    }
}

impl<T: Transport> Lm3554<T> {
    /// Last successfully programmed torch brightness (cached, no bus access)
    pub fn torch_brightness(&self) -> u32 {
        self.torch_brightness
    }

    /// Last successfully programmed strobe brightness (cached, no bus access)
    pub fn strobe_brightness(&self) -> u32 {
        self.strobe_brightness
    }

    /// The defaults this handle was attached with
    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Get a reference to the underlying transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the handle and return the transport
    pub fn into_transport(self) -> T {
        self.transport
    }
}
