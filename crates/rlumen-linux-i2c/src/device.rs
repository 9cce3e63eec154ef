//! Linux I2C device implementation
//!
//! This module provides the `LinuxI2c` struct that implements the
//! `Transport` trait using Linux's i2c-dev interface.

use crate::error::{LinuxI2cError, Result};

use rlumen_core::error::{Error as CoreError, Result as CoreResult};
use rlumen_core::transport::Transport;

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::os::unix::io::AsRawFd;
use std::time::Duration;

/// Default 7-bit chip address of the LM3554
pub const DEFAULT_ADDR: u8 = 0x53;

/// Linux i2c-dev ioctl constants
mod ioctl {
    use nix::ioctl_write_int_bad;

    /// I2C_SLAVE from linux/i2c-dev.h
    const I2C_SLAVE: libc::c_ulong = 0x0703;

    ioctl_write_int_bad!(i2c_slave, I2C_SLAVE as libc::c_int);
}

/// Configuration for opening a Linux I2C device
#[derive(Debug, Clone)]
pub struct LinuxI2cConfig {
    /// Device path (e.g., "/dev/i2c-1")
    pub device: String,
    /// 7-bit chip address (default: 0x53)
    pub addr: u8,
}

impl Default for LinuxI2cConfig {
    fn default() -> Self {
        Self {
            device: String::new(),
            addr: DEFAULT_ADDR,
        }
    }
}

impl LinuxI2cConfig {
    /// Create a new configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Set the 7-bit chip address
    pub fn with_addr(mut self, addr: u8) -> Self {
        self.addr = addr;
        self
    }
}

/// Linux I2C transport using the i2c-dev interface
///
/// Byte frames go out through plain `write(2)`/`read(2)` on the device
/// node after the chip address has been selected with the `I2C_SLAVE`
/// ioctl; the kernel turns each call into one bus transaction.
pub struct LinuxI2c {
    file: File,
    addr: u8,
}

impl LinuxI2c {
    /// Open a Linux I2C device with the given configuration
    pub fn open(config: &LinuxI2cConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxI2cError::NoDevice);
        }

        log::debug!("linux_i2c: opening {} addr {:#04x}", config.device, config.addr);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|e| LinuxI2cError::OpenFailed {
                path: config.device.clone(),
                source: e,
            })?;

        unsafe {
            ioctl::i2c_slave(file.as_raw_fd(), config.addr as libc::c_int).map_err(|e| {
                LinuxI2cError::SetSlaveFailed {
                    addr: config.addr,
                    source: std::io::Error::from_raw_os_error(e as i32),
                }
            })?;
        }

        Ok(Self {
            file,
            addr: config.addr,
        })
    }

    /// Convenience for `open` with only a device path
    pub fn open_device(path: &str) -> Result<Self> {
        Self::open(&LinuxI2cConfig::new(path))
    }

    /// The chip address this transport is bound to
    pub fn addr(&self) -> u8 {
        self.addr
    }

    fn map_io_error(e: &std::io::Error) -> CoreError {
        match e.raw_os_error() {
            Some(code) if code == libc::ENODEV || code == libc::ENXIO => CoreError::NoDevice,
            _ => CoreError::BusError,
        }
    }
}

impl Transport for LinuxI2c {
    fn send(&mut self, bytes: &[u8]) -> CoreResult<usize> {
        match self.file.write(bytes) {
            Ok(n) => Ok(n),
            Err(e) => {
                log::debug!("linux_i2c: write failed: {}", e);
                Err(Self::map_io_error(&e))
            }
        }
    }

    fn receive(&mut self, buf: &mut [u8]) -> CoreResult<usize> {
        match self.file.read(buf) {
            Ok(n) => Ok(n),
            Err(e) => {
                log::debug!("linux_i2c: read failed: {}", e);
                Err(Self::map_io_error(&e))
            }
        }
    }

    // Plain sleep; unlike the kernel driver's interruptible pause there is
    // no cancellation signal to observe on this transport
    fn delay_ms(&mut self, ms: u32) -> CoreResult<()> {
        std::thread::sleep(Duration::from_millis(ms as u64));
        Ok(())
    }
}

/// Parse (key, value) option pairs into a config
///
/// Recognized options:
/// - `dev=/dev/i2c-N` - Required: device path
/// - `addr=0x53` - Optional: 7-bit chip address (hex or decimal)
pub fn parse_options(options: &[(&str, &str)]) -> Result<LinuxI2cConfig> {
    let mut config = LinuxI2cConfig::default();

    for (key, value) in options {
        match *key {
            "dev" => config.device = (*value).to_string(),
            "addr" => {
                let addr = if let Some(hex) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
                    u8::from_str_radix(hex, 16)
                } else {
                    value.parse::<u8>()
                };
                config.addr = addr.map_err(|_| {
                    LinuxI2cError::InvalidParameter(format!("addr={}", value))
                })?;
            }
            _ => {
                return Err(LinuxI2cError::InvalidParameter(format!(
                    "unknown option {}={}",
                    key, value
                )));
            }
        }
    }

    if config.device.is_empty() {
        return Err(LinuxI2cError::NoDevice);
    }

    Ok(config)
}
