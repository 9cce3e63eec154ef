//! rlumen-linux-i2c - Linux i2c-dev support
//!
//! This crate provides access to an LM3554 chip through the Linux
//! `/dev/i2c-N` character device interface.
//!
//! # Example
//!
//! ```no_run
//! use rlumen_linux_i2c::{LinuxI2c, LinuxI2cConfig};
//! use rlumen_core::device::Lm3554;
//! use rlumen_core::regs::Defaults;
//!
//! let config = LinuxI2cConfig::new("/dev/i2c-1").with_addr(0x53);
//! let transport = LinuxI2c::open(&config)?;
//! let mut dev = Lm3554::attach(transport, Defaults::default())?;
//! dev.set_torch_brightness(32)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with i2c-dev support enabled (`CONFIG_I2C_CHARDEV`)
//! - Read/write access to `/dev/i2c-N`
//! - May require adding the user to the `i2c` group or udev rules

pub mod device;
pub mod error;

// Re-exports
pub use device::{parse_options, LinuxI2c, LinuxI2cConfig, DEFAULT_ADDR};
pub use error::{LinuxI2cError, Result};

/// Open a Linux I2C device and return a boxed transport
///
/// This is a convenience function for use in the CLI transport dispatch.
///
/// # Arguments
///
/// * `options` - Slice of (key, value) pairs from transport string parsing
pub fn open_linux_i2c(
    options: &[(&str, &str)],
) -> std::result::Result<
    Box<dyn rlumen_core::transport::Transport + Send>,
    Box<dyn std::error::Error>,
> {
    let config = parse_options(options)?;
    let i2c = LinuxI2c::open(&config)?;
    Ok(Box::new(i2c))
}
