//! rlumen-core - Core library for LM3554 torch/strobe control
//!
//! This crate drives an LM3554-class LED flash controller over a
//! register-addressed two-wire bus. It owns the retrying register access
//! primitives, the power-on initialization sequence, and the torch/strobe
//! brightness encoding. The bus itself is injected through the
//! [`transport::Transport`] trait, so the crate is `no_std` compatible and
//! testable against an emulated chip.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable heap allocation (boxed transport objects)
//! - `is_sync` - Compile the async API as blocking/synchronous
//!
//! # Example
//!
//! ```ignore
//! use rlumen_core::device::Lm3554;
//! use rlumen_core::regs::Defaults;
//!
//! let mut dev = Lm3554::attach(transport, Defaults::default())?;
//! dev.set_torch_brightness(32)?;
//! let faults = dev.read_and_clear_faults()?;
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
// Allow async fn in traits - we use maybe-async for dual sync/async support
#![allow(async_fn_in_trait)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod access;
pub mod device;
pub mod error;
pub mod regs;
#[cfg(all(feature = "std", feature = "is_sync"))]
pub mod shared;
pub mod transport;

pub use error::{Error, Result};
