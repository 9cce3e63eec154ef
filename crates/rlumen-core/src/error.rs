//! Error types for rlumen-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Caller supplied an out-of-range or otherwise unusable argument
    InvalidArgument,
    /// No device is reachable behind the transport (unbound or detached)
    NoDevice,
    /// Bus transfer failed after exhausting retries
    BusError,
    /// Retry pause was interrupted by a cancellation signal
    Cancelled,
    /// A register write during the initialization sequence failed
    InitFailed,
    /// A read or write failed during a brightness/strobe sequence
    ConfigFailed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::NoDevice => write!(f, "no device bound to transport"),
            Self::BusError => write!(f, "bus transfer failed after retries"),
            Self::Cancelled => write!(f, "operation cancelled"),
            Self::InitFailed => write!(f, "register initialization failed"),
            Self::ConfigFailed => write!(f, "brightness/strobe configuration failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
