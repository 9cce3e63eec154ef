//! Transport selection and initialization
//!
//! Parses the `-t` transport string ("name" or "name:key1=val1,key2=val2")
//! and opens the matching transport as a boxed trait object, so the rest
//! of the CLI never needs to know which backend is in use.

use rlumen_core::transport::Transport;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Unknown transport '{0}' (available: {names})", names = transport_names())]
    Unknown(String),

    #[error("Malformed transport option '{0}', expected key=value")]
    MalformedOption(String),
}

/// Names of the transports compiled into this binary
pub fn transport_names() -> &'static str {
    #[cfg(all(feature = "dummy", feature = "linux-i2c"))]
    return "dummy, linux";
    #[cfg(all(feature = "dummy", not(feature = "linux-i2c")))]
    return "dummy";
    #[cfg(all(not(feature = "dummy"), feature = "linux-i2c"))]
    return "linux";
    #[cfg(not(any(feature = "dummy", feature = "linux-i2c")))]
    return "none";
}

/// Open a transport from its selection string
pub fn open_transport(
    selector: &str,
) -> Result<Box<dyn Transport + Send>, Box<dyn std::error::Error>> {
    let (name, opts_str) = selector.split_once(':').unwrap_or((selector, ""));

    let mut options = Vec::new();
    for opt in opts_str.split(',').filter(|s| !s.is_empty()) {
        let (key, value) = opt
            .split_once('=')
            .ok_or_else(|| TransportError::MalformedOption(opt.to_string()))?;
        options.push((key, value));
    }

    match name {
        #[cfg(feature = "dummy")]
        "dummy" => {
            if let Some((key, value)) = options.first() {
                return Err(TransportError::MalformedOption(format!("{}={}", key, value)).into());
            }
            Ok(Box::new(rlumen_dummy::DummyChip::new()))
        }
        #[cfg(feature = "linux-i2c")]
        "linux" | "linux_i2c" => rlumen_linux_i2c::open_linux_i2c(&options),
        _ => Err(TransportError::Unknown(name.to_string()).into()),
    }
}
