//! CLI argument parsing

use crate::transports;
use clap::{Parser, Subcommand};

/// Generate dynamic help text for the transport argument
fn transport_help() -> String {
    format!(
        "Transport to use [available: {}]",
        transports::transport_names()
    )
}

#[derive(Parser)]
#[command(name = "rlumen")]
#[command(author, version, about = "LM3554 torch/strobe controller", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Transport to use, e.g. "dummy" or "linux:dev=/dev/i2c-1,addr=0x53"
    #[arg(short, long, global = true, default_value = "dummy", help = transport_help())]
    pub transport: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Attach to the chip and program the power-on defaults
    Probe,

    /// Set the torch (continuous) brightness; 0 turns the torch off
    Torch {
        /// Brightness level (0-255, quantized in steps of 32)
        level: u32,
    },

    /// Set the strobe (flash) brightness
    Strobe {
        /// Brightness level (0-255, quantized in steps of 16)
        level: u32,
    },

    /// Read the fault flags
    Faults {
        /// Leave the flag register uncleared after reading
        #[arg(long)]
        no_clear: bool,
    },

    /// Show the cached torch and strobe brightness (no bus traffic after
    /// attach)
    Status,
}
