//! rlumen - LM3554 torch/strobe controller CLI
//!
//! Command-line facade over the `rlumen-core` driver. Each invocation
//! opens a transport, attaches to the chip (which programs the power-on
//! defaults) and runs one operation:
//!
//! ```bash
//! rlumen -t linux:dev=/dev/i2c-1 torch 64
//! rlumen -t linux:dev=/dev/i2c-1,addr=0x53 strobe 160
//! rlumen -t dummy faults
//! ```

mod cli;
mod transports;

use clap::Parser;
use cli::{Cli, Commands};
use rlumen_core::device::Lm3554;
use rlumen_core::regs::Defaults;

/// Map `-v` repetitions to the default log filter
///
/// The filter has to be in place before the logger is initialized; the
/// retry diagnostics in the access layer log at debug.
fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_filter(cli.verbose)),
    )
    .init();

    let transport = transports::open_transport(&cli.transport)?;

    log::debug!("attaching to chip via '{}'", cli.transport);
    let mut dev = Lm3554::attach(transport, Defaults::default())?;

    match cli.command {
        Commands::Probe => {
            println!("LM3554 attached, registers initialized");
        }
        Commands::Torch { level } => {
            dev.set_torch_brightness(level)?;
            println!("torch brightness set to {}", dev.torch_brightness());
        }
        Commands::Strobe { level } => {
            dev.set_strobe_brightness(level)?;
            println!("strobe brightness set to {}", dev.strobe_brightness());
        }
        Commands::Faults { no_clear } => {
            let flags = if no_clear {
                dev.read_faults()?
            } else {
                dev.read_and_clear_faults()?
            };
            println!("fault flags: {:#04x}", flags.bits());
            for (name, _) in flags.iter_names() {
                println!("  {}", name);
            }
        }
        Commands::Status => {
            println!("torch brightness: {}", dev.torch_brightness());
            println!("strobe brightness: {}", dev.strobe_brightness());
        }
    }

    Ok(())
}
