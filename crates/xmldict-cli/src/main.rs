//! xmldict
//!
//! Command-line converter between JSON documents and XML.

mod commands;
mod config;

use clap::Parser;
use config::{CliConfig, Command};
use std::io::Write;

/// Initializes logging to standard error.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("helios_xmldict={0},helios_xmldict_cli={0}", level))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();
    init_logging(&config.log_level);

    let output = match &config.command {
        Command::Encode(args) => {
            let input = commands::read_input(args.input.as_deref())?;
            commands::run_encode(args, &input)?
        }
        Command::Decode(args) => {
            let input = commands::read_input(args.input.as_deref())?;
            commands::run_decode(args, &input)?
        }
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    if !output.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    Ok(())
}
