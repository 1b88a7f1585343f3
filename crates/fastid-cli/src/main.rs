#![doc = include_str!("../README.md")]

mod cli;

use std::io::{BufWriter, Write};

use clap::Parser;
use cli::config::{CliArgs, CliConfig};
use cli::telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    init_telemetry()?;
    let config = CliConfig::try_from(args)?;

    tracing::debug!(?config, "resolved configuration");

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    cli::commands::run(&config, &mut out)?;
    out.flush()?;
    Ok(())
}
