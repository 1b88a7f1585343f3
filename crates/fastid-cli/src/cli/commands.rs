use std::io::Write;

use fastid::{BitLayout, Epoch, Generator, IdParts};
use serde::Serialize;

use super::config::{CliConfig, Command};

/// A decoded identifier as printed by `decode --json`.
#[derive(Serialize, Debug)]
struct DecodedId {
    id: i64,
    #[serde(flatten)]
    parts: IdParts,
    issued_at: Option<String>,
}

impl DecodedId {
    fn new(id: i64, layout: &BitLayout, epoch: Epoch) -> Self {
        let parts = layout.decode(id);
        let issued_at = epoch.instant_of(parts.time_unit).map(|at| at.to_rfc3339());
        Self {
            id,
            parts,
            issued_at,
        }
    }
}

/// Runs the configured command, writing its output to `out`.
pub fn run(config: &CliConfig, out: &mut impl Write) -> anyhow::Result<()> {
    match &config.command {
        Command::Generate { count } => generate(config, *count, out),
        Command::Decode { ids, json } => decode(config, ids, *json, out),
        Command::Layout => describe_layout(config, out),
    }
}

fn generate(config: &CliConfig, count: usize, out: &mut impl Write) -> anyhow::Result<()> {
    let generator = Generator::new(config.layout, config.settings.epoch);
    tracing::debug!(count, discriminator = config.layout.discriminator(), "generating");
    for _ in 0..count {
        writeln!(out, "{}", generator.next_id())?;
    }
    out.flush()?;
    Ok(())
}

fn decode(config: &CliConfig, ids: &[i64], json: bool, out: &mut impl Write) -> anyhow::Result<()> {
    for &id in ids {
        let decoded = DecodedId::new(id, &config.layout, config.settings.epoch);
        if json {
            serde_json::to_writer(&mut *out, &decoded)?;
            writeln!(out)?;
        } else {
            writeln!(
                out,
                "{id} {} issued_at={}",
                decoded.parts,
                decoded.issued_at.as_deref().unwrap_or("out-of-range")
            )?;
        }
    }
    out.flush()?;
    Ok(())
}

fn describe_layout(config: &CliConfig, out: &mut impl Write) -> anyhow::Result<()> {
    let layout = &config.layout;
    let epoch = config.settings.epoch;
    writeln!(out, "time_bits          {}", layout.time_bits())?;
    writeln!(out, "seq_bits           {}", layout.seq_bits())?;
    writeln!(out, "discriminator_bits {}", layout.discriminator_bits())?;
    writeln!(out, "discriminator      {}", layout.discriminator())?;
    writeln!(out, "ids_per_unit       {}", layout.ids_per_unit())?;
    writeln!(out, "epoch              {}", epoch.to_datetime().to_rfc3339())?;
    match epoch.horizon(layout) {
        Some(horizon) => writeln!(out, "horizon            {}", horizon.to_rfc3339())?,
        None => writeln!(out, "horizon            out-of-range")?,
    }
    out.flush()?;
    Ok(())
}
