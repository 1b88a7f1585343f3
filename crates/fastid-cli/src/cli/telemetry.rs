//! Log output for the CLI.
//!
//! Identifiers go to stdout, so logs are written to stderr. The filter comes
//! from `RUST_LOG` and defaults to `warn`, which surfaces configuration
//! fallbacks (an unparseable start time, no private address) without
//! cluttering normal output.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339()),
        )
        .try_init()?;
    Ok(())
}
