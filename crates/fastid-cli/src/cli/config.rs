use anyhow::bail;
use clap::{Args, Parser, Subcommand, ValueEnum};
use fastid::{BitLayout, InterfaceProbe, MACHINE_ID_ENV, START_TIME_ENV, Settings};

/// Upper bound on `generate --count`, to keep a typo from spinning for hours.
pub const MAX_COUNT: usize = 100_000_000;

/// Command-line arguments for the `fastid` binary.
///
/// The discriminator and epoch may come from flags or from the same
/// environment variables the library reads (`.env` files are loaded first).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "fastid",
    version,
    about = "Generate and decode k-ordered 64-bit identifiers"
)]
pub struct CliArgs {
    /// Discriminator for this process, as a decimal integer.
    ///
    /// Unparseable values are ignored. When unset, the low two octets of a
    /// private IPv4 address are used, or 0 if none is found.
    ///
    /// Environment variable: `FASTID_MACHINE_ID`
    #[arg(long, global = true, env = MACHINE_ID_ENV)]
    pub machine_id: Option<String>,

    /// Generation start epoch as an RFC 3339 instant.
    ///
    /// Unparseable values fall back to 2018-06-01T00:00:00.000Z.
    ///
    /// Environment variable: `FASTID_START_TIME`
    #[arg(long, global = true, env = START_TIME_ENV)]
    pub start_time: Option<String>,

    #[command(flatten)]
    pub layout: LayoutArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Selects the bit layout.
#[derive(Args, Debug, Clone)]
pub struct LayoutArgs {
    /// Named layout, or `custom` to use the width flags below.
    #[arg(long, global = true, value_enum, default_value_t = Preset::Common)]
    pub preset: Preset,

    /// Timestamp bits for `--preset custom`.
    #[arg(long, global = true, default_value_t = 40)]
    pub time_bits: u32,

    /// Sequence bits for `--preset custom`.
    #[arg(long, global = true, default_value_t = 7)]
    pub seq_bits: u32,

    /// Discriminator bits for `--preset custom`.
    #[arg(long, global = true, default_value_t = 16)]
    pub discriminator_bits: u32,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// 40 timestamp, 7 sequence, 16 discriminator bits.
    Common,
    /// 40 timestamp, 15 sequence, 8 discriminator bits.
    Benchmark,
    /// Widths taken from `--time-bits`, `--seq-bits`, `--discriminator-bits`.
    Custom,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print freshly generated identifiers, one per line.
    Generate {
        /// How many identifiers to generate.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
    /// Split identifiers into time unit, sequence and discriminator.
    Decode {
        /// Identifiers to decode.
        #[arg(required = true)]
        ids: Vec<i64>,

        /// Print one JSON object per line.
        #[arg(long)]
        json: bool,
    },
    /// Describe the active layout, its capacity and its wraparound horizon.
    Layout,
}

/// Validated configuration derived from [`CliArgs`].
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub settings: Settings,
    pub layout: BitLayout,
    pub command: Command,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if let Command::Generate { count } = args.command {
            if count == 0 {
                bail!("--count must be greater than 0");
            }
            if count > MAX_COUNT {
                bail!("--count ({count}) exceeds the maximum of {MAX_COUNT}");
            }
        }

        let settings = Settings::from_lookup(|key| match key {
            MACHINE_ID_ENV => args.machine_id.clone(),
            START_TIME_ENV => args.start_time.clone(),
            _ => None,
        });

        let discriminator = settings.resolve_discriminator(&InterfaceProbe::default());
        let layout = match args.layout.preset {
            Preset::Common => BitLayout::common(discriminator),
            Preset::Benchmark => BitLayout::benchmark(discriminator),
            Preset::Custom => BitLayout::new(
                args.layout.time_bits,
                args.layout.seq_bits,
                args.layout.discriminator_bits,
                discriminator,
            )?,
        };

        Ok(Self {
            settings,
            layout,
            command: args.command,
        })
    }
}
