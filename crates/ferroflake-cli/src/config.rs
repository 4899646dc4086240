use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use ferroflake::{CUSTOM_EPOCH, Config, DATACENTER_ID, OriginField, SystemClock, TimeSource, WORKER_ID};

/// Runtime configuration for the `ferroflake` binary.
///
/// The layout options must match between the process that generated an ID and
/// the one decoding it. All values are parsed from CLI arguments or
/// environment variables (a `.env` file is loaded first).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ferroflake",
    version,
    about = "Generate and decode Snowflake-style IDs"
)]
pub struct CliArgs {
    /// Zero point of the timestamp field, in milliseconds since the UNIX
    /// epoch. Must not be in the future.
    ///
    /// Environment variable: `FERROFLAKE_EPOCH`
    #[arg(long, env = "FERROFLAKE_EPOCH", default_value_t = CUSTOM_EPOCH)]
    pub epoch: i64,

    /// Datacenter identifier stamped into every generated ID.
    ///
    /// Environment variable: `FERROFLAKE_DATACENTER_ID`
    #[arg(long, env = "FERROFLAKE_DATACENTER_ID", default_value_t = 0)]
    pub datacenter_id: u32,

    /// Worker identifier stamped into every generated ID. Must be unique
    /// among workers of the same datacenter that generate concurrently.
    ///
    /// Environment variable: `FERROFLAKE_WORKER_ID`
    #[arg(long, env = "FERROFLAKE_WORKER_ID", default_value_t = 0)]
    pub worker_id: u32,

    /// Width of the datacenter field.
    ///
    /// Environment variable: `FERROFLAKE_DATACENTER_BITS`
    #[arg(long, env = "FERROFLAKE_DATACENTER_BITS", default_value_t = 5)]
    pub datacenter_bits: u8,

    /// Width of the worker field.
    ///
    /// Environment variable: `FERROFLAKE_WORKER_BITS`
    #[arg(long, env = "FERROFLAKE_WORKER_BITS", default_value_t = 5)]
    pub worker_bits: u8,

    /// Width of the per-millisecond sequence; caps throughput at
    /// `2^sequence_bits` IDs per millisecond.
    ///
    /// Environment variable: `FERROFLAKE_SEQUENCE_BITS`
    #[arg(long, env = "FERROFLAKE_SEQUENCE_BITS", default_value_t = 12)]
    pub sequence_bits: u8,

    /// Clock used for generation.
    ///
    /// Environment variable: `FERROFLAKE_CLOCK`
    #[arg(long, env = "FERROFLAKE_CLOCK", value_enum, default_value_t = ClockKind::System)]
    pub clock: ClockKind,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Generate IDs, one per line.
    Generate {
        /// Number of IDs to generate.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// How many times to retry after the clock moves backwards before
        /// giving up.
        #[arg(long, default_value_t = 3)]
        max_retries: u32,
    },
    /// Decode IDs into their components.
    Decode {
        /// IDs to decode.
        #[arg(required = true, allow_negative_numbers = true)]
        ids: Vec<i64>,

        /// Print one JSON object per line.
        #[arg(long, conflicts_with = "layout")]
        json: bool,

        /// Print each ID as a bit-layout table.
        #[arg(long)]
        layout: bool,

        /// Reject IDs with the reserved sign bit set.
        #[arg(long)]
        strict: bool,
    },
    /// Print the resolved bit layout.
    Layout,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockKind {
    /// Read the OS wall clock on every call; regressions are reported.
    System,
    /// Anchor to the wall clock once and advance monotonically.
    Monotonic,
}

/// Validated configuration derived from [`CliArgs`].
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub layout: Config,
    pub clock: ClockKind,
    pub command: Command,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let now = SystemClock.current_millis();
        if args.epoch > now {
            bail!(
                "FERROFLAKE_EPOCH ({}) is in the future (now = {})",
                args.epoch,
                now
            );
        }

        let fields = [
            OriginField::new(DATACENTER_ID, args.datacenter_bits),
            OriginField::new(WORKER_ID, args.worker_bits),
        ];
        let layout = Config::resolve(
            args.epoch,
            &[args.datacenter_id, args.worker_id],
            &fields,
            args.sequence_bits,
        )
        .context("invalid ID layout")?;

        if layout.max_timestamp() < now {
            bail!(
                "timestamp field ({} bits) cannot represent the current time with epoch {}",
                layout.timestamp_bits(),
                args.epoch
            );
        }

        Ok(Self {
            layout,
            clock: args.clock,
            command: args.command,
        })
    }
}
