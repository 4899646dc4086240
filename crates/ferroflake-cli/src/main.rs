#![doc = include_str!("../README.md")]

mod config;
mod output;
mod telemetry;

use clap::Parser;
use config::{ClockKind, CliArgs, CliConfig, Command};
use core::time::Duration;
use ferroflake::{
    Config, Error, LayoutView, MonotonicClock, SnowflakeGenerator, SystemClock, TimeSource,
};
use std::io::{self, BufWriter, Write};

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = CliConfig::try_from(args)?;

    telemetry::init_logging()?;
    tracing::debug!("Resolved configuration: {:#?}", config);

    match config.command {
        Command::Generate { count, max_retries } => match config.clock {
            ClockKind::System => generate(
                SnowflakeGenerator::with_clock(config.layout, SystemClock),
                count,
                max_retries,
            ),
            ClockKind::Monotonic => generate(
                SnowflakeGenerator::with_clock(config.layout, MonotonicClock::new()),
                count,
                max_retries,
            ),
        },
        Command::Decode {
            ids,
            json,
            layout,
            strict,
        } => decode(config.layout, &ids, json, layout, strict),
        Command::Layout => {
            print!("{}", output::render_layout(&config.layout));
            Ok(())
        }
    }
}

fn generate<T: TimeSource>(
    generator: SnowflakeGenerator<T>,
    count: usize,
    max_retries: u32,
) -> anyhow::Result<()> {
    let mut out = BufWriter::new(io::stdout().lock());
    let mut retries = 0;
    let mut written = 0;

    while written < count {
        match generator.generate() {
            Ok(id) => {
                writeln!(out, "{id}")?;
                written += 1;
            }
            Err(Error::ClockMovedBackwards { now, last }) if retries < max_retries => {
                retries += 1;
                let behind = (last - now).unsigned_abs();
                tracing::warn!(
                    behind_ms = behind,
                    attempt = retries,
                    "Clock moved backwards, sleeping before retry"
                );
                std::thread::sleep(Duration::from_millis(behind));
            }
            Err(e) => return Err(e.into()),
        }
    }

    out.flush()?;
    tracing::info!(count, "Generated IDs");
    Ok(())
}

fn decode(layout: Config, ids: &[i64], json: bool, table: bool, strict: bool) -> anyhow::Result<()> {
    let generator = SnowflakeGenerator::new(layout);
    // Inputs often repeat when piped from logs.
    let scoped = generator.cache_scope();
    let mut out = BufWriter::new(io::stdout().lock());

    for &id in ids {
        let parts = if strict {
            scoped.try_decode(id)?
        } else {
            scoped.decode(id)
        };

        if json {
            writeln!(out, "{}", output::render_json(id, &parts)?)?;
        } else if table {
            write!(out, "{}", LayoutView::new(scoped.config(), id))?;
        } else {
            writeln!(out, "{}", output::render_plain(scoped.config(), id, &parts))?;
        }
    }

    out.flush()?;
    tracing::debug!(distinct = scoped.cache_len(), "Decoded IDs");
    Ok(())
}
