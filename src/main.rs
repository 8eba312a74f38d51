use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result as Result;
use clap::Parser;
use env_logger::Env;
use log::info;

use climate::{ingest, report, DisplayZone, Registry};

/// Summarizes NOAA climate observations per US state.
#[derive(Debug, Parser)]
#[command(name = "climate", version, about)]
struct Args {
    /// Tab-delimited observation files, processed in the order given
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Print extremum timestamps in UTC instead of local time
    #[arg(long)]
    utc: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let timer = Instant::now();
    let zone = if args.utc { DisplayZone::Utc } else { DisplayZone::Local };
    let mut registry = Registry::new(zone);

    let stdout = io::stdout();
    let mut lock = stdout.lock();

    ingest::ingest_all(&mut registry, &args.files, &mut lock)?;
    report::write_report(&registry, &mut lock)?;

    info!(
        "{} states, {} malformed lines skipped, {:?}",
        registry.len(),
        registry.skipped(),
        timer.elapsed()
    );
    Ok(())
}
