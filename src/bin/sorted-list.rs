use std::io;

use anyhow::Result as Result;
use env_logger::Env;

use climate::commands;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let list = commands::run(stdin.lock(), stdout.lock())?;
    log::debug!("released {} entries on exit", list.len());
    Ok(())
}
