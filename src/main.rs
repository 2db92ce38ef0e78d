//! Parafs CLI: profile, search and copy large trees in parallel.

use anyhow::Result;
use clap::Parser;
use parafs::engine::arg_parser::Cli;
use parafs::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
