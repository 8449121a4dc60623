//! declgen CLI: generate a declaration tree from a program image.

use anyhow::Result;
use clap::Parser;
use declgen::engine::arg_parser::Cli;
use declgen::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
