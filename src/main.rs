//! # Tablescope command line
//!
//! ```bash
//! tablescope explore sales.csv --x region --y units --missing drop --dedupe
//! tablescope describe sales.csv
//! tablescope preview sales.csv -n 5
//! ```
//!
//! Reports go to stdout as JSON; logs go to stderr (and to rolling files when
//! `logging.log_dir` is configured).

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout)] // JSON reports are the program's output

mod cli;

use anyhow::Result;
use clap::Parser as _;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    let config = cli::resolve_config(cli.config.as_deref())?;
    tablescope::logging::init(&config.logging)?;

    cli::run_command(cli.command, &config)
}
