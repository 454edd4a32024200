//! XPORT reader CLI.

use clap::Parser;

mod cli;
mod commands;
mod logging;

use crate::cli::{Cli, Command};
use crate::commands::{run_csv, run_data, run_metadata, run_unique};

fn main() {
    let cli = Cli::parse();
    logging::init_logging(
        cli.verbosity.tracing_level_filter(),
        cli.verbosity.is_present(),
    );

    let result = match &cli.command {
        Command::Metadata(args) => run_metadata(args),
        Command::Data(args) => run_data(args),
        Command::Unique(args) => run_unique(args),
        Command::Csv(args) => run_csv(args),
    };

    if let Err(error) = result {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}
