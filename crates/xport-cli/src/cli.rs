//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};

#[derive(Parser)]
#[command(
    name = "xport",
    version,
    about = "Read SAS XPORT (v5/v6) transport files",
    long_about = "Inspect and export SAS XPORT transport files.\n\n\
                  Prints variable and dataset metadata as JSON, streams rows\n\
                  with projection and filtering, collects unique column values,\n\
                  and exports datasets to CSV."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print variable metadata as JSON.
    Metadata(MetadataArgs),

    /// Print rows as JSON lines.
    Data(DataArgs),

    /// Collect unique values for columns.
    Unique(UniqueArgs),

    /// Export the dataset to CSV.
    Csv(CsvArgs),
}

#[derive(Parser)]
pub struct MetadataArgs {
    /// Path to the transport file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print dataset-level metadata (record estimate, columns, source
    /// system) instead of the per-variable list.
    #[arg(long = "dataset")]
    pub dataset: bool,
}

#[derive(Parser)]
pub struct DataArgs {
    /// Path to the transport file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Columns to keep, case-insensitive (default: all).
    #[arg(long = "keep", value_name = "COLUMN", num_args = 1..)]
    pub keep: Vec<String>,

    /// Number of rows to skip.
    #[arg(long = "start", value_name = "N", default_value_t = 0)]
    pub start: usize,

    /// Maximum number of rows to print.
    #[arg(long = "limit", value_name = "N")]
    pub limit: Option<usize>,

    /// Emit rows as name/value objects instead of arrays.
    #[arg(long = "object")]
    pub object: bool,

    /// Round numeric values to this many decimal places.
    #[arg(long = "round", value_name = "DECIMALS")]
    pub round: Option<u32>,

    /// Text encoding label for character columns (e.g. windows-1252).
    #[arg(long = "encoding", value_name = "LABEL")]
    pub encoding: Option<String>,
}

#[derive(Parser)]
pub struct UniqueArgs {
    /// Path to the transport file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Columns to collect, case-insensitive.
    #[arg(long = "columns", value_name = "COLUMN", num_args = 1.., required = true)]
    pub columns: Vec<String>,

    /// Cap on distinct values per column (0 collects all).
    #[arg(long = "limit", value_name = "N", default_value_t = 0)]
    pub limit: usize,

    /// Also count occurrences per value.
    #[arg(long = "counts")]
    pub counts: bool,

    /// Sort values instead of first-seen order.
    #[arg(long = "sort")]
    pub sort: bool,
}

#[derive(Parser)]
pub struct CsvArgs {
    /// Path to the transport file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Directory to write `<DATASET>.csv` into.
    #[arg(value_name = "OUT_DIR")]
    pub out_dir: PathBuf,

    /// Columns to keep, case-insensitive (default: all).
    #[arg(long = "keep", value_name = "COLUMN", num_args = 1..)]
    pub keep: Vec<String>,

    /// Omit the header line.
    #[arg(long = "no-header")]
    pub no_header: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_data_args() {
        let cli = Cli::parse_from([
            "xport", "data", "dm.xpt", "--keep", "POP", "SEEDWT", "--limit", "5", "--object",
        ]);
        let Command::Data(args) = cli.command else {
            panic!("expected data subcommand");
        };
        assert_eq!(args.keep, vec!["POP", "SEEDWT"]);
        assert_eq!(args.limit, Some(5));
        assert!(args.object);
    }

    #[test]
    fn test_unique_requires_columns() {
        assert!(Cli::try_parse_from(["xport", "unique", "dm.xpt"]).is_err());
    }
}
