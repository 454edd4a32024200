//! Subcommand implementations.

use std::io::Write;

use anyhow::Context;
use tracing::info;
use xport_core::{Library, ReadOptions, RowFormat, UniqueOptions};

use crate::cli::{CsvArgs, DataArgs, MetadataArgs, UniqueArgs};

/// Print variable or dataset metadata as pretty JSON.
pub fn run_metadata(args: &MetadataArgs) -> anyhow::Result<()> {
    let mut library = Library::new(&args.file);
    let json = if args.dataset {
        serde_json::to_string_pretty(&library.get_dataset_metadata()?)?
    } else {
        serde_json::to_string_pretty(&library.get_metadata()?)?
    };
    println!("{json}");
    Ok(())
}

/// Stream rows to stdout as JSON lines.
pub fn run_data(args: &DataArgs) -> anyhow::Result<()> {
    let mut options = ReadOptions::new()
        .with_keep(args.keep.clone())
        .with_start(args.start)
        .skip_header();
    if args.object {
        options = options.with_row_format(RowFormat::Object);
    }
    if let Some(limit) = args.limit {
        options = options.with_length(limit);
    }
    if let Some(round) = args.round {
        options = options.with_round_precision(round);
    }
    if let Some(encoding) = &args.encoding {
        options = options.with_encoding(encoding.clone());
    }

    let mut library = Library::new(&args.file);
    let cursor = library.read(options)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut printed = 0u64;
    for row in cursor {
        let row = row?;
        serde_json::to_writer(&mut out, &row)?;
        out.write_all(b"\n")?;
        printed += 1;
    }
    out.flush()?;
    info!(rows = printed, "done");
    Ok(())
}

/// Print unique column values as pretty JSON.
pub fn run_unique(args: &UniqueArgs) -> anyhow::Result<()> {
    let mut options = UniqueOptions::new(args.columns.clone()).with_limit(args.limit);
    if args.counts {
        options = options.with_counts();
    }
    if args.sort {
        options = options.sorted();
    }

    let mut library = Library::new(&args.file);
    let unique = library.get_unique_values(&options)?;
    println!("{}", serde_json::to_string_pretty(&unique)?);
    Ok(())
}

/// Export the dataset to CSV files under the output directory.
pub fn run_csv(args: &CsvArgs) -> anyhow::Result<()> {
    let mut options = ReadOptions::new().with_keep(args.keep.clone());
    if args.no_header {
        options = options.skip_header();
    }

    let mut library = Library::new(&args.file);
    let written = library
        .to_csv(&args.out_dir, options)
        .with_context(|| format!("writing CSV to {}", args.out_dir.display()))?;
    for path in &written {
        println!("{}", path.display());
    }
    info!(files = written.len(), "CSV export complete");
    Ok(())
}
