//! gamescrub-csv: Repair the JSON columns of a board-game CSV export
//!
//! Usage:
//!   # Read from file, write to another file
//!   gamescrub-csv games.csv -o games_fixed.csv
//!
//!   # Read from stdin, write to stdout, log every rewritten cell
//!   cat games.csv | gamescrub-csv -v > games_fixed.csv
//!
//!   # Treat extra columns as JSON arrays
//!   gamescrub-csv games.csv -o out.csv --array-columns tags,families

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use gamescrub::{repair_csv, ColumnSchema, RepairConfig, RepairStats};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "gamescrub-csv")]
#[command(about = "Rewrite JSON columns of a CSV export into canonical JSON", long_about = None)]
struct Args {
    /// Input CSV file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output CSV file (use stdout if omitted)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// JSON file with `array_columns` / `object_columns` lists
    /// If omitted, the board-game column classification is used
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Comma-separated extra columns holding JSON arrays
    #[arg(long)]
    array_columns: Option<String>,

    /// Comma-separated extra columns holding JSON objects
    #[arg(long)]
    object_columns: Option<String>,

    /// Keep rows whose cells are all blank
    #[arg(long)]
    keep_blank_rows: bool,

    /// Write the run's counters to this file as JSON
    #[arg(long, value_name = "FILE")]
    stats: Option<PathBuf>,

    /// Increase log verbosity (-v shows every rewritten cell)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut schema = match &args.schema {
        Some(path) => ColumnSchema::from_json_file(path)?,
        None => ColumnSchema::default(),
    };
    schema.apply_overrides(split_list(&args.array_columns), split_list(&args.object_columns))?;

    log::info!("JSON array columns: {:?}", schema.array_columns());
    log::info!("JSON object columns: {:?}", schema.object_columns());

    let config = RepairConfig {
        schema,
        drop_blank_rows: !args.keep_blank_rows,
        ..RepairConfig::default()
    };

    let reader: Box<dyn Read> = if let Some(path) = &args.input {
        let file = File::open(path)
            .with_context(|| format!("Failed to open input: {}", path.display()))?;
        Box::new(BufReader::new(file))
    } else {
        Box::new(BufReader::new(std::io::stdin()))
    };

    let writer: Box<dyn Write> = if let Some(path) = &args.output {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output: {}", path.display()))?;
        Box::new(BufWriter::new(file))
    } else {
        Box::new(BufWriter::new(std::io::stdout()))
    };

    let stats = repair_csv(reader, writer, &config)?;
    if let Some(path) = &args.stats {
        write_stats(path, &stats)?;
    }

    if let Some(path) = &args.output {
        log::info!("wrote {}", path.display());
    }

    Ok(())
}

fn write_stats(path: &Path, stats: &RepairStats) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create stats file: {}", path.display()))?;
    stats.write_json(BufWriter::new(file))
}

fn split_list(list: &Option<String>) -> Vec<String> {
    list.as_deref()
        .map(|list| list.split(',').map(|s| s.trim().to_string()).collect())
        .unwrap_or_default()
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
