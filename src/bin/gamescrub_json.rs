//! gamescrub-json: Repair the JSON columns of a board-game JSON export
//!
//! Usage:
//!   # JSON array in, pretty JSON array out
//!   gamescrub-json games.json -o games_fixed.json
//!
//!   # NDJSON in and out, with every designated field present
//!   gamescrub-json --ndjson --fill-missing games.jsonl > fixed.jsonl

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use gamescrub::{repair_json, ColumnSchema, JsonOutput, RepairConfig, RepairStats};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "gamescrub-json")]
#[command(about = "Coerce JSON fields of exported game records", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file (use stdout if omitted)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Read and write newline-delimited JSON (one record per line)
    #[arg(long)]
    ndjson: bool,

    /// Compact output (no pretty-printing); ignored with --ndjson
    #[arg(long)]
    compact: bool,

    /// Insert [] / {} for designated fields a record lacks
    #[arg(long)]
    fill_missing: bool,

    /// JSON file with `array_columns` / `object_columns` lists
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Comma-separated extra fields holding JSON arrays
    #[arg(long)]
    array_columns: Option<String>,

    /// Comma-separated extra fields holding JSON objects
    #[arg(long)]
    object_columns: Option<String>,

    /// Write the run's counters to this file as JSON
    #[arg(long, value_name = "FILE")]
    stats: Option<PathBuf>,

    /// Increase log verbosity (-v shows every rewritten field)
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

    let config = RepairConfig {
        schema,
        fill_missing: args.fill_missing,
        ..RepairConfig::default()
    };

    let output = if args.ndjson {
        JsonOutput::Ndjson
    } else if args.compact {
        JsonOutput::Compact
    } else {
        JsonOutput::Pretty
    };

    let reader: Box<dyn Read> = if let Some(path) = &args.input {
        let file = File::open(path)
            .with_context(|| format!("Failed to open input: {}", path.display()))?;
        Box::new(BufReader::new(file))
    } else {
        Box::new(std::io::stdin())
    };

    let writer: Box<dyn Write> = if let Some(path) = &args.output {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output: {}", path.display()))?;
        Box::new(BufWriter::new(file))
    } else {
        Box::new(BufWriter::new(std::io::stdout()))
    };

    let stats = repair_json(reader, writer, &config, args.ndjson, output)?;
    if let Some(path) = &args.stats {
        write_stats(path, &stats)?;
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
