//! # gamescrub - JSON column repair for board-game exports
//!
//! Legacy board-game exports store list and object columns in a mix of
//! encodings: PostgreSQL brace arrays, comma-separated text, real JSON and
//! assorted empty markers. This crate rewrites those cells into canonical
//! JSON so the records can be bulk-imported into JSON/JSONB columns.
//!
//! ## Modules
//!
//! - **normalize**: the cell normalizer (pure, never fails)
//! - **columns**: which columns hold JSON arrays / objects
//! - **row**: a record as ordered column/value pairs
//! - **repair**: whole-file passes over CSV and JSON exports
//!
//! ## Quick Start
//!
//! ### Normalizing a cell
//!
//! ```rust
//! use gamescrub::{normalize_cell, ColumnKind};
//!
//! let categories = normalize_cell("{Strategy,Family}", ColumnKind::JsonArray);
//! assert_eq!(categories, r#"["Strategy","Family"]"#);
//! assert_eq!(normalize_cell("Chess", ColumnKind::JsonArray), r#"["Chess"]"#);
//! assert_eq!(normalize_cell("not an object", ColumnKind::JsonObject), "{}");
//! ```
//!
//! ### Repairing a CSV export
//!
//! ```rust
//! use gamescrub::{repair_csv, RepairConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let input = "title,designers\nAgricola,Uwe Rosenberg\n";
//! let mut output = Vec::new();
//! let stats = repair_csv(input.as_bytes(), &mut output, &RepairConfig::default())?;
//!
//! assert_eq!(stats.cells_changed, 1);
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

pub mod columns;
pub mod normalize;
pub mod repair;
pub mod row;

// Re-export commonly used types for convenience
pub use columns::{ColumnPlan, ColumnSchema, SchemaError};
pub use normalize::{
    normalize_array, normalize_cell, normalize_object, normalize_value, ColumnKind,
};
pub use repair::{repair_csv, repair_json, JsonOutput, RepairConfig, RepairStats};
pub use row::{CellChange, Row};

/// Repair a CSV file on disk, writing the result to `output`
pub fn repair_csv_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    config: &RepairConfig,
) -> Result<RepairStats> {
    let input = input.as_ref();
    let output = output.as_ref();

    let reader = File::open(input)
        .with_context(|| format!("Failed to open input: {}", input.display()))?;
    let writer = File::create(output)
        .with_context(|| format!("Failed to create output: {}", output.display()))?;

    repair_csv(BufReader::new(reader), BufWriter::new(writer), config)
}
