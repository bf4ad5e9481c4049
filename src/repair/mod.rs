//! Whole-file repair passes
//!
//! Each pass reads an export, runs the designated columns of every record
//! through the normalizer and writes the records back out in their original
//! order.

pub mod csv_repair;
pub mod json_repair;

pub use csv_repair::repair_csv;
pub use json_repair::{
    read_json_records, repair_json, repair_json_records, write_json_records, JsonOutput,
};

use crate::columns::ColumnSchema;
use crate::row::CellChange;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

/// Configuration for a repair pass
#[derive(Debug, Clone)]
pub struct RepairConfig {
    /// Which columns hold JSON arrays / objects
    pub schema: ColumnSchema,

    /// Drop CSV rows whose cells are all blank
    pub drop_blank_rows: bool,

    /// Insert `[]` / `{}` for designated fields absent from a JSON record
    pub fill_missing: bool,
}

impl Default for RepairConfig {
    fn default() -> Self {
        RepairConfig {
            schema: ColumnSchema::default(),
            drop_blank_rows: true,
            fill_missing: false,
        }
    }
}

/// Counters reported at the end of a pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepairStats {
    pub rows_read: usize,
    pub rows_written: usize,
    pub blank_rows_dropped: usize,
    pub rows_changed: usize,
    pub cells_changed: usize,
}

impl RepairStats {
    fn record_changes(&mut self, changes: &[CellChange]) {
        for change in changes {
            log::debug!("{}", change);
        }
        if !changes.is_empty() {
            self.rows_changed += 1;
            self.cells_changed += changes.len();
        }
    }

    pub fn log_summary(&self, source: &str) {
        log::info!(
            "{}: {} rows read, {} written, {} blank dropped, {} rows changed ({} cells)",
            source,
            self.rows_read,
            self.rows_written,
            self.blank_rows_dropped,
            self.rows_changed,
            self.cells_changed,
        );
    }

    /// Write the counters as a pretty-printed JSON object
    pub fn write_json<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, self).context("Failed to serialize stats")?;
        writeln!(writer).context("Failed to write stats")?;
        writer.flush().context("Failed to flush stats")
    }
}
