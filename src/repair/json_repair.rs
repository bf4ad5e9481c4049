use super::{RepairConfig, RepairStats};
use crate::normalize::normalize_value;
use crate::row::CellChange;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::io::{Read, Write};

/// Output layout for repaired JSON records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonOutput {
    /// A single pretty-printed JSON array
    Pretty,
    /// A single compact JSON array
    Compact,
    /// One compact record per line
    Ndjson,
}

/// Parse an export into records
///
/// A top-level array yields its elements, any other single value yields
/// itself. With `ndjson` set, or when simd-json rejects the input, it is read
/// as a stream of JSON values, one record each. Parse errors carry the line
/// and column reported by `serde_json`.
pub fn read_json_records(content: &[u8], ndjson: bool) -> Result<Vec<Value>> {
    if !ndjson {
        // simd-json parses in place, so keep the original bytes for the fallback
        let mut scratch = content.to_vec();
        match simd_json::serde::from_slice::<Value>(&mut scratch) {
            Ok(Value::Array(records)) => return Ok(records),
            Ok(record) => return Ok(vec![record]),
            Err(err) => {
                log::debug!("simd-json rejected input ({}); reading it as a value stream", err)
            }
        }
    }

    let stream = serde_json::Deserializer::from_slice(content).into_iter::<Value>();
    stream
        .enumerate()
        .map(|(index, record)| {
            record.with_context(|| format!("Failed to parse JSON record {}", index + 1))
        })
        .collect()
}

/// Coerce the designated fields of every record object
///
/// Records that are not objects are passed through untouched.
pub fn repair_json_records(
    records: Vec<Value>,
    config: &RepairConfig,
) -> (Vec<Value>, RepairStats) {
    let mut stats = RepairStats::default();
    let mut repaired = Vec::with_capacity(records.len());

    for record in records {
        stats.rows_read += 1;
        let record = match record {
            Value::Object(mut fields) => {
                let changes = repair_fields(&mut fields, config, stats.rows_read);
                stats.record_changes(&changes);
                Value::Object(fields)
            }
            other => {
                log::warn!(
                    "record {} is not a JSON object; leaving it unchanged",
                    stats.rows_read
                );
                other
            }
        };
        repaired.push(record);
        stats.rows_written += 1;
    }

    (repaired, stats)
}

fn repair_fields(
    fields: &mut Map<String, Value>,
    config: &RepairConfig,
    row_number: usize,
) -> Vec<CellChange> {
    let mut changes = Vec::new();

    for (column, kind) in config.schema.iter() {
        match fields.get_mut(column) {
            Some(value) => {
                let before = value.take();
                let after = normalize_value(before.clone(), kind);
                if after != before {
                    changes.push(CellChange {
                        row: row_number,
                        column: column.to_string(),
                        before: before.to_string(),
                        after: after.to_string(),
                    });
                }
                *value = after;
            }
            None if config.fill_missing => {
                if let Some(empty) = kind.empty_value() {
                    changes.push(CellChange {
                        row: row_number,
                        column: column.to_string(),
                        before: String::new(),
                        after: empty.to_string(),
                    });
                    fields.insert(column.to_string(), empty);
                }
            }
            None => {}
        }
    }

    changes
}

pub fn write_json_records<W: Write>(
    mut writer: W,
    records: &[Value],
    output: JsonOutput,
) -> Result<()> {
    match output {
        JsonOutput::Pretty => {
            serde_json::to_writer_pretty(&mut writer, records)
                .context("Failed to write JSON output")?;
            writeln!(writer).context("Failed to write JSON output")?;
        }
        JsonOutput::Compact => {
            serde_json::to_writer(&mut writer, records)
                .context("Failed to write JSON output")?;
            writeln!(writer).context("Failed to write JSON output")?;
        }
        JsonOutput::Ndjson => {
            for record in records {
                let line = serde_json::to_string(record).context("Failed to serialize record")?;
                writeln!(writer, "{}", line).context("Failed to write record")?;
            }
        }
    }
    writer.flush().context("Failed to flush JSON output")
}

/// Read, repair and write a JSON export in one go
pub fn repair_json<R: Read, W: Write>(
    mut reader: R,
    writer: W,
    config: &RepairConfig,
    ndjson_input: bool,
    output: JsonOutput,
) -> Result<RepairStats> {
    let mut content = Vec::new();
    reader
        .read_to_end(&mut content)
        .context("Failed to read JSON input")?;

    let records = read_json_records(&content, ndjson_input)?;
    if records.is_empty() {
        log::warn!("JSON input holds no records");
    }

    let (records, stats) = repair_json_records(records, config);
    write_json_records(writer, &records, output)?;
    stats.log_summary("json");
    Ok(stats)
}
