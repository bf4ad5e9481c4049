use super::{RepairConfig, RepairStats};
use crate::row::Row;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::io::{Read, Write};

/// Repair the JSON columns of a CSV export
///
/// The first non-blank record is the header and is written unchanged. Rows may
/// be ragged; short rows stay short and their missing cells are not created.
pub fn repair_csv<R: Read, W: Write>(
    reader: R,
    writer: W,
    config: &RepairConfig,
) -> Result<RepairStats> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut csv_writer = WriterBuilder::new().flexible(true).from_writer(writer);
    let mut stats = RepairStats::default();
    let mut records = csv_reader.records();

    let headers = match next_header(&mut records, config, &mut stats)? {
        Some(headers) => headers,
        None => {
            log::warn!("CSV input is empty; nothing to repair");
            return Ok(stats);
        }
    };

    let plan = config.schema.resolve(&headers);
    for column in &plan.missing {
        log::warn!("column `{}` is not in the CSV header; skipping it", column);
    }

    csv_writer
        .write_record(&headers)
        .context("Failed to write CSV header")?;

    for record in records {
        let record = record.context("Failed to read CSV record")?;
        stats.rows_read += 1;

        let mut row = Row::from_cells(&headers, record.iter());
        if config.drop_blank_rows && row.is_blank() {
            stats.blank_rows_dropped += 1;
            continue;
        }

        let changes = plan.apply(&mut row, stats.rows_read);
        stats.record_changes(&changes);

        csv_writer
            .write_record(row.values())
            .with_context(|| format!("Failed to write CSV row {}", stats.rows_read))?;
        stats.rows_written += 1;
    }

    csv_writer.flush().context("Failed to flush CSV output")?;
    stats.log_summary("csv");
    Ok(stats)
}

fn next_header<I>(
    records: &mut I,
    config: &RepairConfig,
    stats: &mut RepairStats,
) -> Result<Option<Vec<String>>>
where
    I: Iterator<Item = csv::Result<StringRecord>>,
{
    for record in records {
        let record = record.context("Failed to read CSV header")?;
        if config.drop_blank_rows && record.iter().all(|cell| cell.trim().is_empty()) {
            stats.blank_rows_dropped += 1;
            continue;
        }
        return Ok(Some(record.iter().map(str::to_string).collect()));
    }
    Ok(None)
}
