// 💾 Tabular Persistence - RecordCollection ⇄ CSV
// Columns are inferred from whatever keys the records carry

use crate::record::{render_value, BookRecord, RecordCollection};
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: Vec<String>,
}

/// A CSV file loaded into memory: header plus records
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub records: RecordCollection,
}

/// Union of field names across all records, in order of first appearance
pub fn column_union(records: &[BookRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();

    for record in records {
        for key in record.keys() {
            if seen.insert(key.to_string()) {
                columns.push(key.to_string());
            }
        }
    }

    columns
}

/// Write records to `path`, overwriting it
///
/// One row per record, absent or missing fields as empty cells. An empty collection
/// produces an empty file: there are no columns to put in a header.
pub fn write_records(path: &Path, records: &[BookRecord]) -> Result<WriteSummary> {
    let columns = column_union(records);

    if columns.is_empty() {
        File::create(path)
            .with_context(|| format!("Failed to create file: {}", path.display()))?;
    } else {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

        writer
            .write_record(&columns)
            .context("Failed to write CSV header")?;

        for (idx, record) in records.iter().enumerate() {
            let row: Vec<String> = columns
                .iter()
                .map(|col| record.get(col).map(render_value).unwrap_or_default())
                .collect();
            writer
                .write_record(&row)
                .with_context(|| format!("Failed to write CSV row {}", idx + 2))?;
        }

        writer.flush().context("Failed to flush CSV writer")?;
    }

    debug!(path = %path.display(), rows = records.len(), columns = columns.len(), "wrote table");

    Ok(WriteSummary {
        path: path.to_path_buf(),
        rows: records.len(),
        columns,
    })
}

/// Load a CSV file: empty cells become null, every other cell stays text
///
/// Short rows are tolerated (trailing columns become null). An empty file yields a
/// table with no columns and no records.
pub fn read_table(path: &Path) -> Result<Table> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let columns: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read CSV header in {}", path.display()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();

    for (line_num, result) in reader.records().enumerate() {
        let row = result.with_context(|| {
            format!("Failed to parse CSV line {} in {}", line_num + 2, path.display())
        })?;

        let mut record = BookRecord::new();
        for (idx, column) in columns.iter().enumerate() {
            match row.get(idx) {
                Some(cell) if !cell.is_empty() => record.set(column, cell),
                _ => record.set(column, Value::Null),
            }
        }
        records.push(record);
    }

    Ok(Table { columns, records })
}

pub fn read_records(path: &Path) -> Result<RecordCollection> {
    Ok(read_table(path)?.records)
}

// ============================================================================
// TESTS
// ============================================================================
