//! CSV input and output for numeric tables.
//!
//! - [`read_csv_table`]: one file → one [`NumericTable`]
//! - [`read_csv_partitions`]: a glob → one table per matching file, read in parallel
//! - [`write_csv_table`]: a table → one file, with an optional header row
//!
//! Cells are parsed as `f64` after trimming whitespace. Errors carry the
//! 1-based record and column numbers.

use crate::error::StatsError;
use crate::io::glob::expand_glob_required;
use crate::table::NumericTable;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use rayon::prelude::*;
use std::fs::{File, create_dir_all};
use std::path::Path;
use tracing::debug;

/// Read a CSV file of numbers into a table.
///
/// If `has_headers` is `true`, the first row is skipped. An empty file
/// yields an empty zero-column table.
///
/// # Errors
/// Fails if the file cannot be opened, a cell is not a number, or a row
/// has a different width from the first ([`StatsError::InvalidInput`]).
pub fn read_csv_table(path: impl AsRef<Path>, has_headers: bool) -> Result<NumericTable> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(f);

    let mut table: Option<NumericTable> = None;
    let mut row: Vec<f64> = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec.with_context(|| format!("read CSV record #{} of {}", i + 1, path.display()))?;
        row.clear();
        for (j, cell) in rec.iter().enumerate() {
            let v: f64 = cell.parse().with_context(|| {
                format!("parse CSV record #{} column #{} ({cell:?}) of {}", i + 1, j + 1, path.display())
            })?;
            row.push(v);
        }
        let t = table.get_or_insert_with(|| NumericTable::new(row.len()));
        if row.len() != t.num_columns() {
            return Err(StatsError::invalid(format!(
                "record #{} of {} has {} values, expected {}",
                i + 1,
                path.display(),
                row.len(),
                t.num_columns()
            ))
            .into());
        }
        t.push_row(&row)?;
    }

    let table = table.unwrap_or_default();
    debug!(path = %path.display(), rows = table.num_rows(), columns = table.num_columns(), "read CSV table");
    Ok(table)
}

/// Read every file matching `pattern` as one partition, in sorted path order.
///
/// # Errors
/// Fails if nothing matches or any file fails as in [`read_csv_table`].
pub fn read_csv_partitions(pattern: &str, has_headers: bool) -> Result<Vec<NumericTable>> {
    let files = expand_glob_required(pattern)?;
    debug!(pattern, files = files.len(), "reading CSV partitions");
    files.par_iter().map(|f| read_csv_table(f, has_headers)).collect()
}

/// Write a table as CSV.
///
/// Creates parent directories as needed. When `header` is given it must name
/// every column.
///
/// # Returns
/// The number of data rows written.
///
/// # Errors
/// Fails if the header width is wrong or the file cannot be written.
pub fn write_csv_table(path: impl AsRef<Path>, table: &NumericTable, header: Option<&[&str]>) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut wtr = WriterBuilder::new().from_writer(f);
    if let Some(h) = header {
        if h.len() != table.num_columns() {
            return Err(StatsError::invalid(format!(
                "header names {} columns, table has {}",
                h.len(),
                table.num_columns()
            ))
            .into());
        }
        wtr.write_record(h).context("write CSV header")?;
    }
    for (i, row) in table.rows().enumerate() {
        wtr.write_record(row.iter().map(f64::to_string))
            .with_context(|| format!("write CSV row #{}", i + 1))?;
    }
    wtr.flush()?;
    Ok(table.num_rows())
}
