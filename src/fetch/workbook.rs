// src/fetch/workbook.rs

use anyhow::{Context, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;
use tracing::debug;

use crate::error::ScrapeError;
use crate::process::RawTable;

/// Text of one cell, `None` for blanks.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        other => Some(other.to_string()),
    }
}

/// Read the first worksheet of an xls/xlsx/ods body into a `RawTable`.
///
/// The first sheet row is the source header and is skipped; columns are
/// named positionally from `columns`, which must match the sheet width.
pub fn read_workbook(bytes: Vec<u8>, columns: &[String]) -> Result<RawTable> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).context("opening spreadsheet")?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ScrapeError::EmptyWorkbook)?
        .context("reading first worksheet")?;

    if range.is_empty() {
        return Err(ScrapeError::EmptyWorkbook.into());
    }
    if range.width() != columns.len() {
        return Err(ScrapeError::ColumnCount {
            expected: columns.len(),
            found: range.width(),
        }
        .into());
    }

    let mut sheet_rows = range.rows();
    if let Some(header) = sheet_rows.next() {
        let labels: Vec<Option<String>> = header.iter().map(cell_text).collect();
        debug!(?labels, "source header");
    }
    let rows: Vec<Vec<Option<String>>> = sheet_rows
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    Ok(RawTable {
        headers: columns.to_vec(),
        rows,
    })
}
