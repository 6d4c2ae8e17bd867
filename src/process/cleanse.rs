// src/process/cleanse.rs

use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, StringArray},
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::debug;

use super::format::{format_raw_qty, format_raw_str_year};
use super::RawTable;
use crate::catalogue::{build_arrow_schema, CatalogueEntry, ColumnType};
use crate::error::ScrapeError;

/// Turn a freshly fetched sheet into a typed, tagged partition table.
///
/// Drops the first `entry.skip_rows` rows and every row without a year,
/// routes each column through its formatter, then appends the
/// `data_source`, partition and `source_url` columns.
#[tracing::instrument(level = "debug", skip(raw, entry, url), fields(rows = raw.rows.len()))]
pub fn cleanse_partition(
    raw: &RawTable,
    entry: &CatalogueEntry,
    partition_id: &str,
    url: &str,
) -> Result<RecordBatch> {
    if raw.headers.len() != entry.columns.len() {
        return Err(ScrapeError::ColumnCount {
            expected: entry.columns.len(),
            found: raw.headers.len(),
        }
        .into());
    }
    let (year_idx, _) = entry
        .year_column()
        .ok_or_else(|| ScrapeError::InvalidCatalogue {
            category: entry.name.clone(),
            reason: "no str_year column".into(),
        })?;
    if let Some(short) = raw.rows.iter().find(|row| row.len() != entry.columns.len()) {
        return Err(ScrapeError::ColumnCount {
            expected: entry.columns.len(),
            found: short.len(),
        }
        .into());
    }

    // 1) row filter: past the title block, and carrying a year
    let kept: Vec<&Vec<Option<String>>> = raw
        .rows
        .iter()
        .enumerate()
        .filter(|(idx, row)| *idx >= entry.skip_rows && row[year_idx].is_some())
        .map(|(_, row)| row)
        .collect();
    debug!(
        kept = kept.len(),
        dropped = raw.rows.len() - kept.len(),
        "filtered rows"
    );

    // 2) per-column formatting
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(entry.columns.len() + 3);
    for (i, spec) in entry.columns.iter().enumerate() {
        let text: StringArray = kept.iter().map(|row| row[i].as_deref()).collect();
        let col: ArrayRef = match spec.column_type {
            ColumnType::StrYear => Arc::new(
                format_raw_str_year(&text)
                    .with_context(|| format!("formatting column `{}`", spec.name))?,
            ),
            ColumnType::Qty => Arc::new(
                format_raw_qty(&text)
                    .with_context(|| format!("formatting column `{}`", spec.name))?,
            ),
            ColumnType::Text => Arc::new(text),
        };
        columns.push(col);
    }

    // 3) metadata tags
    let n = kept.len();
    for value in [entry.name.as_str(), partition_id, url] {
        columns.push(Arc::new(StringArray::from(vec![value; n])) as ArrayRef);
    }

    RecordBatch::try_new(build_arrow_schema(entry), columns)
        .context("building cleansed partition batch")
}
