// src/catalogue/types.rs

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::{fmt, marker::PhantomData};

use crate::error::ScrapeError;

/// Metadata column holding the catalogue entry's display name.
pub const DATA_SOURCE_COLUMN: &str = "data_source";
/// Metadata column holding the partition's source URL.
pub const SOURCE_URL_COLUMN: &str = "source_url";

fn default_skip_rows() -> usize {
    7
}

fn default_partition_column() -> String {
    "prefecture".to_string()
}

/// How the raw text of a column is normalized during cleansing.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Era-prefixed year such as `平.13(2001)`.
    StrYear,
    /// Head counts and weights, with `…`, `-`, `x` as placeholders.
    Qty,
    /// Anything else is carried through untouched.
    #[default]
    #[serde(other)]
    Text,
}

#[derive(Debug, Deserialize)]
struct ColumnDef {
    #[serde(default)]
    source_label: Option<String>,
    #[serde(default)]
    column_type: ColumnType,
}

/// A single canonical column, in spreadsheet position order.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ColumnSpec {
    pub name: String,
    pub source_label: Option<String>,
    pub column_type: ColumnType,
}

/// One dataset category: its column layout and the partitions to scrape.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogueEntry {
    /// Human-readable name, written to the `data_source` column.
    pub name: String,
    #[serde(deserialize_with = "ordered_columns")]
    pub columns: Vec<ColumnSpec>,
    /// `(partition_id, url)` in catalogue order.
    #[serde(rename = "partition", deserialize_with = "ordered")]
    pub partitions: Vec<(String, String)>,
    /// Leading data rows (title block, notes) dropped before cleansing.
    #[serde(default = "default_skip_rows")]
    pub skip_rows: usize,
    #[serde(default = "default_partition_column")]
    pub partition_column: String,
}

impl CatalogueEntry {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Position and spec of the single `str_year` column; rows without it
    /// are dropped.
    pub fn year_column(&self) -> Option<(usize, &ColumnSpec)> {
        self.columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.column_type == ColumnType::StrYear)
    }

    pub fn partition_url(&self, partition_id: &str) -> Option<&str> {
        self.partitions
            .iter()
            .find(|(id, _)| id == partition_id)
            .map(|(_, url)| url.as_str())
    }

    pub fn partition_ids(&self) -> impl Iterator<Item = &str> {
        self.partitions.iter().map(|(id, _)| id.as_str())
    }

    /// Arrow schema of a cleansed partition of this entry.
    pub fn arrow_schema(&self) -> std::sync::Arc<arrow::datatypes::Schema> {
        super::build_arrow_schema(self)
    }

    /// Names of the three columns appended to every cleansed partition.
    pub fn metadata_columns(&self) -> [&str; 3] {
        [
            DATA_SOURCE_COLUMN,
            self.partition_column.as_str(),
            SOURCE_URL_COLUMN,
        ]
    }

    pub(crate) fn validate(&self, category: &str) -> Result<(), ScrapeError> {
        let invalid = |reason: String| ScrapeError::InvalidCatalogue {
            category: category.to_string(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("empty name".into()));
        }
        if self.columns.is_empty() {
            return Err(invalid("no columns defined".into()));
        }
        let years = self
            .columns
            .iter()
            .filter(|c| c.column_type == ColumnType::StrYear)
            .count();
        if years != 1 {
            return Err(invalid(format!(
                "expected exactly one str_year column, found {}",
                years
            )));
        }
        if self.partitions.is_empty() {
            return Err(invalid("no partitions defined".into()));
        }
        if let Some((id, _)) = self
            .partitions
            .iter()
            .find(|(id, url)| id.trim().is_empty() || url.trim().is_empty())
        {
            return Err(invalid(format!("partition `{}` has an empty id or url", id)));
        }
        for meta in self.metadata_columns() {
            if self.columns.iter().any(|c| c.name == meta) {
                return Err(invalid(format!(
                    "column `{}` collides with a metadata column",
                    meta
                )));
            }
        }
        if self.partition_column == DATA_SOURCE_COLUMN || self.partition_column == SOURCE_URL_COLUMN
        {
            return Err(invalid(format!(
                "partition_column `{}` is reserved",
                self.partition_column
            )));
        }
        Ok(())
    }
}

fn ordered_columns<'de, D>(deserializer: D) -> Result<Vec<ColumnSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    let defs: Vec<(String, ColumnDef)> = ordered(deserializer)?;
    Ok(defs
        .into_iter()
        .map(|(name, def)| ColumnSpec {
            name,
            source_label: def.source_label,
            column_type: def.column_type,
        })
        .collect())
}

/// Deserialize a mapping into `(key, value)` pairs, keeping document order.
fn ordered<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct OrderedVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
        type Value = Vec<(String, V)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a mapping")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut out: Vec<(String, V)> = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, V>()? {
                if out.iter().any(|(seen, _)| *seen == key) {
                    return Err(de::Error::custom(format!("duplicate key `{}`", key)));
                }
                out.push((key, value));
            }
            Ok(out)
        }
    }

    deserializer.deserialize_map(OrderedVisitor(PhantomData))
}
