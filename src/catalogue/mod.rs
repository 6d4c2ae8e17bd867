// src/catalogue/mod.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::Path};
use tracing::debug;

use crate::error::ScrapeError;

pub mod arrow;
pub mod types;

pub use self::arrow::{build_arrow_schema, map_to_arrow_type};
pub use types::{CatalogueEntry, ColumnSpec, ColumnType, DATA_SOURCE_COLUMN, SOURCE_URL_COLUMN};

/// Every dataset category the scraper knows about, keyed by category id.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct Catalogue {
    entries: BTreeMap<String, CatalogueEntry>,
}

impl Catalogue {
    /// Read and validate a YAML catalogue from disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading catalogue {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("loading catalogue {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let catalogue: Catalogue =
            serde_yaml::from_str(text).context("parsing catalogue YAML")?;
        for (category, entry) in &catalogue.entries {
            entry.validate(category)?;
            debug!(
                category,
                columns = entry.columns.len(),
                partitions = entry.partitions.len(),
                "catalogue entry loaded"
            );
        }
        Ok(catalogue)
    }

    pub fn entry(&self, category: &str) -> Result<&CatalogueEntry, ScrapeError> {
        self.entries
            .get(category)
            .ok_or_else(|| ScrapeError::UnknownCategory(category.to_string()))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[cfg(test)]
pub(crate) const SAMPLE_YAML: &str = r#"
shipment:
  name: "1.都道府県別出荷頭数累年統計"
  columns:
    year:
      source_label: "年次"
      column_type: str_year
    pig:
      source_label: "豚(頭数)"
      column_type: qty
    cattle:
      source_label: "牛計(頭数)"
      column_type: qty
    remark:
      source_label: "備考"
  partition:
    00.All: "http://stat.example/all.xlsx"
    01.Hokkaido: "http://stat.example/hokkaido.xlsx"
"#;
