// src/scraper.rs

use anyhow::{Context, Result};
use arrow::{datatypes::SchemaRef, record_batch::RecordBatch};
use chrono::Utc;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

use crate::catalogue::{build_arrow_schema, Catalogue, CatalogueEntry};
use crate::datasets;
use crate::error::ScrapeError;
use crate::fetch::PartitionFetcher;
use crate::process::{cleanse_partition, staging};

const EXPORT_DELIMITER: u8 = b',';
const STAGING_DELIMITER: u8 = b'\t';

/// Scrape, cleanse and package every partition of one dataset category.
pub struct Scraper<F: PartitionFetcher> {
    category: String,
    entry: CatalogueEntry,
    fetcher: F,
    datasets_root: PathBuf,
}

impl<F: PartitionFetcher> Scraper<F> {
    pub fn new(
        category: &str,
        catalogue: &Catalogue,
        fetcher: F,
        datasets_root: impl Into<PathBuf>,
    ) -> Result<Self> {
        let entry = catalogue.entry(category)?.clone();
        Ok(Self {
            category: category.to_string(),
            entry,
            fetcher,
            datasets_root: datasets_root.into(),
        })
    }

    /// Schema every cleansed partition of this category shares.
    pub fn schema(&self) -> SchemaRef {
        build_arrow_schema(&self.entry)
    }

    /// Where `package()` writes the artifact.
    pub fn artifact_path(&self) -> PathBuf {
        datasets::artifact_path(&self.datasets_root, &self.category)
    }

    fn partition_url(&self, partition_id: &str) -> Result<&str, ScrapeError> {
        self.entry
            .partition_url(partition_id)
            .ok_or_else(|| ScrapeError::UnknownPartition {
                category: self.category.clone(),
                partition: partition_id.to_string(),
            })
    }

    /// Fetch and cleanse one partition. `Ok(None)` when its URL is not effective.
    #[tracing::instrument(level = "info", skip(self), fields(category = %self.category))]
    pub fn fetch_partition(&self, partition_id: &str) -> Result<Option<RecordBatch>> {
        let url = self.partition_url(partition_id)?;
        let columns = self.entry.column_names();

        let raw = match self.fetcher.fetch(url, &columns)? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let batch = cleanse_partition(&raw, &self.entry, partition_id, url)
            .with_context(|| format!("cleansing {}/{}", self.category, partition_id))?;
        info!(rows = batch.num_rows(), "cleansed partition");
        Ok(Some(batch))
    }

    fn write_partition(
        &self,
        partition_id: &str,
        destination: &Path,
        delimiter: u8,
    ) -> Result<Option<PathBuf>> {
        // 1) <destination>/<category>/
        let dir = destination.join(&self.category);
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

        // 2) fetch + cleanse
        let batch = match self.fetch_partition(partition_id)? {
            Some(b) => b,
            None => return Ok(None),
        };

        // 3) <category>-<partition>.csv
        let path = dir.join(format!("{}-{}.csv", self.category, partition_id));
        staging::write_delimited(&batch, &path, delimiter)?;
        Ok(Some(path))
    }

    /// Write one cleansed partition to `destination/<category>/<category>-<partition>.csv`.
    /// Returns whether anything was written.
    pub fn persist_partition(&self, partition_id: &str, destination: &Path) -> Result<bool> {
        Ok(self
            .write_partition(partition_id, destination, EXPORT_DELIMITER)?
            .is_some())
    }

    /// Persist every catalogue partition; one entry per partition in the result.
    #[tracing::instrument(level = "info", skip(self, destination), fields(category = %self.category))]
    pub fn persist_all_partitions(&self, destination: &Path) -> Result<BTreeMap<String, bool>> {
        let mut result = BTreeMap::new();
        for partition_id in self.entry.partition_ids() {
            let saved = self.persist_partition(partition_id, destination)?;
            result.insert(partition_id.to_string(), saved);
        }
        let saved = result.values().filter(|v| **v).count();
        info!(saved, total = result.len(), "persisted partitions");
        Ok(result)
    }

    /// Merge every reachable partition into one table, in catalogue order.
    #[tracing::instrument(level = "info", skip(self), fields(category = %self.category))]
    pub fn aggregate(&self) -> Result<RecordBatch> {
        let staging_dir = tempfile::Builder::new()
            .prefix(".lpmd-staging-")
            .tempdir()
            .context("creating staging directory")?;

        let mut staged = Vec::new();
        for partition_id in self.entry.partition_ids() {
            match self.write_partition(partition_id, staging_dir.path(), STAGING_DELIMITER)? {
                Some(path) => staged.push(path),
                None => warn!(partition_id, "partition skipped from aggregate"),
            }
        }

        let merged = staging::read_all_delimited(&staged, self.schema(), STAGING_DELIMITER)?;
        staging_dir
            .close()
            .context("removing staging directory")?;

        info!(
            partitions = staged.len(),
            rows = merged.num_rows(),
            "aggregated"
        );
        Ok(merged)
    }

    /// Aggregate and write `<datasets_root>/<category>/<category>.parquet.zstd`.
    #[tracing::instrument(level = "info", skip(self), fields(category = %self.category))]
    pub fn package(&self) -> Result<PathBuf> {
        let path = self.artifact_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }

        let merged = self.aggregate()?;
        let metadata = vec![
            ("lpmd.category".to_string(), self.category.clone()),
            ("lpmd.data_source".to_string(), self.entry.name.clone()),
            (
                "lpmd.partitions".to_string(),
                self.entry.partitions.len().to_string(),
            ),
            ("lpmd.created_at".to_string(), Utc::now().to_rfc3339()),
        ];
        datasets::parquet::write_zstd(&merged, &path, metadata)?;
        Ok(path)
    }
}
