// src/datasets/mod.rs

use anyhow::{Context, Result};
use arrow::record_batch::RecordBatch;
use glob::glob;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::error::ScrapeError;

pub mod parquet;

pub const ARTIFACT_EXTENSION: &str = "parquet.zstd";

/// `<root>/<category>/<category>.parquet.zstd`
pub fn artifact_path(root: &Path, category: &str) -> PathBuf {
    root.join(category)
        .join(format!("{}.{}", category, ARTIFACT_EXTENSION))
}

fn existing_artifact(root: &Path, category: &str) -> Result<PathBuf> {
    let path = artifact_path(root, category);
    if !path.is_file() {
        return Err(ScrapeError::DatasetNotFound(path.display().to_string()).into());
    }
    Ok(path)
}

/// Load the full packaged dataset for `category`.
pub fn load(root: &Path, category: &str) -> Result<RecordBatch> {
    let path = existing_artifact(root, category)?;
    parquet::read_all(&path).with_context(|| format!("loading dataset {}", category))
}

/// Provenance recorded when the dataset was packaged.
pub fn metadata(root: &Path, category: &str) -> Result<BTreeMap<String, String>> {
    let path = existing_artifact(root, category)?;
    parquet::read_metadata(&path)
}

/// Categories that have a packaged artifact under `root`, sorted.
pub fn available(root: &Path) -> Result<Vec<String>> {
    let pattern = format!("{}/*/*.{}", root.display(), ARTIFACT_EXTENSION);
    let mut out = Vec::new();
    for entry in glob(&pattern)? {
        let path = entry?;
        let category = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str());
        if let Some(category) = category {
            if path == artifact_path(root, category) {
                out.push(category.to_string());
            }
        }
    }
    out.sort();
    Ok(out)
}
