// src/process/staging.rs

use anyhow::{Context, Result};
use arrow::{
    compute::concat_batches,
    csv::{ReaderBuilder, WriterBuilder},
    datatypes::SchemaRef,
    record_batch::RecordBatch,
};
use rayon::prelude::*;
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::debug;

const READ_BATCH_SIZE: usize = 8192;

/// Write `batch` as delimited text with a header row.
pub fn write_delimited(batch: &RecordBatch, path: &Path, delimiter: u8) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = WriterBuilder::new()
        .with_header(true)
        .with_delimiter(delimiter)
        .build(BufWriter::new(file));
    writer
        .write(batch)
        .with_context(|| format!("writing {}", path.display()))?;
    writer
        .into_inner()
        .flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    debug!(path = %path.display(), rows = batch.num_rows(), "wrote delimited file");
    Ok(())
}

/// Read one delimited file back against the known cleansed schema.
pub fn read_delimited(path: &Path, schema: SchemaRef, delimiter: u8) -> Result<RecordBatch> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_delimiter(delimiter)
        .with_batch_size(READ_BATCH_SIZE)
        .build(BufReader::new(file))
        .with_context(|| format!("creating CSV reader for {}", path.display()))?;
    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("reading {}", path.display()))?;
    concat_batches(&schema, &batches).context("concatenating batches")
}

/// Read every staged file in parallel and concatenate them in `paths` order.
pub fn read_all_delimited(paths: &[PathBuf], schema: SchemaRef, delimiter: u8) -> Result<RecordBatch> {
    let batches = paths
        .par_iter()
        .map(|p| read_delimited(p, schema.clone(), delimiter))
        .collect::<Result<Vec<_>>>()?;
    concat_batches(&schema, &batches).context("concatenating staged partitions")
}
