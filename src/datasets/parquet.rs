// src/datasets/parquet.rs

use anyhow::{Context, Result};
use arrow::{compute::concat_batches, record_batch::RecordBatch};
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter},
    basic::{Compression, ZstdLevel},
    file::{metadata::KeyValue, properties::WriterProperties},
};
use std::{collections::BTreeMap, fs::File, path::Path};
use tracing::{debug, info};

const ZSTD_LEVEL: i32 = 3;
const READ_BATCH_SIZE: usize = 8192;

/// Write `batch` to `path` as a single zstd-compressed Parquet file, with
/// `metadata` stored as file-level key/value pairs.
pub fn write_zstd(batch: &RecordBatch, path: &Path, metadata: Vec<(String, String)>) -> Result<()> {
    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(ZstdLevel::try_new(ZSTD_LEVEL)?))
        .set_key_value_metadata(Some(
            metadata
                .into_iter()
                .map(|(k, v)| KeyValue::new(k, v))
                .collect(),
        ))
        .build();

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .context("creating Parquet writer")?;
    writer.write(batch).context("writing Parquet batch")?;
    writer.close().context("closing Parquet writer")?;

    info!(path = %path.display(), rows = batch.num_rows(), "wrote parquet");
    Ok(())
}

/// Read an entire Parquet file into one batch.
pub fn read_all(path: &Path) -> Result<RecordBatch> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("reading Parquet footer of {}", path.display()))?
        .with_batch_size(READ_BATCH_SIZE);
    let schema = builder.schema().clone();
    let reader = builder.build()?;

    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("decoding {}", path.display()))?;
    debug!(path = %path.display(), batches = batches.len(), "read parquet");
    concat_batches(&schema, &batches).context("concatenating Parquet batches")
}

/// File-level key/value metadata of a Parquet file.
pub fn read_metadata(path: &Path) -> Result<BTreeMap<String, String>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let mut out = BTreeMap::new();
    if let Some(kvs) = builder.metadata().file_metadata().key_value_metadata() {
        for kv in kvs {
            // the embedded Arrow schema is an implementation detail
            if kv.key == "ARROW:schema" {
                continue;
            }
            if let Some(v) = &kv.value {
                out.insert(kv.key.clone(), v.clone());
            }
        }
    }
    Ok(out)
}
