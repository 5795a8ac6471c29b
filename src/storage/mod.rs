//! Dataset storage (Arrow/Parquet)
//!
//! Datasets are persisted as flat Parquet files; nothing else is stored.
//!
//! Append-only write pattern:
//! - A store is a list of Arrow batches sharing one schema
//! - New data arrives as whole batches via [`DatasetStore::append_batch`]
//! - Rows are never updated in place; regenerate the dataset instead

use crate::dataset::{dataset_schema, Dataset};
use crate::{Error, Result};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use std::fs::File;
use std::path::Path;
use tracing::info;

/// In-memory batches backed by Parquet files
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    batches: Vec<RecordBatch>,
}

impl DatasetStore {
    /// Create a store from existing batches
    #[must_use]
    pub const fn new(batches: Vec<RecordBatch>) -> Self {
        Self { batches }
    }

    /// Store holding a single batch converted from `dataset`
    ///
    /// # Errors
    /// Returns error if the dataset cannot be converted to Arrow
    pub fn from_dataset(dataset: &Dataset) -> Result<Self> {
        Ok(Self::new(vec![dataset.to_record_batch()?]))
    }

    /// Load a Parquet file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load_parquet<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::StorageError(format!("Failed to open Parquet file {}: {e}", path.display()))
        })?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| {
            Error::StorageError(format!("Failed to parse Parquet file: {e}"))
        })?;

        let reader = builder.build().map_err(|e| {
            Error::StorageError(format!("Failed to create Parquet reader: {e}"))
        })?;

        let mut batches = Vec::new();
        for batch in reader {
            let batch = batch.map_err(|e| {
                Error::StorageError(format!("Failed to read record batch: {e}"))
            })?;
            batches.push(batch);
        }

        info!(path = %path.display(), batches = batches.len(), "loaded parquet");
        Ok(Self { batches })
    }

    /// Write all batches to a single Parquet file
    ///
    /// An empty store writes a file with the dataset schema and no rows.
    ///
    /// # Errors
    /// Returns error if the file cannot be created or written
    pub fn save_parquet<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let schema = self
            .batches
            .first()
            .map_or_else(dataset_schema, RecordBatch::schema);

        let file = File::create(path).map_err(|e| {
            Error::StorageError(format!("Failed to create Parquet file {}: {e}", path.display()))
        })?;
        let mut writer = ArrowWriter::try_new(file, schema, None)?;
        for batch in &self.batches {
            writer.write(batch)?;
        }
        writer.close()?;

        info!(path = %path.display(), rows = self.num_rows(), "wrote parquet");
        Ok(())
    }

    /// Get all record batches
    #[must_use]
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Total rows across batches
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// Decode every batch into a [`Dataset`]
    ///
    /// # Errors
    /// Returns error if a batch lacks dataset columns or holds invalid rows
    pub fn to_dataset(&self) -> Result<Dataset> {
        Dataset::from_record_batches(&self.batches)
    }

    /// Append a batch (the only supported write operation)
    ///
    /// # Errors
    ///
    /// Returns error if batch schema doesn't match existing batches
    pub fn append_batch(&mut self, batch: RecordBatch) -> Result<()> {
        if let Some(first) = self.batches.first() {
            let existing_schema = first.schema();
            if batch.schema() != existing_schema {
                return Err(Error::StorageError(format!(
                    "Schema mismatch: expected {:?}, got {:?}",
                    existing_schema,
                    batch.schema()
                )));
            }
        }

        self.batches.push(batch);
        Ok(())
    }

    /// Append a dataset as a new batch
    ///
    /// # Errors
    /// Returns error if conversion fails or schemas differ
    pub fn append_dataset(&mut self, dataset: &Dataset) -> Result<()> {
        self.append_batch(dataset.to_record_batch()?)
    }
}
