//! Date-partitioned parquet tables over object storage.
//!
//! A table is a prefix in an object store holding parquet files laid out as
//! `{prefix}/published_date=YYYY-MM-DD/part-{uuid}.parquet`. The bronze tier
//! only ever appends; the silver tier additionally rewrites itself through
//! [`PartitionedTable::replace_all`] when a keyed merge lands.

use crate::coerce::date_to_days;
use crate::schema::PARTITION_COLUMN;
use crate::{Result, StoreError};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use chrono::NaiveDate;
use futures::TryStreamExt;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Existence state of a table, probed without failure-as-control-flow.
///
/// Read faults during the probe resolve to `Absent`: an append-only store
/// cannot be corrupted by a failed read, so an unreadable table is treated
/// the same as one that was never written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    /// No data files under the table prefix
    Absent,
    /// Data files exist but hold zero rows
    Empty,
    /// Data files with rows exist
    Present,
}

/// Handle to one date-partitioned parquet table.
pub struct PartitionedTable {
    store: Arc<dyn ObjectStore>,
    prefix: ObjectPath,
}

impl PartitionedTable {
    /// Create a handle for the table under `prefix`.
    pub fn new(store: Arc<dyn ObjectStore>, prefix: &str) -> Self {
        Self {
            store,
            prefix: ObjectPath::from(prefix),
        }
    }

    /// Table prefix within the object store.
    pub fn prefix(&self) -> &ObjectPath {
        &self.prefix
    }

    /// Probe the table's existence state.
    pub async fn probe(&self) -> TableState {
        let files = match self.list_data_files().await {
            Ok(files) => files,
            Err(e) => {
                warn!(prefix = %self.prefix, error = %e, "Probe list failed, treating table as absent");
                return TableState::Absent;
            }
        };

        if files.is_empty() {
            return TableState::Absent;
        }

        let mut total_rows: i64 = 0;
        for path in &files {
            match self.read_file_row_count(path).await {
                Ok(rows) => total_rows += rows,
                Err(e) => {
                    warn!(path = %path, error = %e, "Probe read failed, treating table as absent");
                    return TableState::Absent;
                }
            }
        }

        if total_rows == 0 {
            TableState::Empty
        } else {
            TableState::Present
        }
    }

    /// Append one batch under a partition. Never touches existing files; the
    /// table and partition layout come into being on first write.
    pub async fn append(&self, partition: NaiveDate, batch: &RecordBatch) -> Result<String> {
        let bytes = encode_parquet(batch)?;
        let path = self.partition_file_path(partition);

        self.store
            .put(&path, PutPayload::from_bytes(bytes))
            .await
            .map_err(|e| StoreError::Write {
                path: path.to_string(),
                message: e.to_string(),
            })?;

        debug!(
            path = %path,
            rows = batch.num_rows(),
            "Appended partition file"
        );

        Ok(path.to_string())
    }

    /// Read every record batch in the table.
    pub async fn read_all(&self) -> Result<Vec<RecordBatch>> {
        let files = self.list_data_files().await?;
        let mut batches = Vec::new();

        for path in files {
            let bytes = self.read_file(&path).await?;
            let reader = ParquetRecordBatchReaderBuilder::try_new(bytes)
                .map_err(|e| StoreError::Parquet(e.to_string()))?
                .build()
                .map_err(|e| StoreError::Parquet(e.to_string()))?;

            for batch in reader {
                batches.push(batch.map_err(|e| StoreError::Parquet(e.to_string()))?);
            }
        }

        Ok(batches)
    }

    /// Replace the table's entire contents with the given partitioned
    /// batches. New files are written before the old ones are deleted; used
    /// only by the curated tier's merge rewrite under the single-writer
    /// assumption.
    pub async fn replace_all(&self, partitions: &[(NaiveDate, RecordBatch)]) -> Result<()> {
        let old_files = self.list_data_files().await?;

        for (partition, batch) in partitions {
            self.append(*partition, batch).await?;
        }

        for path in old_files {
            self.store
                .delete(&path)
                .await
                .map_err(|e| StoreError::Delete {
                    path: path.to_string(),
                    message: e.to_string(),
                })?;
        }

        Ok(())
    }

    /// List the table's parquet data files.
    async fn list_data_files(&self) -> Result<Vec<ObjectPath>> {
        let metas: Vec<_> = self
            .store
            .list(Some(&self.prefix))
            .try_collect()
            .await
            .map_err(|e| StoreError::List {
                prefix: self.prefix.to_string(),
                message: e.to_string(),
            })?;

        let mut files: Vec<ObjectPath> = metas
            .into_iter()
            .map(|meta| meta.location)
            .filter(|path| path.as_ref().ends_with(".parquet"))
            .collect();
        files.sort_unstable_by(|a, b| a.as_ref().cmp(b.as_ref()));
        Ok(files)
    }

    async fn read_file(&self, path: &ObjectPath) -> Result<Bytes> {
        let result = self.store.get(path).await.map_err(|e| StoreError::Read {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        result.bytes().await.map_err(|e| {
            StoreError::Read {
                path: path.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    async fn read_file_row_count(&self, path: &ObjectPath) -> Result<i64> {
        let bytes = self.read_file(path).await?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(bytes)
            .map_err(|e| StoreError::Parquet(e.to_string()))?;
        Ok(builder.metadata().file_metadata().num_rows())
    }

    fn partition_file_path(&self, partition: NaiveDate) -> ObjectPath {
        ObjectPath::from(format!(
            "{}/{}={}/part-{}.parquet",
            self.prefix,
            PARTITION_COLUMN,
            partition.format("%Y-%m-%d"),
            Uuid::new_v4()
        ))
    }
}

/// Encode one record batch as Snappy-compressed parquet bytes.
fn encode_parquet(batch: &RecordBatch) -> Result<Bytes> {
    let mut buffer = Cursor::new(Vec::new());

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(&mut buffer, batch.schema(), Some(props))
        .map_err(|e| StoreError::Parquet(e.to_string()))?;
    writer
        .write(batch)
        .map_err(|e| StoreError::Parquet(e.to_string()))?;
    writer
        .close()
        .map_err(|e| StoreError::Parquet(e.to_string()))?;

    Ok(Bytes::from(buffer.into_inner()))
}

/// Group row indexes by partition date, preserving row order inside each
/// partition.
pub fn group_by_partition(dates: &[NaiveDate]) -> Vec<(NaiveDate, Vec<usize>)> {
    let mut groups: Vec<(NaiveDate, Vec<usize>)> = Vec::new();
    for (index, date) in dates.iter().enumerate() {
        match groups.iter_mut().find(|(d, _)| d == date) {
            Some((_, rows)) => rows.push(index),
            None => groups.push((*date, vec![index])),
        }
    }
    groups.sort_unstable_by_key(|(d, _)| date_to_days(*d));
    groups
}
