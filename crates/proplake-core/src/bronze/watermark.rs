//! Raw-tier watermark resolution.
//!
//! The watermark is the latest `dates.published_at` already durably landed
//! in the raw table. An absent, unreadable, or empty table yields no
//! watermark; the extraction window then falls back to its fixed floor.
//! Read faults are soft: an append-only table cannot be corrupted by a
//! failed read, so they resolve the same as "does not exist yet".

use crate::coerce::parse_datetime;
use crate::schema::PUBLISHED_AT_RAW;
use crate::store::{PartitionedTable, TableState};
use arrow::array::{Array, StringArray};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDateTime;
use tracing::{debug, warn};

/// Resolve the raw table's watermark: `max(dates.published_at)` over every
/// row, or `None` when the table is absent, unreadable, or empty.
pub async fn resolve_watermark(table: &PartitionedTable) -> Option<NaiveDateTime> {
    match table.probe().await {
        TableState::Present => {}
        state => {
            debug!(prefix = %table.prefix(), state = ?state, "No watermark available");
            return None;
        }
    }

    let batches = match table.read_all().await {
        Ok(batches) => batches,
        Err(e) => {
            warn!(prefix = %table.prefix(), error = %e, "Watermark read failed, treating table as absent");
            return None;
        }
    };

    let mark = max_published_at(&batches);
    debug!(prefix = %table.prefix(), watermark = ?mark, "Resolved watermark");
    mark
}

/// Scan batches for the maximum parseable `dates.published_at` value.
pub fn max_published_at(batches: &[RecordBatch]) -> Option<NaiveDateTime> {
    let mut max: Option<NaiveDateTime> = None;

    for batch in batches {
        let Ok(column_index) = batch.schema().index_of(PUBLISHED_AT_RAW) else {
            continue;
        };
        let Some(values) = batch
            .column(column_index)
            .as_any()
            .downcast_ref::<StringArray>()
        else {
            continue;
        };

        for row in 0..values.len() {
            if values.is_null(row) {
                continue;
            }
            if let Some(dt) = parse_datetime(values.value(row)) {
                if max.map_or(true, |m| dt > m) {
                    max = Some(dt);
                }
            }
        }
    }

    max
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::bronze_schema;
    use crate::store::PartitionedTable;
    use arrow::array::{ArrayRef, Date32Array, Float64Array, StringArray};
    use arrow::datatypes::DataType;
    use chrono::NaiveDate;
    use object_store::local::LocalFileSystem;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Build a bronze-schema batch with the given published_at strings and
    /// nulls everywhere else.
    fn bronze_batch(published_at: &[Option<&str>]) -> RecordBatch {
        let schema = bronze_schema();
        let rows = published_at.len();

        let columns: Vec<ArrayRef> = schema
            .fields()
            .iter()
            .map(|field| match field.data_type() {
                DataType::Utf8 => {
                    let values: Vec<Option<String>> = if field.name() == PUBLISHED_AT_RAW {
                        published_at.iter().map(|v| v.map(String::from)).collect()
                    } else {
                        vec![None; rows]
                    };
                    Arc::new(StringArray::from(values)) as ArrayRef
                }
                DataType::Float64 => {
                    Arc::new(Float64Array::from(vec![None::<f64>; rows])) as ArrayRef
                }
                DataType::Date32 => {
                    Arc::new(Date32Array::from(vec![None::<i32>; rows])) as ArrayRef
                }
                other => panic!("unexpected bronze type {other:?}"),
            })
            .collect();

        RecordBatch::try_new(schema, columns).unwrap()
    }

    #[test]
    fn test_max_published_at_mixed_formats() {
        let batch = bronze_batch(&[
            Some("2024-03-15T10:30:45"),
            Some("2024-03-16 08:00:00"),
            Some("garbage"),
            None,
        ]);
        let max = max_published_at(&[batch]).unwrap();
        assert_eq!(max.to_string(), "2024-03-16 08:00:00");
    }

    #[test]
    fn test_max_published_at_empty() {
        assert_eq!(max_published_at(&[]), None);
        assert_eq!(max_published_at(&[bronze_batch(&[])]), None);
    }

    #[tokio::test]
    async fn test_resolve_watermark_absent_table() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(LocalFileSystem::new_with_prefix(dir.path()).unwrap());
        let table = PartitionedTable::new(store, "bronze/realestateapi");

        assert_eq!(resolve_watermark(&table).await, None);
    }

    #[tokio::test]
    async fn test_resolve_watermark_after_append() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(LocalFileSystem::new_with_prefix(dir.path()).unwrap());
        let table = PartitionedTable::new(store, "bronze/realestateapi");

        let partition = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let batch = bronze_batch(&[Some("2024-03-15T10:30:45"), Some("2024-03-15T09:00:00")]);
        table.append(partition, &batch).await.unwrap();

        let mark = resolve_watermark(&table).await.unwrap();
        assert_eq!(mark.to_string(), "2024-03-15 10:30:45");
    }
}
