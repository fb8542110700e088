//! Bronze stage: watermark-bounded extraction into the append-only raw
//! table.
//!
//! One run resolves the watermark, fetches the next window from the source,
//! flattens the nested records, and appends them under their derived
//! `published_date` partitions. The raw tier tolerates duplicates; the keyed
//! merge downstream resolves them.

mod watermark;

pub use watermark::{max_published_at, resolve_watermark};

use crate::coerce::{date_to_days, parse_datetime, parse_f64};
use crate::flatten::{flatten_listings, FlatRow};
use crate::schema::{bronze_schema, column_index, BRONZE_NUMERIC, COLUMNS, PUBLISHED_AT_RAW};
use crate::source::{ExtractionWindow, ListingSource};
use crate::store::{group_by_partition, PartitionedTable};
use crate::{Result, StoreError};
use arrow::array::{ArrayRef, Date32Array, Float64Array, StringArray};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Result of one bronze run.
#[derive(Debug, Clone)]
pub struct BronzeOutcome {
    /// Window the run extracted over
    pub window: ExtractionWindow,
    /// Records returned by the source
    pub extracted: usize,
    /// Rows appended to the raw table
    pub written: usize,
}

impl BronzeOutcome {
    /// True when the window yielded nothing; the silver stage is skipped.
    pub fn is_empty(&self) -> bool {
        self.extracted == 0
    }
}

/// Run the bronze stage once, over the next incremental window.
pub async fn run(source: &dyn ListingSource, table: &PartitionedTable) -> Result<BronzeOutcome> {
    let watermark = resolve_watermark(table).await;
    let window = ExtractionWindow::next_incremental(watermark)?;
    run_window(source, table, window).await
}

/// Run the bronze stage over an explicit window, bypassing the watermark.
///
/// Used for backfills. The raw tier tolerates the duplicate rows a replayed
/// window produces.
pub async fn run_window(
    source: &dyn ListingSource,
    table: &PartitionedTable,
    window: ExtractionWindow,
) -> Result<BronzeOutcome> {
    info!(
        from = %window.from_param(),
        to = %window.to_param(),
        "Extracting listings"
    );

    let listings = source.fetch(&window).await?;
    if listings.is_empty() {
        info!("No new listings in window");
        return Ok(BronzeOutcome {
            window,
            extracted: 0,
            written: 0,
        });
    }

    info!(count = listings.len(), "Extracted listings");

    let rows = flatten_listings(&listings)?;
    let partitions = build_partitions(&rows)?;

    let mut written = 0;
    for (partition, batch) in &partitions {
        written += batch.num_rows();
        table.append(*partition, batch).await?;
    }

    info!(
        rows = written,
        partitions = partitions.len(),
        "Loaded rows into raw table"
    );

    Ok(BronzeOutcome {
        window,
        extracted: listings.len(),
        written,
    })
}

/// Derive per-row partition dates and assemble one bronze batch per
/// partition.
///
/// The partition key is the calendar date of `dates.published_at`, parsed
/// leniently across the source's mixed representations. A row without a
/// usable `published_at` cannot be partitioned and fails the run; nothing
/// has been appended at that point.
pub fn build_partitions(rows: &[FlatRow]) -> Result<Vec<(NaiveDate, RecordBatch)>> {
    let published_index =
        column_index(PUBLISHED_AT_RAW).expect("published_at is a declared column");

    let mut dates = Vec::with_capacity(rows.len());
    for (row_number, row) in rows.iter().enumerate() {
        let date = row[published_index]
            .as_str()
            .and_then(parse_datetime)
            .map(|dt| dt.date())
            .ok_or_else(|| StoreError::Partition(format!(
                "row {row_number} has no parseable {PUBLISHED_AT_RAW}"
            )))?;
        dates.push(date);
    }

    group_by_partition(&dates)
        .into_iter()
        .map(|(date, indexes)| Ok((date, build_batch(rows, &indexes, date)?)))
        .collect()
}

fn build_batch(rows: &[FlatRow], indexes: &[usize], partition: NaiveDate) -> Result<RecordBatch> {
    let schema = bronze_schema();
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());

    for (position, column) in COLUMNS.iter().enumerate() {
        let array: ArrayRef = if BRONZE_NUMERIC.contains(&column.raw) {
            let values: Vec<Option<f64>> = indexes
                .iter()
                .map(|&i| value_to_f64(&rows[i][position]))
                .collect();
            Arc::new(Float64Array::from(values))
        } else {
            let values: Vec<Option<String>> = indexes
                .iter()
                .map(|&i| value_to_string(&rows[i][position]))
                .collect();
            Arc::new(StringArray::from(values))
        };
        columns.push(array);
    }

    let days = date_to_days(partition);
    columns.push(Arc::new(Date32Array::from(vec![Some(days); indexes.len()])) as ArrayRef);

    RecordBatch::try_new(schema, columns).map_err(|e| StoreError::Arrow(e.to_string()).into())
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_f64(s),
        _ => None,
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
