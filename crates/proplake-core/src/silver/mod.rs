//! Silver stage: conform raw rows and merge them into the curated table.
//!
//! Two-path state machine. When the curated table does not exist yet the
//! whole conformed batch is bulk-created under the fixed schema (BOOTSTRAP).
//! When it exists, the batch is first filtered to rows strictly past the
//! curated tier's own high-water mark, then upserted by (id, published_at)
//! (INCREMENTAL). The second filter is independent of the bronze watermark:
//! it guards against raw rows older than the curated frontier, such as an
//! initial backfill still sitting in the raw table.

mod batch;
mod conform;
mod merge;

pub use batch::{batches_to_rows, rows_to_partitions, row_key, row_published_at, Scalar, SilverRow};
pub use conform::conform_batches;
pub use merge::{max_published_at_micros, merge_rows};

use crate::coerce::micros_to_datetime;
use crate::store::{PartitionedTable, TableState};
use crate::Result;
use tracing::{info, warn};

/// Terminal state of one silver run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SilverOutcome {
    /// Curated table was created from scratch
    Bootstrapped { rows: usize },
    /// New rows were merged into the existing curated table
    Merged { rows: usize },
    /// Nothing strictly past the curated high-water mark; normal no-op
    NoNewRows,
    /// Raw table absent or empty; nothing to conform
    NoRawData,
}

/// Run the silver stage once against the raw and curated tables.
pub async fn run(
    bronze: &PartitionedTable,
    silver: &PartitionedTable,
) -> Result<SilverOutcome> {
    info!("Reading raw table");

    if bronze.probe().await != TableState::Present {
        info!("Raw table absent or empty, nothing to conform");
        return Ok(SilverOutcome::NoRawData);
    }

    let raw_batches = match bronze.read_all().await {
        Ok(batches) => batches,
        Err(e) => {
            warn!(error = %e, "Raw table read failed, treating as absent");
            return Ok(SilverOutcome::NoRawData);
        }
    };

    let mut rows = conform_batches(&raw_batches);
    drop_unpartitionable(&mut rows);
    if rows.is_empty() {
        return Ok(SilverOutcome::NoRawData);
    }

    match silver.probe().await {
        TableState::Present => merge_incremental(silver, rows).await,
        TableState::Absent | TableState::Empty => bootstrap(silver, rows).await,
    }
}

/// BOOTSTRAP path: bulk-create the curated table from the conformed rows.
async fn bootstrap(silver: &PartitionedTable, rows: Vec<SilverRow>) -> Result<SilverOutcome> {
    info!(rows = rows.len(), "Creating curated table");

    let partitions = rows_to_partitions(&rows)?;
    for (partition, batch) in &partitions {
        silver.append(*partition, batch).await?;
    }

    info!(
        rows = rows.len(),
        partitions = partitions.len(),
        "Curated table created"
    );
    Ok(SilverOutcome::Bootstrapped { rows: rows.len() })
}

/// INCREMENTAL path: filter to rows past the curated high-water mark, then
/// keyed-merge and rewrite.
async fn merge_incremental(
    silver: &PartitionedTable,
    rows: Vec<SilverRow>,
) -> Result<SilverOutcome> {
    let existing = batches_to_rows(&silver.read_all().await?)?;
    let frontier = max_published_at_micros(&existing);

    if let Some(frontier) = frontier {
        info!(
            max_published_at = %micros_to_datetime(frontier)
                .map(|dt| dt.to_string())
                .unwrap_or_default(),
            "Curated table exists"
        );
    }

    let fresh: Vec<SilverRow> = rows
        .into_iter()
        .filter(|row| match (row_published_at(row), frontier) {
            (Some(ts), Some(frontier)) => ts > frontier,
            (Some(_), None) => true,
            (None, _) => false,
        })
        .collect();

    if fresh.is_empty() {
        info!("No rows past the curated high-water mark");
        return Ok(SilverOutcome::NoNewRows);
    }

    info!(rows = fresh.len(), "Merging rows into curated table");

    let merged = merge_rows(existing, &fresh);
    let partitions = rows_to_partitions(&merged)?;
    silver.replace_all(&partitions).await?;

    info!(rows = fresh.len(), total = merged.len(), "Merge complete");
    Ok(SilverOutcome::Merged { rows: fresh.len() })
}

/// Rows whose `published_at` never conformed have no partition date and no
/// place in the curated layout; they are dropped, not fatal.
fn drop_unpartitionable(rows: &mut Vec<SilverRow>) {
    let before = rows.len();
    rows.retain(|row| batch::row_partition(row).is_some());
    let dropped = before - rows.len();
    if dropped > 0 {
        warn!(dropped, "Dropped rows without a conformable published_at");
    }
}
