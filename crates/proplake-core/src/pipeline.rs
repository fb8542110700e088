//! Pipeline orchestration: bronze, then silver.
//!
//! Bronze failure aborts the run; silver never sees an incomplete bronze
//! window. A bronze run with zero new records short-circuits silver as a
//! distinct, successful terminal state. A silver failure is reported but the
//! bronze append stays durable: "bronze ahead of silver" is recoverable, the
//! next run's high-water marks reconcile it.

use crate::bronze::{self, BronzeOutcome};
use crate::config::Config;
use crate::silver::{self, SilverOutcome};
use crate::source::{ExtractionWindow, HttpListingSource, ListingSource};
use crate::store::{create_object_store, PartitionedTable};
use crate::Result;
use std::sync::Arc;
use tracing::{error, info};

/// Report of one pipeline run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Bronze stage result
    pub bronze: BronzeOutcome,
    /// Silver stage result; `None` when short-circuited by an empty window
    pub silver: Option<SilverOutcome>,
}

impl RunReport {
    /// True when the run ended because the window held no new records.
    pub fn short_circuited(&self) -> bool {
        self.silver.is_none()
    }
}

/// The two-tier ingestion pipeline.
pub struct Pipeline {
    source: Arc<dyn ListingSource>,
    bronze: PartitionedTable,
    silver: PartitionedTable,
}

impl Pipeline {
    /// Build a pipeline against the real HTTP source.
    pub fn new(config: &Config) -> Result<Self> {
        let source = Arc::new(HttpListingSource::new(&config.source)?);
        Self::with_source(config, source)
    }

    /// Build a pipeline with an injected source (used by tests).
    pub fn with_source(config: &Config, source: Arc<dyn ListingSource>) -> Result<Self> {
        let store = create_object_store(&config.lake)?;
        Ok(Self {
            source,
            bronze: PartitionedTable::new(store.clone(), &config.lake.bronze_table),
            silver: PartitionedTable::new(store, &config.lake.silver_table),
        })
    }

    /// Raw-tier table handle.
    pub fn bronze_table(&self) -> &PartitionedTable {
        &self.bronze
    }

    /// Curated-tier table handle.
    pub fn silver_table(&self) -> &PartitionedTable {
        &self.silver
    }

    /// Run the bronze stage alone.
    pub async fn run_bronze(&self) -> Result<BronzeOutcome> {
        bronze::run(self.source.as_ref(), &self.bronze).await
    }

    /// Run the bronze stage over an explicit window (backfill).
    pub async fn run_bronze_window(&self, window: ExtractionWindow) -> Result<BronzeOutcome> {
        bronze::run_window(self.source.as_ref(), &self.bronze, window).await
    }

    /// Run the silver stage alone, against whatever the raw table holds.
    pub async fn run_silver(&self) -> Result<SilverOutcome> {
        silver::run(&self.bronze, &self.silver).await
    }

    /// Run the full pipeline once.
    pub async fn run(&self) -> Result<RunReport> {
        info!("Starting ingestion pipeline");

        let bronze = match self.run_bronze().await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Bronze stage failed, aborting run");
                return Err(e);
            }
        };

        if bronze.is_empty() {
            info!("Skipping silver stage: no new data in bronze window");
            return Ok(RunReport {
                bronze,
                silver: None,
            });
        }

        let silver = match self.run_silver().await {
            Ok(outcome) => outcome,
            Err(e) => {
                // Bronze is already durable; nothing to roll back.
                error!(error = %e, "Silver stage failed; bronze rows remain for the next run");
                return Err(e);
            }
        };

        info!(
            bronze_rows = bronze.written,
            silver = ?silver,
            "Pipeline run complete"
        );

        Ok(RunReport {
            bronze,
            silver: Some(silver),
        })
    }
}
