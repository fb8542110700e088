//! Full pipeline command implementation.

use anyhow::Result;
use proplake_core::silver::SilverOutcome;
use proplake_core::{Config, Pipeline};
use tracing::info;

/// Run one full pipeline pass, optionally over an explicit window.
pub async fn run(config: Config, from: Option<String>, to: Option<String>) -> Result<()> {
    let pipeline = Pipeline::new(&config)?;

    let report = match super::explicit_window(&from, &to)? {
        Some(window) => {
            // Backfill path: explicit bounds for bronze, then the usual merge.
            let bronze = pipeline.run_bronze_window(window).await?;
            if bronze.is_empty() {
                info!("No listings in requested window");
                println!("Window was empty; nothing ingested");
                return Ok(());
            }
            let silver = pipeline.run_silver().await?;
            println!("{}", describe(bronze.written, &silver));
            return Ok(());
        }
        None => pipeline.run().await?,
    };

    match report.silver {
        Some(silver) => println!("{}", describe(report.bronze.written, &silver)),
        None => println!("Window was empty; nothing ingested"),
    }

    Ok(())
}

fn describe(bronze_rows: usize, silver: &SilverOutcome) -> String {
    match silver {
        SilverOutcome::Bootstrapped { rows } => {
            format!("Ingested {bronze_rows} raw rows; curated table created with {rows} rows")
        }
        SilverOutcome::Merged { rows } => {
            format!("Ingested {bronze_rows} raw rows; merged {rows} into curated table")
        }
        SilverOutcome::NoNewRows => {
            format!("Ingested {bronze_rows} raw rows; curated table already up to date")
        }
        SilverOutcome::NoRawData => {
            format!("Ingested {bronze_rows} raw rows; raw table not readable yet")
        }
    }
}
