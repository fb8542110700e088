//! Bronze-only command implementation.

use anyhow::Result;
use proplake_core::{Config, Pipeline};

/// Run only the raw extraction stage.
pub async fn run(config: Config, from: Option<String>, to: Option<String>) -> Result<()> {
    let pipeline = Pipeline::new(&config)?;

    let outcome = match super::explicit_window(&from, &to)? {
        Some(window) => pipeline.run_bronze_window(window).await?,
        None => pipeline.run_bronze().await?,
    };

    if outcome.is_empty() {
        println!(
            "No listings between {} and {}",
            outcome.window.from_param(),
            outcome.window.to_param()
        );
    } else {
        println!(
            "Appended {} rows for window {} to {}",
            outcome.written,
            outcome.window.from_param(),
            outcome.window.to_param()
        );
    }

    Ok(())
}
