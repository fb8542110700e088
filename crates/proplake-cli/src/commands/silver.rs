//! Silver-only command implementation.

use anyhow::Result;
use proplake_core::silver::SilverOutcome;
use proplake_core::{Config, Pipeline};

/// Run only the curated merge stage, against whatever the raw table holds.
pub async fn run(config: Config) -> Result<()> {
    let pipeline = Pipeline::new(&config)?;

    match pipeline.run_silver().await? {
        SilverOutcome::Bootstrapped { rows } => {
            println!("Curated table created with {rows} rows");
        }
        SilverOutcome::Merged { rows } => {
            println!("Merged {rows} rows into curated table");
        }
        SilverOutcome::NoNewRows => {
            println!("Curated table already up to date");
        }
        SilverOutcome::NoRawData => {
            println!("Raw table is absent or empty; run the bronze stage first");
        }
    }

    Ok(())
}
