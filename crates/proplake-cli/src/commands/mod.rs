//! CLI command implementations.

pub mod bronze;
pub mod run;
pub mod silver;

use anyhow::{bail, Result};
use proplake_core::source::ExtractionWindow;

/// Resolve the optional `--from`/`--to` overrides into an explicit window.
///
/// Both bounds must be given together; a half-open override is ambiguous.
pub fn explicit_window(
    from: &Option<String>,
    to: &Option<String>,
) -> Result<Option<ExtractionWindow>> {
    match (from, to) {
        (Some(from), Some(to)) => Ok(Some(ExtractionWindow::parse(from, to)?)),
        (None, None) => Ok(None),
        _ => bail!("--from and --to must be provided together"),
    }
}
