//! Nested-to-flat normalization.
//!
//! Flattening is table-driven: the declared column set is walked against the
//! record's JSON form, so every declared dotted path appears on every output
//! row. A missing or null sub-structure (an absent agent, say) yields null
//! leaves rather than missing keys, and any extra source fields are dropped.

use crate::model::Listing;
use crate::schema::COLUMNS;
use crate::Result;
use serde_json::Value;

/// One flattened raw-tier row: scalar values parallel to
/// [`crate::schema::COLUMNS`].
pub type FlatRow = Vec<Value>;

/// Flatten a batch of nested listings into uniform raw rows.
pub fn flatten_listings(listings: &[Listing]) -> Result<Vec<FlatRow>> {
    listings.iter().map(flatten_listing).collect()
}

/// Flatten one listing. Total over the declared field set: the output always
/// has exactly one scalar per declared column.
pub fn flatten_listing(listing: &Listing) -> Result<FlatRow> {
    let tree = serde_json::to_value(listing)?;
    Ok(COLUMNS
        .iter()
        .map(|column| extract_path(&tree, column.raw))
        .collect())
}

/// Resolve a dotted path against a JSON tree, defaulting to null whenever an
/// intermediate object is absent or null.
fn extract_path(tree: &Value, path: &str) -> Value {
    let mut node = tree;
    for segment in path.split('.') {
        match node.get(segment) {
            Some(child) => node = child,
            None => return Value::Null,
        }
    }
    node.clone()
}
