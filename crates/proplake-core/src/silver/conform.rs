//! Schema conformance: loose raw rows into the fixed typed column set.
//!
//! Every output row is aligned to exactly the declared column set, whatever
//! the raw batch happens to contain: missing raw columns conform to null,
//! and cell-level coercion failures conform to null rather than failing the
//! run. Dotted raw names are rewritten to the identifier-safe silver names
//! by position in the shared column table.

use super::batch::{Scalar, SilverRow};
use crate::coerce::{
    date_to_days, micros_to_datetime, parse_bool, parse_f64, parse_i64, parse_timestamp_micros,
};
use crate::schema::{ColumnKind, COLUMNS};
use arrow::array::{Float64Array, StringArray};
use arrow::record_batch::RecordBatch;

/// Loosely-typed cell as read from a raw batch.
enum RawCell<'a> {
    Null,
    Text(&'a str),
    Number(f64),
}

/// Conform raw batches into typed silver rows.
pub fn conform_batches(batches: &[RecordBatch]) -> Vec<SilverRow> {
    batches.iter().flat_map(conform_batch).collect()
}

fn conform_batch(batch: &RecordBatch) -> Vec<SilverRow> {
    let schema = batch.schema();

    // Raw column position per declared column; None conforms to null.
    let sources: Vec<Option<usize>> = COLUMNS
        .iter()
        .map(|column| schema.index_of(column.raw).ok())
        .collect();

    (0..batch.num_rows())
        .map(|row_index| {
            let mut row: SilverRow = COLUMNS
                .iter()
                .zip(&sources)
                .map(|(column, source)| match source {
                    Some(column_index) => {
                        conform_cell(raw_cell(batch, *column_index, row_index), column.kind)
                    }
                    None => Scalar::Null,
                })
                .collect();

            row.push(derive_partition(&row));
            row
        })
        .collect()
}

fn raw_cell(batch: &RecordBatch, column_index: usize, row_index: usize) -> RawCell<'_> {
    let array = batch.column(column_index);
    if array.is_null(row_index) {
        return RawCell::Null;
    }

    if let Some(strings) = array.as_any().downcast_ref::<StringArray>() {
        return RawCell::Text(strings.value(row_index));
    }
    if let Some(floats) = array.as_any().downcast_ref::<Float64Array>() {
        return RawCell::Number(floats.value(row_index));
    }

    RawCell::Null
}

fn conform_cell(cell: RawCell<'_>, kind: ColumnKind) -> Scalar {
    match (cell, kind) {
        (RawCell::Null, _) => Scalar::Null,

        (RawCell::Text(s), ColumnKind::Int) => parse_i64(s).map_or(Scalar::Null, Scalar::Int),
        (RawCell::Text(s), ColumnKind::Float) => parse_f64(s).map_or(Scalar::Null, Scalar::Float),
        (RawCell::Text(s), ColumnKind::Bool) => parse_bool(s).map_or(Scalar::Null, Scalar::Bool),
        (RawCell::Text(s), ColumnKind::Text) => Scalar::Text(s.to_string()),
        (RawCell::Text(s), ColumnKind::Timestamp) => {
            parse_timestamp_micros(s).map_or(Scalar::Null, Scalar::Timestamp)
        }

        (RawCell::Number(v), ColumnKind::Int) => {
            if v.is_finite() {
                Scalar::Int(v.trunc() as i64)
            } else {
                Scalar::Null
            }
        }
        (RawCell::Number(v), ColumnKind::Float) => Scalar::Float(v),
        (RawCell::Number(v), ColumnKind::Bool) => match v {
            v if v == 1.0 => Scalar::Bool(true),
            v if v == 0.0 => Scalar::Bool(false),
            _ => Scalar::Null,
        },
        (RawCell::Number(v), ColumnKind::Text) => Scalar::Text(v.to_string()),
        (RawCell::Number(_), ColumnKind::Timestamp) => Scalar::Null,
    }
}

/// Derive the partition date from the conformed `published_at` cell.
fn derive_partition(row: &SilverRow) -> Scalar {
    super::batch::row_published_at(row)
        .and_then(micros_to_datetime)
        .map(|dt| Scalar::Date(date_to_days(dt.date())))
        .unwrap_or(Scalar::Null)
}
