//! Typed silver rows and their Arrow batch encoding.
//!
//! The curated tier moves through memory as `Vec<Scalar>` rows parallel to
//! the declared column set (plus the trailing partition date). Encoding
//! applies [`crate::schema::silver_schema`] explicitly, so every written
//! file carries the full fixed column set whatever the raw tier held.

use crate::coerce::date_to_days;
use crate::schema::{silver_schema, ColumnKind, COLUMNS};
use crate::store::group_by_partition;
use crate::{Result, StoreError};
use arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray,
    TimestampMicrosecondArray,
};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use std::sync::Arc;

/// One typed cell of a silver row.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    /// Microseconds since the Unix epoch
    Timestamp(i64),
    /// Days since the Unix epoch (Date32)
    Date(i32),
}

/// One silver row: a scalar per business column, then the partition date.
pub type SilverRow = Vec<Scalar>;

/// Index of the trailing partition cell in a [`SilverRow`].
pub fn partition_cell_index() -> usize {
    COLUMNS.len()
}

/// Composite merge key (id, published_at micros) of a row, when both halves
/// are present.
pub fn row_key(row: &SilverRow) -> Option<(i64, i64)> {
    let id_index = COLUMNS.iter().position(|c| c.name == "id")?;
    let ts_index = COLUMNS.iter().position(|c| c.name == "published_at")?;

    match (&row[id_index], &row[ts_index]) {
        (Scalar::Int(id), Scalar::Timestamp(ts)) => Some((*id, *ts)),
        _ => None,
    }
}

/// `published_at` micros of a row, if conformed.
pub fn row_published_at(row: &SilverRow) -> Option<i64> {
    let ts_index = COLUMNS.iter().position(|c| c.name == "published_at")?;
    match &row[ts_index] {
        Scalar::Timestamp(ts) => Some(*ts),
        _ => None,
    }
}

/// Partition date of a row, if derivable.
pub fn row_partition(row: &SilverRow) -> Option<NaiveDate> {
    match &row[partition_cell_index()] {
        Scalar::Date(days) => crate::coerce::days_to_date(*days),
        _ => None,
    }
}

/// Encode rows into one record batch per partition date. Rows without a
/// partition date are not representable in the layout and are skipped by the
/// caller before this point.
pub fn rows_to_partitions(rows: &[SilverRow]) -> Result<Vec<(NaiveDate, RecordBatch)>> {
    let dates: Vec<NaiveDate> = rows
        .iter()
        .map(|row| {
            row_partition(row).ok_or_else(|| {
                StoreError::Partition("silver row has no partition date".into())
            })
        })
        .collect::<std::result::Result<_, _>>()?;

    group_by_partition(&dates)
        .into_iter()
        .map(|(date, indexes)| {
            let subset: Vec<&SilverRow> = indexes.iter().map(|&i| &rows[i]).collect();
            Ok((date, rows_to_batch(&subset, date)?))
        })
        .collect()
}

fn rows_to_batch(rows: &[&SilverRow], partition: NaiveDate) -> Result<RecordBatch> {
    let schema = silver_schema();
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());

    for (position, column) in COLUMNS.iter().enumerate() {
        let array: ArrayRef = match column.kind {
            ColumnKind::Int => Arc::new(Int64Array::from(
                rows.iter()
                    .map(|row| match &row[position] {
                        Scalar::Int(v) => Some(*v),
                        _ => None,
                    })
                    .collect::<Vec<_>>(),
            )),
            ColumnKind::Float => Arc::new(Float64Array::from(
                rows.iter()
                    .map(|row| match &row[position] {
                        Scalar::Float(v) => Some(*v),
                        _ => None,
                    })
                    .collect::<Vec<_>>(),
            )),
            ColumnKind::Bool => Arc::new(BooleanArray::from(
                rows.iter()
                    .map(|row| match &row[position] {
                        Scalar::Bool(v) => Some(*v),
                        _ => None,
                    })
                    .collect::<Vec<_>>(),
            )),
            ColumnKind::Text => Arc::new(StringArray::from(
                rows.iter()
                    .map(|row| match &row[position] {
                        Scalar::Text(v) => Some(v.clone()),
                        _ => None,
                    })
                    .collect::<Vec<_>>(),
            )),
            ColumnKind::Timestamp => Arc::new(TimestampMicrosecondArray::from(
                rows.iter()
                    .map(|row| match &row[position] {
                        Scalar::Timestamp(v) => Some(*v),
                        _ => None,
                    })
                    .collect::<Vec<_>>(),
            )),
        };
        columns.push(array);
    }

    let days = date_to_days(partition);
    columns.push(Arc::new(Date32Array::from(vec![Some(days); rows.len()])) as ArrayRef);

    RecordBatch::try_new(schema, columns).map_err(|e| StoreError::Arrow(e.to_string()).into())
}

/// Decode silver batches back into typed rows.
pub fn batches_to_rows(batches: &[RecordBatch]) -> Result<Vec<SilverRow>> {
    let mut rows = Vec::new();

    for batch in batches {
        let schema = batch.schema();

        for row_index in 0..batch.num_rows() {
            let mut row: SilverRow = Vec::with_capacity(COLUMNS.len() + 1);

            for column in COLUMNS {
                let column_index = schema
                    .index_of(column.name)
                    .map_err(|e| StoreError::Arrow(e.to_string()))?;
                row.push(decode_cell(batch, column_index, row_index, column.kind)?);
            }

            let partition_index = schema
                .index_of(crate::schema::PARTITION_COLUMN)
                .map_err(|e| StoreError::Arrow(e.to_string()))?;
            let dates = batch
                .column(partition_index)
                .as_any()
                .downcast_ref::<Date32Array>()
                .ok_or_else(|| StoreError::Arrow("partition column is not Date32".into()))?;
            row.push(if dates.is_null(row_index) {
                Scalar::Null
            } else {
                Scalar::Date(dates.value(row_index))
            });

            rows.push(row);
        }
    }

    Ok(rows)
}

fn decode_cell(
    batch: &RecordBatch,
    column_index: usize,
    row_index: usize,
    kind: ColumnKind,
) -> Result<Scalar> {
    let array = batch.column(column_index);
    if array.is_null(row_index) {
        return Ok(Scalar::Null);
    }

    let cell = match kind {
        ColumnKind::Int => array
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| Scalar::Int(a.value(row_index))),
        ColumnKind::Float => array
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| Scalar::Float(a.value(row_index))),
        ColumnKind::Bool => array
            .as_any()
            .downcast_ref::<BooleanArray>()
            .map(|a| Scalar::Bool(a.value(row_index))),
        ColumnKind::Text => array
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|a| Scalar::Text(a.value(row_index).to_string())),
        ColumnKind::Timestamp => array
            .as_any()
            .downcast_ref::<TimestampMicrosecondArray>()
            .map(|a| Scalar::Timestamp(a.value(row_index))),
    };

    cell.ok_or_else(|| {
        StoreError::Arrow(format!("column {column_index} does not match kind {kind:?}")).into()
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::coerce::parse_timestamp_micros;

    /// An all-null silver row with the given id, published_at, and
    /// partition derived from the timestamp.
    pub(crate) fn test_row(id: i64, published_at: &str, price: f64) -> SilverRow {
        let micros = parse_timestamp_micros(published_at).unwrap();
        let days = date_to_days(
            crate::coerce::micros_to_datetime(micros).unwrap().date(),
        );

        let mut row: SilverRow = COLUMNS
            .iter()
            .map(|c| match c.name {
                "id" => Scalar::Int(id),
                "published_at" => Scalar::Timestamp(micros),
                "pricing_price" => Scalar::Float(price),
                "title" => Scalar::Text(format!("listing-{id}")),
                "status_is_furnished" => Scalar::Bool(true),
                _ => Scalar::Null,
            })
            .collect();
        row.push(Scalar::Date(days));
        row
    }

    #[test]
    fn test_row_key_and_partition() {
        let row = test_row(7, "2024-03-15T10:00:00", 100.0);
        let (id, ts) = row_key(&row).unwrap();
        assert_eq!(id, 7);
        assert_eq!(ts, parse_timestamp_micros("2024-03-15T10:00:00").unwrap());
        assert_eq!(row_partition(&row).unwrap().to_string(), "2024-03-15");
    }

    #[test]
    fn test_rows_round_trip_through_batches() {
        let rows = vec![
            test_row(1, "2024-03-15T10:00:00", 100.0),
            test_row(2, "2024-03-16T11:00:00", 200.0),
            test_row(3, "2024-03-15T12:00:00", 300.0),
        ];

        let partitions = rows_to_partitions(&rows).unwrap();
        assert_eq!(partitions.len(), 2);

        let batches: Vec<RecordBatch> = partitions.into_iter().map(|(_, b)| b).collect();
        let mut decoded = batches_to_rows(&batches).unwrap();
        decoded.sort_by_key(|row| row_key(row));

        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[0], rows[0]);
        assert_eq!(decoded[1], rows[1]);
        assert_eq!(decoded[2], rows[2]);
    }

    #[test]
    fn test_rows_to_partitions_requires_partition_date() {
        let mut row = test_row(1, "2024-03-15T10:00:00", 100.0);
        let last = row.len() - 1;
        row[last] = Scalar::Null;
        assert!(rows_to_partitions(&[row]).is_err());
    }
}
