//! Fixed column set shared by the bronze and silver tiers.
//!
//! A single declaration drives everything downstream: flattening defaults,
//! the loose bronze schema, the typed silver schema, and the dotted-path to
//! identifier-safe rename. Adding a field here is the only change needed to
//! carry it through both tiers.

use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use std::sync::Arc;

/// Typed kind of a silver column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// 64-bit integer
    Int,
    /// 64-bit float
    Float,
    /// Boolean
    Bool,
    /// UTF-8 string
    Text,
    /// Microsecond-resolution timestamp
    Timestamp,
}

impl ColumnKind {
    /// Arrow data type for this kind in the silver tier.
    pub fn data_type(self) -> DataType {
        match self {
            ColumnKind::Int => DataType::Int64,
            ColumnKind::Float => DataType::Float64,
            ColumnKind::Bool => DataType::Boolean,
            ColumnKind::Text => DataType::Utf8,
            ColumnKind::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, None),
        }
    }
}

/// One business column: dotted raw-tier path, flat silver name, typed kind.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    /// Dotted field path in the raw tier (`location.city`)
    pub raw: &'static str,
    /// Identifier-safe name in the silver tier (`location_city`)
    pub name: &'static str,
    /// Typed kind in the silver tier
    pub kind: ColumnKind,
}

const fn col(raw: &'static str, name: &'static str, kind: ColumnKind) -> Column {
    Column { raw, name, kind }
}

/// The fixed business column set, in table order.
pub const COLUMNS: &[Column] = &[
    col("id", "id", ColumnKind::Int),
    col("title", "title", ColumnKind::Text),
    col("description", "description", ColumnKind::Text),
    col("property_type", "property_type", ColumnKind::Text),
    col("location.city", "location_city", ColumnKind::Text),
    col("location.state", "location_state", ColumnKind::Text),
    col("location.country", "location_country", ColumnKind::Text),
    col("location.address", "location_address", ColumnKind::Text),
    col("location.neighborhood", "location_neighborhood", ColumnKind::Text),
    col("location.zip_code", "location_zip_code", ColumnKind::Text),
    col(
        "location.coordinates.latitude",
        "location_coordinates_latitude",
        ColumnKind::Float,
    ),
    col(
        "location.coordinates.longitude",
        "location_coordinates_longitude",
        ColumnKind::Float,
    ),
    col("pricing.price", "pricing_price", ColumnKind::Float),
    col("pricing.currency", "pricing_currency", ColumnKind::Text),
    col("pricing.price_per_sqm", "pricing_price_per_sqm", ColumnKind::Float),
    col("features.bedrooms", "features_bedrooms", ColumnKind::Int),
    col("features.bathrooms", "features_bathrooms", ColumnKind::Int),
    col("features.half_bathrooms", "features_half_bathrooms", ColumnKind::Int),
    col("features.total_area_sqm", "features_total_area_sqm", ColumnKind::Float),
    col(
        "features.covered_area_sqm",
        "features_covered_area_sqm",
        ColumnKind::Float,
    ),
    col(
        "features.uncovered_area_sqm",
        "features_uncovered_area_sqm",
        ColumnKind::Float,
    ),
    col("features.lot_area_sqm", "features_lot_area_sqm", ColumnKind::Float),
    col(
        "features.construction_year",
        "features_construction_year",
        ColumnKind::Int,
    ),
    col("features.floors", "features_floors", ColumnKind::Int),
    col("features.floor_number", "features_floor_number", ColumnKind::Int),
    col("features.parking_spaces", "features_parking_spaces", ColumnKind::Int),
    col("status.property_status", "status_property_status", ColumnKind::Text),
    col("status.is_furnished", "status_is_furnished", ColumnKind::Bool),
    col(
        "status.is_new_construction",
        "status_is_new_construction",
        ColumnKind::Bool,
    ),
    col(
        "status.immediate_availability",
        "status_immediate_availability",
        ColumnKind::Bool,
    ),
    col("agent.name", "agent_name", ColumnKind::Text),
    col("agent.email", "agent_email", ColumnKind::Text),
    col("agent.phone", "agent_phone", ColumnKind::Text),
    col("agent.company", "agent_company", ColumnKind::Text),
    col("dates.published_at", "published_at", ColumnKind::Timestamp),
    col("dates.updated_at", "updated_at", ColumnKind::Timestamp),
    col("dates.expires_at", "expires_at", ColumnKind::Timestamp),
];

/// Derived partition column, appended after the business columns in both
/// tiers.
pub const PARTITION_COLUMN: &str = "published_date";

/// Dotted path of the event-time field driving watermarks and partitioning.
pub const PUBLISHED_AT_RAW: &str = "dates.published_at";

/// Columns stored numerically (Float64) in the otherwise string-typed raw
/// tier. Mirrors the raw tier's minimal numeric cast.
pub const BRONZE_NUMERIC: &[&str] = &[
    "features.floor_number",
    "location.coordinates.latitude",
    "location.coordinates.longitude",
    "pricing.price",
    "pricing.price_per_sqm",
    "features.total_area_sqm",
    "features.covered_area_sqm",
    "features.uncovered_area_sqm",
    "features.lot_area_sqm",
];

/// Index of a business column by its dotted raw path.
pub fn column_index(raw: &str) -> Option<usize> {
    COLUMNS.iter().position(|c| c.raw == raw)
}

/// Arrow schema of the silver tier: every business column typed per its
/// kind, plus the Date32 partition column. All columns are nullable; any
/// cell can null out during coercion.
pub fn silver_schema() -> SchemaRef {
    let mut fields: Vec<Field> = COLUMNS
        .iter()
        .map(|c| Field::new(c.name, c.kind.data_type(), true))
        .collect();
    fields.push(Field::new(PARTITION_COLUMN, DataType::Date32, true));
    Arc::new(Schema::new(fields))
}

/// Arrow schema of the bronze tier: the declared numeric columns as Float64,
/// everything else Utf8, plus the Date32 partition column. Dotted names are
/// kept verbatim.
pub fn bronze_schema() -> SchemaRef {
    let mut fields: Vec<Field> = COLUMNS
        .iter()
        .map(|c| {
            let data_type = if BRONZE_NUMERIC.contains(&c.raw) {
                DataType::Float64
            } else {
                DataType::Utf8
            };
            Field::new(c.raw, data_type, true)
        })
        .collect();
    fields.push(Field::new(PARTITION_COLUMN, DataType::Date32, true));
    Arc::new(Schema::new(fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_count() {
        assert_eq!(COLUMNS.len(), 37);
        assert_eq!(silver_schema().fields().len(), 38);
        assert_eq!(bronze_schema().fields().len(), 38);
    }

    #[test]
    fn test_silver_names_are_identifier_safe() {
        for column in COLUMNS {
            assert!(
                !column.name.contains('.'),
                "silver name {} carries a dot",
                column.name
            );
        }
        assert_eq!(column_index("location.city").map(|i| COLUMNS[i].name), Some("location_city"));
        assert_eq!(
            column_index(PUBLISHED_AT_RAW).map(|i| COLUMNS[i].name),
            Some("published_at")
        );
    }

    #[test]
    fn test_bronze_numeric_columns_are_declared() {
        for raw in BRONZE_NUMERIC {
            assert!(column_index(raw).is_some(), "{raw} missing from COLUMNS");
        }
        let schema = bronze_schema();
        let field = schema.field_with_name("pricing.price").unwrap();
        assert_eq!(field.data_type(), &DataType::Float64);
        let field = schema.field_with_name("features.bedrooms").unwrap();
        assert_eq!(field.data_type(), &DataType::Utf8);
    }

    #[test]
    fn test_silver_key_and_partition_types() {
        let schema = silver_schema();
        assert_eq!(
            schema.field_with_name("id").unwrap().data_type(),
            &DataType::Int64
        );
        assert_eq!(
            schema.field_with_name("published_at").unwrap().data_type(),
            &DataType::Timestamp(TimeUnit::Microsecond, None)
        );
        assert_eq!(
            schema.field_with_name(PARTITION_COLUMN).unwrap().data_type(),
            &DataType::Date32
        );
    }
}
