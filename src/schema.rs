//! # Averaged Curve Parquet Schema
//!
//! Averaged curves are stored in a "long" table: one row per grid point, with the
//! group label repeated on every row. Parquet's RLE encoding makes the repeated
//! label nearly free, and every column is a plain numeric vector that pandas,
//! R's arrow package or DuckDB can read directly.
//!
//! | Column | Type | Nullable | Description |
//! |--------|------|----------|-------------|
//! | label | Utf8 | Yes | Replicate group label (scan rate, sample name) |
//! | voltage | Float64 | No | Reference grid voltage (V) |
//! | mean | Float64 | No | Mean current across replicates |
//! | sem | Float64 | No | Standard error of the mean |
//!
//! File-level provenance lives in the Parquet footer as key/value metadata under
//! the `cvalign:` prefix.

use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema, SchemaBuilder};

/// Format version written to the Parquet footer
pub const CVALIGN_FORMAT_VERSION: &str = "1.0.0";

/// Footer key: format version
pub const KEY_FORMAT_VERSION: &str = "cvalign:format_version";

/// Footer key: RFC 3339 creation timestamp
pub const KEY_CREATED: &str = "cvalign:created";

/// Footer key: writer name and version
pub const KEY_WRITER: &str = "cvalign:writer";

/// Footer key: number of replicates averaged
pub const KEY_REPLICATE_COUNT: &str = "cvalign:replicate_count";

/// Footer key: voltage tolerance used for matching
pub const KEY_VOLTAGE_TOLERANCE: &str = "cvalign:voltage_tolerance";

/// Footer key: JSON array of input file names
pub const KEY_SOURCE_FILES: &str = "cvalign:source_files";

/// Column names for the averaged curve schema
pub mod averaged_columns {
    /// Replicate group label
    pub const LABEL: &str = "label";
    /// Reference grid voltage
    pub const VOLTAGE: &str = "voltage";
    /// Mean current
    pub const MEAN: &str = "mean";
    /// Standard error of the mean
    pub const SEM: &str = "sem";
}

fn field_with_unit(name: &str, data_type: DataType, nullable: bool, unit: &str) -> Field {
    let mut metadata = std::collections::HashMap::new();
    metadata.insert("unit".to_string(), unit.to_string());
    Field::new(name, data_type, nullable).with_metadata(metadata)
}

/// Creates the Arrow schema for averaged curves.
///
/// # Example
///
/// ```
/// use cvalign::schema::create_averaged_schema;
///
/// let schema = create_averaged_schema();
/// assert_eq!(schema.fields().len(), 4);
/// ```
pub fn create_averaged_schema() -> Schema {
    let mut builder = SchemaBuilder::new();

    builder.push(Field::new(averaged_columns::LABEL, DataType::Utf8, true));
    builder.push(field_with_unit(
        averaged_columns::VOLTAGE,
        DataType::Float64,
        false,
        "V",
    ));
    builder.push(field_with_unit(
        averaged_columns::MEAN,
        DataType::Float64,
        false,
        "instrument current unit",
    ));
    builder.push(field_with_unit(
        averaged_columns::SEM,
        DataType::Float64,
        false,
        "instrument current unit",
    ));

    builder.finish()
}

/// Shared reference to the averaged curve schema
pub fn create_averaged_schema_arc() -> Arc<Schema> {
    Arc::new(create_averaged_schema())
}
