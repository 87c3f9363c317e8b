use crate::curve::CurveError;

/// Errors that can occur while reading or writing curve files
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// I/O error on the underlying file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parse or serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Arrow error while building record batches
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error while writing or reading a file
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Parallel arrays of different length
    #[error(transparent)]
    Curve(#[from] CurveError),

    /// Required column absent from a tabular input
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Unparseable value in a tabular input
    #[error("Invalid value '{value}' in column '{column}' at row {row}")]
    InvalidValue {
        /// Column name
        column: String,
        /// 1-based data row number
        row: usize,
        /// Raw text that failed to parse
        value: String,
    },

    /// File extension or format name not recognised
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Structurally valid file with unexpected content
    #[error("Invalid data: {0}")]
    InvalidData(String),
}
