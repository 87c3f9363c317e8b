//! TOML configuration file support.
//!
//! Settings that would otherwise be repeated on every invocation can live in a
//! config file:
//!
//! ```toml
//! # cvalign.toml
//! [alignment]
//! tolerance = 0.02
//!
//! [output]
//! format = "parquet"
//! summary = true
//! compression_level = 3
//! group_by_label = false
//! ```
//!
//! Command-line flags take precedence over file values.

use anyhow::{Context, Result};
use cvalign::io::DataFormat;
use serde::Deserialize;
use std::path::Path;

/// Root configuration structure for cvalign.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Alignment settings.
    #[serde(default)]
    pub alignment: AlignmentConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Configuration for the aligner.
#[derive(Debug, Default, Deserialize)]
pub struct AlignmentConfig {
    /// Voltage matching tolerance in volts.
    pub tolerance: Option<f64>,
}

/// Configuration for written results.
#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    /// Output format (json, csv, parquet).
    pub format: Option<DataFormat>,

    /// Include alignment diagnostics in JSON output.
    pub summary: Option<bool>,

    /// ZSTD compression level for Parquet output (1-22).
    pub compression_level: Option<i32>,

    /// Average each label separately instead of pooling all curves.
    pub group_by_label: Option<bool>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load from an optional path, falling back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
