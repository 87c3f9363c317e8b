//! # Curve File Interchange
//!
//! Readers for replicate curves and writers for averaged curves.
//!
//! | Format | Read curves | Write averaged |
//! |--------|-------------|----------------|
//! | JSON | rows of `{voltage, current}`, columnar `{voltage: [], current: []}`, or an array of either | columnar `{voltage, mean, sem}` |
//! | CSV | `voltage`, `current` columns, optional `label` and `replicate` columns | `voltage,mean,sem` |
//! | Parquet | - | long table, see [`crate::schema`] |
//!
//! The format is picked from the file extension unless given explicitly.

mod error;

pub mod csv;
pub mod json;
pub mod parquet;

pub use error::IoError;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::curve::Curve;

/// Supported interchange formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    /// JSON documents
    #[default]
    Json,
    /// Comma-separated values with a header row
    Csv,
    /// Apache Parquet (output only)
    Parquet,
}

impl DataFormat {
    /// Detect the format from a path's extension
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| {
                IoError::UnsupportedFormat(format!("no file extension on {}", path.display()))
            })?;

        extension.parse()
    }

    /// Returns all available format names.
    pub fn variants() -> &'static [&'static str] {
        &["json", "csv", "parquet"]
    }

    /// Canonical file extension
    pub fn extension(&self) -> &'static str {
        match self {
            DataFormat::Json => "json",
            DataFormat::Csv => "csv",
            DataFormat::Parquet => "parquet",
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for DataFormat {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(DataFormat::Json),
            "csv" | "txt" => Ok(DataFormat::Csv),
            "parquet" | "pq" => Ok(DataFormat::Parquet),
            other => Err(IoError::UnsupportedFormat(format!(
                "'{}'. Valid options: {}",
                other,
                DataFormat::variants().join(", ")
            ))),
        }
    }
}

/// Read every curve stored in a file.
///
/// Curves without a label of their own are labelled with the file stem, plus
/// their position when the file holds more than one.
pub fn read_curves(path: &Path) -> Result<Vec<Curve>, IoError> {
    let format = DataFormat::from_path(path)?;
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);

    let mut curves = match format {
        DataFormat::Json => json::read_curves(reader)?,
        DataFormat::Csv => csv::read_curves(reader)?,
        DataFormat::Parquet => {
            return Err(IoError::UnsupportedFormat(
                "parquet files hold averaged curves and cannot be used as replicate input"
                    .to_string(),
            ))
        }
    };

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let count = curves.len();
    for (index, curve) in curves.iter_mut().enumerate() {
        if curve.label.is_none() {
            curve.label = Some(if count == 1 {
                stem.clone()
            } else {
                format!("{}#{}", stem, index)
            });
        }
    }

    debug!(
        "Read {} curves ({} points) from {}",
        count,
        curves.iter().map(Curve::len).sum::<usize>(),
        path.display()
    );

    Ok(curves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            DataFormat::from_path(&PathBuf::from("scan.JSON")).unwrap(),
            DataFormat::Json
        );
        assert_eq!(
            DataFormat::from_path(&PathBuf::from("out/avg.parquet")).unwrap(),
            DataFormat::Parquet
        );
        assert!(DataFormat::from_path(&PathBuf::from("noext")).is_err());
        assert!(matches!(
            DataFormat::from_path(&PathBuf::from("scan.xlsx")),
            Err(IoError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_read_curves_labels_from_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run_a.csv");
        std::fs::write(&path, "voltage,current\n0.0,1.0\n0.1,2.0\n").unwrap();

        let curves = read_curves(&path).unwrap();
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].label.as_deref(), Some("run_a"));

        let path = dir.path().join("set.json");
        std::fs::write(&path, r#"[[{"voltage": 0.0, "current": 1.0}], [{"voltage": 0.0, "current": 2.0}]]"#)
            .unwrap();
        let curves = read_curves(&path).unwrap();
        assert_eq!(curves.len(), 2);
        assert_eq!(curves[1].label.as_deref(), Some("set#1"));

        let path = dir.path().join("export.csv");
        std::fs::write(&path, "label,voltage,current\n,0.0,1.0\n,0.1,2.0\n").unwrap();
        let curves = read_curves(&path).unwrap();
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].label.as_deref(), Some("export"));
    }
}
