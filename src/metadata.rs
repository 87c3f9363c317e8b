//! # Averaging Provenance
//!
//! Describes how an averaged curve was produced. Stored in the Parquet footer so a
//! file carries its replicate count, tolerance and inputs with it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::schema::{
    CVALIGN_FORMAT_VERSION, KEY_CREATED, KEY_FORMAT_VERSION, KEY_REPLICATE_COUNT,
    KEY_SOURCE_FILES, KEY_VOLTAGE_TOLERANCE, KEY_WRITER,
};

/// Provenance for an averaged output file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AveragingMetadata {
    /// Total number of replicate curves averaged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicate_count: Option<usize>,

    /// Voltage tolerance used for matching (volts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltage_tolerance: Option<f64>,

    /// Input files the replicates were read from
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_files: Vec<String>,

    /// Creation timestamp (RFC 3339), filled in when read back from a file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// Writer name and version, filled in when read back from a file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writer: Option<String>,
}

impl AveragingMetadata {
    /// Create an empty metadata container
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert to a map suitable for Parquet key/value metadata
    pub fn to_parquet_metadata(&self) -> Result<HashMap<String, String>, serde_json::Error> {
        let mut metadata = HashMap::new();

        metadata.insert(
            KEY_FORMAT_VERSION.to_string(),
            CVALIGN_FORMAT_VERSION.to_string(),
        );
        metadata.insert(KEY_CREATED.to_string(), chrono::Utc::now().to_rfc3339());
        metadata.insert(
            KEY_WRITER.to_string(),
            format!("cvalign v{}", env!("CARGO_PKG_VERSION")),
        );

        if let Some(count) = self.replicate_count {
            metadata.insert(KEY_REPLICATE_COUNT.to_string(), count.to_string());
        }

        if let Some(tolerance) = self.voltage_tolerance {
            metadata.insert(KEY_VOLTAGE_TOLERANCE.to_string(), tolerance.to_string());
        }

        if !self.source_files.is_empty() {
            metadata.insert(
                KEY_SOURCE_FILES.to_string(),
                serde_json::to_string(&self.source_files)?,
            );
        }

        Ok(metadata)
    }

    /// Reconstruct metadata from Parquet key/value metadata.
    ///
    /// Unparseable numeric values are dropped rather than treated as errors.
    pub fn from_parquet_metadata(
        metadata: &HashMap<String, String>,
    ) -> Result<Self, serde_json::Error> {
        let mut result = Self::new();

        result.replicate_count = metadata
            .get(KEY_REPLICATE_COUNT)
            .and_then(|v| v.parse().ok());
        result.voltage_tolerance = metadata
            .get(KEY_VOLTAGE_TOLERANCE)
            .and_then(|v| v.parse().ok());

        if let Some(json) = metadata.get(KEY_SOURCE_FILES) {
            result.source_files = serde_json::from_str(json)?;
        }

        result.created = metadata.get(KEY_CREATED).cloned();
        result.writer = metadata.get(KEY_WRITER).cloned();

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parquet_metadata_roundtrip() {
        let metadata = AveragingMetadata {
            replicate_count: Some(3),
            voltage_tolerance: Some(0.02),
            source_files: vec!["a.csv".to_string(), "b.json".to_string()],
            ..Default::default()
        };

        let map = metadata.to_parquet_metadata().unwrap();
        assert_eq!(map.get(KEY_FORMAT_VERSION).unwrap(), CVALIGN_FORMAT_VERSION);
        assert_eq!(map.get(KEY_REPLICATE_COUNT).unwrap(), "3");
        assert!(map.get(KEY_WRITER).unwrap().starts_with("cvalign v"));

        let restored = AveragingMetadata::from_parquet_metadata(&map).unwrap();
        assert_eq!(restored.replicate_count, Some(3));
        assert_eq!(restored.voltage_tolerance, Some(0.02));
        assert_eq!(restored.source_files, metadata.source_files);
        assert!(restored.created.is_some());
    }

    #[test]
    fn test_minimal_metadata() {
        let map = AveragingMetadata::new().to_parquet_metadata().unwrap();
        assert_eq!(map.len(), 3);
        assert!(!map.contains_key(KEY_SOURCE_FILES));
    }
}
