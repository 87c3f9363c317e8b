//! JSON curve input and averaged curve output.
//!
//! Accepted curve layouts:
//!
//! ```json
//! [{"voltage": -0.1, "current": 10.0}, {"voltage": 0.0, "current": 20.0}]
//! ```
//!
//! ```json
//! {"label": "100 mV/s", "voltage": [-0.1, 0.0], "current": [10.0, 20.0]}
//! ```
//!
//! ```json
//! {"label": "100 mV/s", "points": [{"voltage": -0.1, "current": 10.0}]}
//! ```
//!
//! A document may also be an array of any of the above, one entry per replicate.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use super::IoError;
use crate::aligner::AlignmentSummary;
use crate::averaged::AveragedCurve;
use crate::curve::{Curve, CurvePoint};

#[derive(Deserialize)]
#[serde(untagged)]
enum CurveRecord {
    Points(Vec<CurvePoint>),
    Columnar {
        #[serde(default)]
        label: Option<String>,
        voltage: Vec<f64>,
        current: Vec<f64>,
    },
    Labelled(Curve),
}

impl TryFrom<CurveRecord> for Curve {
    type Error = IoError;

    fn try_from(record: CurveRecord) -> Result<Self, Self::Error> {
        match record {
            CurveRecord::Points(points) => Ok(Curve::new(points)),
            CurveRecord::Columnar {
                label,
                voltage,
                current,
            } => {
                let mut curve = Curve::from_arrays(&voltage, &current)?;
                curve.label = label;
                Ok(curve)
            }
            CurveRecord::Labelled(curve) => Ok(curve),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CurveDocument {
    Single(CurveRecord),
    Many(Vec<CurveRecord>),
}

/// Parse one or more curves from a JSON document
pub fn read_curves<R: Read>(reader: R) -> Result<Vec<Curve>, IoError> {
    let document: CurveDocument = serde_json::from_reader(reader)?;
    match document {
        CurveDocument::Single(record) => Ok(vec![Curve::try_from(record)?]),
        CurveDocument::Many(records) => records.into_iter().map(Curve::try_from).collect(),
    }
}

/// Parse curves from a JSON string
pub fn curves_from_str(json: &str) -> Result<Vec<Curve>, IoError> {
    read_curves(json.as_bytes())
}

/// Averaged curve as written to JSON, with optional label and diagnostics
#[derive(Debug, Serialize)]
pub struct AveragedDocument<'a> {
    /// Group label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'a str>,

    /// Averaged arrays, flattened into the top-level object
    #[serde(flatten)]
    pub averaged: &'a AveragedCurve,

    /// Matching diagnostics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<&'a AlignmentSummary>,
}

impl<'a> AveragedDocument<'a> {
    /// Document holding only the averaged arrays
    pub fn new(averaged: &'a AveragedCurve) -> Self {
        Self {
            label: None,
            averaged,
            summary: None,
        }
    }
}

/// Write averaged documents as pretty-printed JSON.
///
/// A single document is written as an object, several as an array.
pub fn write_averaged<W: Write>(
    mut writer: W,
    documents: &[AveragedDocument<'_>],
) -> Result<(), IoError> {
    match documents {
        [single] => serde_json::to_writer_pretty(&mut writer, single)?,
        many => serde_json::to_writer_pretty(&mut writer, many)?,
    }
    writeln!(writer)?;
    Ok(())
}

/// Write curves as a JSON array of labelled point lists
pub fn write_curves<W: Write>(mut writer: W, curves: &[Curve]) -> Result<(), IoError> {
    serde_json::to_writer_pretty(&mut writer, curves)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_point_rows() {
        let curves =
            curves_from_str(r#"[{"voltage": -0.1, "current": 10.0}, {"voltage": 0.0, "current": 20.0}]"#)
                .unwrap();
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].points[1], CurvePoint::new(0.0, 20.0));
        assert_eq!(curves[0].label, None);
    }

    #[test]
    fn test_read_columnar() {
        let curves = curves_from_str(
            r#"{"label": "100 mV/s", "voltage": [-0.1, 0.0], "current": [10.0, 20.0]}"#,
        )
        .unwrap();
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].label.as_deref(), Some("100 mV/s"));
        assert_eq!(curves[0].currents(), vec![10.0, 20.0]);
    }

    #[test]
    fn test_read_columnar_mismatch() {
        let result = curves_from_str(r#"{"voltage": [-0.1, 0.0], "current": [10.0]}"#);
        assert!(matches!(result, Err(IoError::Curve(_))));
    }

    #[test]
    fn test_read_replicate_array() {
        let json = r#"[
            {"voltage": [0.0, 0.1], "current": [1.0, 2.0]},
            [{"voltage": 0.0, "current": 3.0}],
            {"label": "c", "points": [{"voltage": 0.0, "current": 4.0}]}
        ]"#;
        let curves = curves_from_str(json).unwrap();
        assert_eq!(curves.len(), 3);
        assert_eq!(curves[0].len(), 2);
        assert_eq!(curves[1].currents(), vec![3.0]);
        assert_eq!(curves[2].label.as_deref(), Some("c"));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(curves_from_str(r#"{"foo": 1}"#).is_err());
        assert!(curves_from_str("not json").is_err());
    }

    #[test]
    fn test_write_single_document() {
        let averaged = AveragedCurve::new(vec![0.0, 0.1], vec![1.0, 2.0], vec![0.0, 0.5]).unwrap();
        let mut buffer = Vec::new();
        write_averaged(&mut buffer, &[AveragedDocument::new(&averaged)]).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert!(value.is_object());
        assert_eq!(value["sem"][1], 0.5);
        assert!(value.get("summary").is_none());

        let parsed: AveragedCurve = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed, averaged);
    }

    #[test]
    fn test_write_multiple_documents() {
        let averaged = AveragedCurve::new(vec![0.0], vec![1.0], vec![0.0]).unwrap();
        let summary = AlignmentSummary {
            replicate_count: 1,
            sample_counts: vec![1],
            ..Default::default()
        };
        let documents = vec![
            AveragedDocument {
                label: Some("a"),
                averaged: &averaged,
                summary: Some(&summary),
            },
            AveragedDocument {
                label: Some("b"),
                averaged: &averaged,
                summary: None,
            },
        ];

        let mut buffer = Vec::new();
        write_averaged(&mut buffer, &documents).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value[0]["label"], "a");
        assert_eq!(value[0]["summary"]["sample_counts"][0], 1);
        assert_eq!(value[1]["label"], "b");
    }
}
