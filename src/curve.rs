//! # Curve Data Model
//!
//! Sampled voltammetry sweeps as acquired from the instrument.
//!
//! A [`Curve`] is an ordered list of [`CurvePoint`]s in acquisition order. A cyclic
//! sweep usually contains both a forward and a reverse segment, so voltage is not
//! required to be monotonic. Curves are never mutated by the aligner.

use serde::{Deserialize, Serialize};

/// Errors raised while building curves from parallel arrays
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    /// Voltage and current arrays have different lengths
    #[error("Array length mismatch: voltage array has {voltage_len} elements, current array has {current_len} elements")]
    ArrayLengthMismatch {
        /// Number of voltage samples
        voltage_len: usize,
        /// Number of current samples
        current_len: usize,
    },

    /// An output column does not match the length of the voltage grid
    #[error("Column '{column}' has {actual} elements, expected {expected} to match the voltage grid")]
    ColumnLengthMismatch {
        /// Name of the mismatched column
        column: &'static str,
        /// Length of the voltage grid
        expected: usize,
        /// Length of the mismatched column
        actual: usize,
    },
}

/// One sampled measurement along a voltammetry sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Applied potential in volts
    pub voltage: f64,
    /// Measured current
    pub current: f64,
}

impl CurvePoint {
    /// Create a new point
    pub fn new(voltage: f64, current: f64) -> Self {
        Self { voltage, current }
    }
}

impl From<(f64, f64)> for CurvePoint {
    fn from((voltage, current): (f64, f64)) -> Self {
        Self { voltage, current }
    }
}

/// An ordered voltage/current sweep
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    /// Optional label (file stem, scan-rate label, ...). Never affects the numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Points in acquisition order
    pub points: Vec<CurvePoint>,
}

impl Curve {
    /// Create an unlabelled curve from points
    pub fn new(points: Vec<CurvePoint>) -> Self {
        Self {
            label: None,
            points,
        }
    }

    /// Create a curve from parallel voltage and current arrays
    pub fn from_arrays(voltage: &[f64], current: &[f64]) -> Result<Self, CurveError> {
        if voltage.len() != current.len() {
            return Err(CurveError::ArrayLengthMismatch {
                voltage_len: voltage.len(),
                current_len: current.len(),
            });
        }

        Ok(Self::new(
            voltage
                .iter()
                .zip(current)
                .map(|(&v, &c)| CurvePoint::new(v, c))
                .collect(),
        ))
    }

    /// Attach a label to this curve
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Number of points in the curve
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if the curve has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point at `index`, if present
    pub fn get(&self, index: usize) -> Option<&CurvePoint> {
        self.points.get(index)
    }

    /// Copy of the voltage column
    pub fn voltages(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.voltage).collect()
    }

    /// Copy of the current column
    pub fn currents(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.current).collect()
    }

    /// Minimum and maximum voltage, or `None` for an empty curve
    pub fn voltage_range(&self) -> Option<(f64, f64)> {
        range_of(self.points.iter().map(|p| p.voltage))
    }

    /// Minimum and maximum current, or `None` for an empty curve
    pub fn current_range(&self) -> Option<(f64, f64)> {
        range_of(self.points.iter().map(|p| p.current))
    }

    /// Number of monotonic sweep segments.
    ///
    /// A single forward sweep is one segment; a full forward + reverse cycle is two.
    /// Repeated voltages (flat steps) do not start a new segment.
    pub fn sweep_segments(&self) -> usize {
        if self.points.is_empty() {
            return 0;
        }

        let mut segments = 1;
        let mut direction = 0i8;
        for pair in self.points.windows(2) {
            let delta = pair[1].voltage - pair[0].voltage;
            let step = if delta > 0.0 {
                1
            } else if delta < 0.0 {
                -1
            } else {
                continue;
            };

            if direction != 0 && step != direction {
                segments += 1;
            }
            direction = step;
        }
        segments
    }

    /// Display name for logs: the label, or `curve #<index>`
    pub(crate) fn display_name(&self, index: usize) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("curve #{}", index),
        }
    }
}

impl FromIterator<CurvePoint> for Curve {
    fn from_iter<I: IntoIterator<Item = CurvePoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl From<Vec<(f64, f64)>> for Curve {
    fn from(pairs: Vec<(f64, f64)>) -> Self {
        pairs.into_iter().map(CurvePoint::from).collect()
    }
}

fn range_of(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// A collection of curves believed to share the same nominal scan parameters.
///
/// Emptiness is checked by the aligner, not here, so that an empty set can be
/// reported as a typed error at the point of use.
pub type ReplicateSet = Vec<Curve>;
