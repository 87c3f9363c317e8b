//! # Averaged Curve
//!
//! Output of replicate alignment: a voltage grid with a mean current and the
//! standard error of that mean at every grid point.
//!
//! Stored as parallel arrays (the "columnar" layout) rather than rows of objects,
//! which keeps JSON and Parquet output compact for long sweeps.

use serde::{Deserialize, Serialize};

use crate::curve::{Curve, CurveError};

/// Point-wise statistical summary of a replicate set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AveragedArrays")]
pub struct AveragedCurve {
    voltage: Vec<f64>,
    mean: Vec<f64>,
    sem: Vec<f64>,
}

#[derive(Deserialize)]
struct AveragedArrays {
    voltage: Vec<f64>,
    mean: Vec<f64>,
    sem: Vec<f64>,
}

impl TryFrom<AveragedArrays> for AveragedCurve {
    type Error = CurveError;

    fn try_from(arrays: AveragedArrays) -> Result<Self, Self::Error> {
        Self::new(arrays.voltage, arrays.mean, arrays.sem)
    }
}

impl AveragedCurve {
    /// Build an averaged curve from parallel arrays.
    ///
    /// All three arrays must have the same length.
    pub fn new(voltage: Vec<f64>, mean: Vec<f64>, sem: Vec<f64>) -> Result<Self, CurveError> {
        for (column, len) in [("mean", mean.len()), ("sem", sem.len())] {
            if len != voltage.len() {
                return Err(CurveError::ColumnLengthMismatch {
                    column,
                    expected: voltage.len(),
                    actual: len,
                });
            }
        }

        Ok(Self { voltage, mean, sem })
    }

    /// Wrap a single curve: its currents become the mean and every SEM is zero
    pub fn from_single(curve: &Curve) -> Self {
        Self {
            voltage: curve.voltages(),
            mean: curve.currents(),
            sem: vec![0.0; curve.len()],
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            voltage: Vec::with_capacity(capacity),
            mean: Vec::with_capacity(capacity),
            sem: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, voltage: f64, mean: f64, sem: f64) {
        self.voltage.push(voltage);
        self.mean.push(mean);
        self.sem.push(sem);
    }

    /// Reference grid voltages
    pub fn voltage(&self) -> &[f64] {
        &self.voltage
    }

    /// Mean current per grid point
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Standard error of the mean per grid point
    pub fn sem(&self) -> &[f64] {
        &self.sem
    }

    /// Number of grid points
    pub fn len(&self) -> usize {
        self.voltage.len()
    }

    /// True if there are no grid points
    pub fn is_empty(&self) -> bool {
        self.voltage.is_empty()
    }

    /// Iterate `(voltage, mean, sem)` rows
    pub fn rows(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.voltage
            .iter()
            .zip(&self.mean)
            .zip(&self.sem)
            .map(|((&v, &m), &s)| (v, m, s))
    }

    /// Decompose into `(voltage, mean, sem)` arrays
    pub fn into_arrays(self) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        (self.voltage, self.mean, self.sem)
    }
}
