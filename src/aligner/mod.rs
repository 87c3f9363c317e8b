//! # Replicate Alignment
//!
//! Averages independently sampled cyclic-voltammetry replicates onto one voltage
//! grid and reports, per grid point, the mean current and its standard error.
//!
//! ## Algorithm
//!
//! 1. A single curve is returned as-is with a zero SEM everywhere.
//! 2. Otherwise the longest curve (first one on ties) is the reference grid.
//! 3. For each reference index `i`, the sample set `S_i` starts with the
//!    reference current. Every other replicate then contributes:
//!    - its own point `i`, if that point is within the voltage tolerance, or
//!    - its nearest-voltage point anywhere in the sweep, if that is within the
//!      tolerance, or
//!    - nothing.
//! 4. `mean_i` is the average of `S_i`; `sem_i` is the population standard
//!    deviation of `S_i` divided by `sqrt(|S_i|)`.
//!
//! No interpolation is performed, so every averaged value comes from currents
//! that were actually measured.
//!
//! ## Non-finite input
//!
//! NaN and infinite values are not filtered. They propagate through the mean and
//! variance following IEEE-754 rules; a NaN voltage never matches anything.
//!
//! ## Example
//!
//! ```
//! use cvalign::aligner::align;
//! use cvalign::curve::Curve;
//!
//! let a = Curve::from(vec![(-0.1, 10.0), (0.0, 20.0), (0.1, 10.0)]);
//! let b = Curve::from(vec![(-0.1, 12.0), (0.0, 18.0), (0.1, 8.0)]);
//!
//! let averaged = align(&[a, b])?;
//! assert_eq!(averaged.mean(), &[11.0, 19.0, 9.0]);
//! # Ok::<(), cvalign::aligner::AlignError>(())
//! ```

mod error;
mod summary;

pub use error::AlignError;
pub use summary::AlignmentSummary;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::averaged::AveragedCurve;
use crate::curve::Curve;

/// Default voltage tolerance for matching replicate points (volts)
pub const DEFAULT_VOLTAGE_TOLERANCE: f64 = 0.02;

/// Replicates matching less than this fraction of the reference grid are logged
const LOW_COVERAGE_WARNING: f64 = 0.5;

/// Configuration for the replicate aligner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignerConfig {
    /// Maximum absolute voltage difference (exclusive) for two points to match
    pub voltage_tolerance: f64,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            voltage_tolerance: DEFAULT_VOLTAGE_TOLERANCE,
        }
    }
}

/// Aligns a replicate set onto a reference voltage grid and averages it
#[derive(Debug, Clone, Default)]
pub struct ReplicateAligner {
    config: AlignerConfig,
}

/// Outcome of looking up one replicate at one reference index
#[derive(Debug, Clone, Copy, PartialEq)]
enum PointMatch {
    Direct(f64),
    Nearest(f64),
    Skipped,
}

impl ReplicateAligner {
    /// Create an aligner with the given configuration
    pub fn new(config: AlignerConfig) -> Self {
        Self { config }
    }

    /// Create an aligner with a custom voltage tolerance
    pub fn with_tolerance(voltage_tolerance: f64) -> Self {
        Self::new(AlignerConfig { voltage_tolerance })
    }

    /// Active configuration
    pub fn config(&self) -> &AlignerConfig {
        &self.config
    }

    /// Average a replicate set.
    ///
    /// Fails with [`AlignError::EmptyReplicateSet`] for zero curves and with
    /// [`AlignError::EmptyCurve`] if any curve has no points.
    pub fn align(&self, curves: &[Curve]) -> Result<AveragedCurve, AlignError> {
        self.align_with_summary(curves).map(|(averaged, _)| averaged)
    }

    /// Average a replicate set and report how each replicate was matched
    pub fn align_with_summary(
        &self,
        curves: &[Curve],
    ) -> Result<(AveragedCurve, AlignmentSummary), AlignError> {
        validate(curves)?;

        if curves.len() == 1 {
            let curve = &curves[0];
            let summary = AlignmentSummary {
                reference_index: 0,
                replicate_count: 1,
                sample_counts: vec![1; curve.len()],
                ..Default::default()
            };
            return Ok((AveragedCurve::from_single(curve), summary));
        }

        let reference_index = reference_index(curves);
        let reference = &curves[reference_index];
        debug!(
            "Aligning {} replicates onto {} ({} points, tolerance {} V)",
            curves.len(),
            reference.display_name(reference_index),
            reference.len(),
            self.config.voltage_tolerance
        );

        let mut summary = AlignmentSummary {
            reference_index,
            replicate_count: curves.len(),
            sample_counts: Vec::with_capacity(reference.len()),
            ..Default::default()
        };
        let mut accepted_per_curve = vec![0usize; curves.len()];
        let mut averaged = AveragedCurve::with_capacity(reference.len());
        let mut samples = Vec::with_capacity(curves.len());

        for (i, point) in reference.points.iter().enumerate() {
            samples.clear();
            samples.push(point.current);

            for (curve_index, other) in curves.iter().enumerate() {
                if curve_index == reference_index {
                    continue;
                }

                match self.match_point(other, i, point.voltage) {
                    PointMatch::Direct(current) => {
                        summary.direct_matches += 1;
                        accepted_per_curve[curve_index] += 1;
                        samples.push(current);
                    }
                    PointMatch::Nearest(current) => {
                        summary.nearest_matches += 1;
                        accepted_per_curve[curve_index] += 1;
                        samples.push(current);
                    }
                    PointMatch::Skipped => {
                        summary.skipped += 1;
                    }
                }
            }

            let (mean, sem) = mean_and_sem(&samples);
            averaged.push(point.voltage, mean, sem);
            summary.sample_counts.push(samples.len());
        }

        for (curve_index, curve) in curves.iter().enumerate() {
            if curve_index == reference_index {
                continue;
            }
            let accepted = accepted_per_curve[curve_index];
            let skipped = reference.len() - accepted;
            if skipped > 0 {
                debug!(
                    "{} contributed {} of {} grid points ({} outside tolerance)",
                    curve.display_name(curve_index),
                    accepted,
                    reference.len(),
                    skipped
                );
            }
            if (accepted as f64) < LOW_COVERAGE_WARNING * reference.len() as f64 {
                warn!(
                    "{} matched only {} of {} reference voltages within {} V",
                    curve.display_name(curve_index),
                    accepted,
                    reference.len(),
                    self.config.voltage_tolerance
                );
            }
        }

        debug!("{}", summary);
        Ok((averaged, summary))
    }

    fn match_point(&self, other: &Curve, index: usize, voltage: f64) -> PointMatch {
        let tolerance = self.config.voltage_tolerance;

        if let Some(candidate) = other.get(index) {
            if (candidate.voltage - voltage).abs() < tolerance {
                return PointMatch::Direct(candidate.current);
            }
        }

        // Strict `<` keeps the lowest index on distance ties and never picks NaN.
        let mut best_distance = f64::INFINITY;
        let mut best_current = None;
        for candidate in &other.points {
            let distance = (candidate.voltage - voltage).abs();
            if distance < best_distance {
                best_distance = distance;
                best_current = Some(candidate.current);
            }
        }

        match best_current {
            Some(current) if best_distance < tolerance => PointMatch::Nearest(current),
            _ => PointMatch::Skipped,
        }
    }
}

/// Average a replicate set with the default 0.02 V tolerance
pub fn align(curves: &[Curve]) -> Result<AveragedCurve, AlignError> {
    ReplicateAligner::default().align(curves)
}

fn validate(curves: &[Curve]) -> Result<(), AlignError> {
    if curves.is_empty() {
        return Err(AlignError::EmptyReplicateSet);
    }
    if let Some(index) = curves.iter().position(Curve::is_empty) {
        return Err(AlignError::EmptyCurve { index });
    }
    Ok(())
}

/// Index of the longest curve; the first one wins ties
fn reference_index(curves: &[Curve]) -> usize {
    let mut best = 0;
    for (index, curve) in curves.iter().enumerate() {
        if curve.len() > curves[best].len() {
            best = index;
        }
    }
    best
}

/// Mean and standard error of the mean, using the population variance
fn mean_and_sem(samples: &[f64]) -> (f64, f64) {
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt() / n.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "expected {e}, got {a}");
        }
    }

    #[test]
    fn test_two_replicates() {
        let a = Curve::from(vec![(-0.1, 10.0), (0.0, 20.0), (0.1, 10.0)]);
        let b = Curve::from(vec![(-0.1, 12.0), (0.0, 18.0), (0.1, 8.0)]);

        let averaged = align(&[a, b]).unwrap();
        assert_eq!(averaged.voltage(), &[-0.1, 0.0, 0.1]);
        assert_close(averaged.mean(), &[11.0, 19.0, 9.0]);
        let expected = 1.0 / 2f64.sqrt();
        assert_close(averaged.sem(), &[expected, expected, expected]);
    }

    #[test]
    fn test_single_curve_passthrough() {
        let curve = Curve::from(vec![(0.0, 1.0), (0.1, 2.0), (0.05, 3.0)]);
        let (averaged, summary) = ReplicateAligner::default()
            .align_with_summary(&[curve.clone()])
            .unwrap();

        assert_eq!(averaged.voltage(), curve.voltages().as_slice());
        assert_eq!(averaged.mean(), curve.currents().as_slice());
        assert!(averaged.sem().iter().all(|&s| s == 0.0));
        assert_eq!(summary.sample_counts, vec![1, 1, 1]);
        assert_eq!(summary.possible_contributions(), 0);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(align(&[]), Err(AlignError::EmptyReplicateSet));
        assert_eq!(
            align(&[Curve::default()]),
            Err(AlignError::EmptyCurve { index: 0 })
        );

        let good = Curve::from(vec![(0.0, 1.0)]);
        assert_eq!(
            align(&[good.clone(), good, Curve::default()]),
            Err(AlignError::EmptyCurve { index: 2 })
        );
    }

    #[test]
    fn test_longest_curve_is_reference() {
        let short = Curve::from(vec![(0.0, 1.0), (0.1, 1.0)]);
        let long = Curve::from(vec![(0.0, 3.0), (0.1, 3.0), (0.2, 3.0)]);

        let (averaged, summary) = ReplicateAligner::default()
            .align_with_summary(&[short, long])
            .unwrap();
        assert_eq!(summary.reference_index, 1);
        assert_eq!(averaged.voltage(), &[0.0, 0.1, 0.2]);
        assert_close(averaged.mean(), &[2.0, 2.0, 3.0]);
        assert_eq!(summary.sample_counts, vec![2, 2, 1]);
    }

    #[test]
    fn test_reference_tie_goes_to_first() {
        let a = Curve::from(vec![(0.0, 1.0), (0.5, 1.0)]);
        let b = Curve::from(vec![(0.001, 1.0), (0.501, 1.0)]);
        let (averaged, summary) = ReplicateAligner::default()
            .align_with_summary(&[a, b])
            .unwrap();
        assert_eq!(summary.reference_index, 0);
        assert_eq!(averaged.voltage(), &[0.0, 0.5]);
    }

    #[test]
    fn test_nearest_fallback() {
        // Index 1 of the replicate is far from the reference voltage, but index 2
        // of the replicate sits within tolerance of it.
        let reference = Curve::from(vec![(0.0, 10.0), (0.1, 20.0), (0.2, 30.0)]);
        let replicate = Curve::from(vec![(0.0, 12.0), (0.3, 99.0), (0.105, 22.0)]);

        let (averaged, summary) = ReplicateAligner::default()
            .align_with_summary(&[reference, replicate])
            .unwrap();
        assert_close(averaged.mean(), &[11.0, 21.0, 30.0]);
        assert_eq!(summary.direct_matches, 1);
        assert_eq!(summary.nearest_matches, 1);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn test_out_of_tolerance_contributes_nothing() {
        let reference = Curve::from(vec![(0.0, 10.0), (0.1, 20.0)]);
        let replicate = Curve::from(vec![(0.5, 0.0), (0.6, 0.0)]);

        let (averaged, summary) = ReplicateAligner::default()
            .align_with_summary(&[reference, replicate])
            .unwrap();
        assert_close(averaged.mean(), &[10.0, 20.0]);
        assert_close(averaged.sem(), &[0.0, 0.0]);
        assert_eq!(summary.sample_counts, vec![1, 1]);
        assert_eq!(summary.coverage(), 0.0);
    }

    #[test]
    fn test_tolerance_is_exclusive() {
        let tolerance = 0.25;
        let reference = Curve::from(vec![(0.0, 10.0)]);
        let replicate = Curve::from(vec![(tolerance, 20.0)]);

        let averaged = ReplicateAligner::with_tolerance(tolerance)
            .align(&[reference.clone(), replicate.clone()])
            .unwrap();
        assert_close(averaged.mean(), &[10.0]);

        let averaged = ReplicateAligner::with_tolerance(0.5)
            .align(&[reference, replicate])
            .unwrap();
        assert_close(averaged.mean(), &[15.0]);
    }

    #[test]
    fn test_nearest_tie_takes_lowest_index() {
        let reference = Curve::from(vec![(1.0, 0.0), (0.0, 0.0)]);
        let replicate = Curve::from(vec![(0.25, 8.0), (-0.25, 4.0)]);

        let averaged = ReplicateAligner::with_tolerance(0.5)
            .align(&[reference, replicate])
            .unwrap();
        // Index 1: direct point (-0.25) is in tolerance, so it wins.
        // Index 0: nothing within 0.5 of 1.0.
        assert_close(averaged.mean(), &[0.0, 2.0]);

        let reference = Curve::from(vec![(0.0, 0.0), (5.0, 0.0), (6.0, 0.0)]);
        let replicate = Curve::from(vec![(9.0, 0.0), (0.25, 8.0), (-0.25, 4.0)]);
        let averaged = ReplicateAligner::with_tolerance(0.5)
            .align(&[reference, replicate])
            .unwrap();
        assert_close(&averaged.mean()[..1], &[4.0]);
    }

    #[test]
    fn test_nan_propagates() {
        let a = Curve::from(vec![(0.0, f64::NAN), (0.1, 1.0)]);
        let b = Curve::from(vec![(0.0, 1.0), (0.1, 1.0)]);
        let averaged = align(&[a, b]).unwrap();
        assert!(averaged.mean()[0].is_nan());
        assert_eq!(averaged.mean()[1], 1.0);
    }

    #[test]
    fn test_mean_and_sem() {
        let (mean, sem) = mean_and_sem(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((mean - 5.0).abs() < 1e-12);
        // Population std is 2.0
        assert!((sem - 2.0 / 8f64.sqrt()).abs() < 1e-12);

        assert_eq!(mean_and_sem(&[3.5]), (3.5, 0.0));
    }
}
