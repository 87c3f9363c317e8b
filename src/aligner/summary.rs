use serde::{Deserialize, Serialize};

/// How each non-reference replicate contributed to the averaged curve
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentSummary {
    /// Position of the reference curve in the input set
    pub reference_index: usize,

    /// Number of curves in the replicate set
    pub replicate_count: usize,

    /// Number of samples averaged at each output row (`|S_i|`)
    pub sample_counts: Vec<usize>,

    /// Contributions accepted by same-index matching
    pub direct_matches: usize,

    /// Contributions accepted by nearest-voltage fallback
    pub nearest_matches: usize,

    /// Contributions with no point inside the tolerance
    pub skipped: usize,
}

impl AlignmentSummary {
    /// Total contributions the other replicates could have made
    pub fn possible_contributions(&self) -> usize {
        self.direct_matches + self.nearest_matches + self.skipped
    }

    /// Fraction of possible contributions that were accepted.
    ///
    /// Returns 1.0 when there is nothing to align against (a single curve).
    pub fn coverage(&self) -> f64 {
        let possible = self.possible_contributions();
        if possible == 0 {
            return 1.0;
        }
        (self.direct_matches + self.nearest_matches) as f64 / possible as f64
    }

    /// Smallest per-row sample count, or 0 for an empty summary
    pub fn min_samples(&self) -> usize {
        self.sample_counts.iter().copied().min().unwrap_or(0)
    }
}

impl std::fmt::Display for AlignmentSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Aligned {} replicates onto {} points (reference #{}): {} direct, {} nearest, {} skipped ({:.1}% coverage)",
            self.replicate_count,
            self.sample_counts.len(),
            self.reference_index,
            self.direct_matches,
            self.nearest_matches,
            self.skipped,
            self.coverage() * 100.0
        )
    }
}
