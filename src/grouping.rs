//! # Replicate Grouping
//!
//! Measurements from one session usually mix several scan rates. Each scan rate
//! forms its own replicate set, so curves are grouped by a label (typically the
//! scan-rate string recorded with the scan, e.g. `"100 mV/s"`) and every group is
//! averaged on its own.
//!
//! With the `parallel` feature enabled, groups are averaged on the rayon thread
//! pool. The result is the same either way since each group is independent.

use std::collections::BTreeMap;

use log::info;

use crate::aligner::{AlignError, AlignmentSummary, ReplicateAligner};
use crate::averaged::AveragedCurve;
use crate::curve::{Curve, ReplicateSet};

/// Label used for curves that carry no label of their own
pub const UNLABELLED_GROUP: &str = "unlabelled";

/// Errors that can occur while averaging grouped replicates
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GroupingError {
    /// A single group failed to align
    #[error("Failed to average group '{label}': {source}")]
    Group {
        /// Label of the failing group
        label: String,
        /// Underlying alignment error
        #[source]
        source: AlignError,
    },
}

/// Replicate sets keyed by label, in label order
#[derive(Debug, Clone, Default)]
pub struct ReplicateGroups {
    groups: BTreeMap<String, ReplicateSet>,
}

/// Averaged output for one group
#[derive(Debug, Clone)]
pub struct GroupResult {
    /// Group label
    pub label: String,
    /// Averaged curve for the group
    pub averaged: AveragedCurve,
    /// Matching diagnostics for the group
    pub summary: AlignmentSummary,
}

impl ReplicateGroups {
    /// Create an empty grouping
    pub fn new() -> Self {
        Self::default()
    }

    /// Group curves by their own label; unlabelled curves share one group
    pub fn from_labelled(curves: impl IntoIterator<Item = Curve>) -> Self {
        let mut groups = Self::new();
        for curve in curves {
            let label = curve
                .label
                .clone()
                .unwrap_or_else(|| UNLABELLED_GROUP.to_string());
            groups.insert(label, curve);
        }
        groups
    }

    /// Add a curve to the group named `label`
    pub fn insert(&mut self, label: impl Into<String>, curve: Curve) {
        self.groups.entry(label.into()).or_default().push(curve);
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True if no curves have been added
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Replicate set for a label
    pub fn get(&self, label: &str) -> Option<&ReplicateSet> {
        self.groups.get(label)
    }

    /// Group labels in sorted order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Average every group with the given aligner.
    ///
    /// Results are returned in label order. A failing group aborts the whole call
    /// and is named in the error.
    pub fn average(&self, aligner: &ReplicateAligner) -> Result<Vec<GroupResult>, GroupingError> {
        info!("Averaging {} replicate groups", self.groups.len());

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let entries: Vec<_> = self.groups.iter().collect();
            entries
                .into_par_iter()
                .map(|(label, curves)| average_group(aligner, label, curves))
                .collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            self.groups
                .iter()
                .map(|(label, curves)| average_group(aligner, label, curves))
                .collect()
        }
    }
}

fn average_group(
    aligner: &ReplicateAligner,
    label: &str,
    curves: &[Curve],
) -> Result<GroupResult, GroupingError> {
    let (averaged, summary) =
        aligner
            .align_with_summary(curves)
            .map_err(|source| GroupingError::Group {
                label: label.to_string(),
                source,
            })?;

    info!("  {}: {}", label, summary);

    Ok(GroupResult {
        label: label.to_string(),
        averaged,
        summary,
    })
}
