//! # cvalign - Replicate Averaging for Cyclic Voltammetry
//!
//! `cvalign` averages repeated cyclic-voltammetry (CV) scans into a single curve
//! with error bars. Replicates acquired with the same scan parameters rarely
//! sample exactly the same voltages or the same number of points; `cvalign`
//! aligns them onto one reference voltage grid and reports the mean current and
//! its standard error of the mean (SEM) at every grid point.
//!
//! ## Key Features
//!
//! - **No interpolation**: every averaged value comes from measured currents,
//!   matched by index first and by nearest voltage as a fallback.
//!
//! - **Graceful partial overlap**: replicates that only cover part of the sweep
//!   still contribute where they match, and the [`aligner::AlignmentSummary`]
//!   reports exactly how much each one contributed.
//!
//! - **Columnar output**: averaged curves are parallel `voltage`/`mean`/`sem`
//!   arrays, written as JSON, CSV or Parquet.
//!
//! ## Quick Start
//!
//! ```rust
//! use cvalign::prelude::*;
//!
//! let a = Curve::from(vec![(-0.1, 10.0), (0.0, 20.0), (0.1, 10.0)]);
//! let b = Curve::from(vec![(-0.1, 12.0), (0.0, 18.0), (0.1, 8.0)]);
//!
//! let aligner = ReplicateAligner::default();
//! let (averaged, summary) = aligner.align_with_summary(&[a, b])?;
//!
//! assert_eq!(averaged.mean(), &[11.0, 19.0, 9.0]);
//! assert!((averaged.sem()[0] - 0.7071).abs() < 1e-4);
//! assert_eq!(summary.sample_counts, vec![2, 2, 2]);
//! # Ok::<(), cvalign::aligner::AlignError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`curve`]: input data model (`CurvePoint`, `Curve`, `ReplicateSet`)
//! - [`averaged`]: output data model (`AveragedCurve`)
//! - [`aligner`]: the alignment and statistics core
//! - [`grouping`]: split curves by scan-rate label and average each group
//! - [`io`]: JSON, CSV and Parquet interchange
//! - [`schema`] and [`metadata`]: Parquet layout and footer provenance
//!
//! ## Thread Safety
//!
//! Alignment is a pure function of its inputs. Every public type is `Send + Sync`
//! and can be used from several threads without synchronization.

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod aligner;
pub mod averaged;
pub mod curve;
pub mod grouping;
pub mod io;
pub mod metadata;
pub mod schema;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::aligner::{
        align, AlignError, AlignerConfig, AlignmentSummary, ReplicateAligner,
        DEFAULT_VOLTAGE_TOLERANCE,
    };
    pub use crate::averaged::AveragedCurve;
    pub use crate::curve::{Curve, CurveError, CurvePoint, ReplicateSet};
    pub use crate::grouping::{GroupResult, GroupingError, ReplicateGroups};
    pub use crate::io::{read_curves, DataFormat, IoError};
    pub use crate::metadata::AveragingMetadata;
}
