/// Errors that can occur during replicate alignment
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlignError {
    /// No curves were supplied
    #[error("Replicate set is empty: at least one curve is required")]
    EmptyReplicateSet,

    /// A supplied curve has no points
    #[error("Curve {index} in the replicate set has no points")]
    EmptyCurve {
        /// Position of the empty curve in the input set
        index: usize,
    },
}
