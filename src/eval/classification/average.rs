//! Averaging strategies for per-class metrics

/// Averaging strategy for per-class metrics
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Average {
    /// Unweighted mean over classes
    Macro,
    /// Global counts of TP, FP and FN
    Micro,
    /// Mean weighted by support (true instances per class)
    Weighted,
}
