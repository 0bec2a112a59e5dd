//! Error types for the shannonigans library.

use thiserror::Error;

/// Result type alias for segmentation operations.
pub type Result<T> = std::result::Result<T, SegmentError>;

/// Errors that can occur while binding costs, searching for breakpoints or
/// summarizing segments.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SegmentError {
    /// A cost function was queried before being fitted to a signal.
    #[error("cost function must be fitted to a signal before evaluation")]
    UnboundCost,

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No partition of the signal satisfies the segment length constraints.
    #[error(
        "infeasible partition: cannot place {n_bkps} breakpoints in {len} bytes \
         (min_size: {min_size}, jump: {jump})"
    )]
    InfeasiblePartition {
        n_bkps: usize,
        min_size: usize,
        jump: usize,
        len: usize,
    },

    /// A cost was evaluated on a range the bound signal cannot provide.
    #[error("invalid range [{start}, {end}) for signal of length {len} (min_size: {min_size})")]
    InvalidRange {
        start: usize,
        end: usize,
        len: usize,
        min_size: usize,
    },
}

impl SegmentError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SegmentError::InvalidParameter(msg.into())
    }
}
