//! Changepoint detection over byte buffers.
//!
//! Partitions a buffer into contiguous segments of homogeneous statistical
//! character by minimizing the summed cost of the segments.
//!
//! # Available Algorithms
//!
//! - **Dynp**: exact search for a fixed number of breakpoints, `O(K * N^2)`
//! - **PELT**: Pruned Exact Linear Time, penalized search with a free number
//!   of breakpoints, `O(N)` on average for prunable costs
//!
//! # Cost Functions
//!
//! - **Entropy**: length-weighted normalized Shannon entropy (default)
//! - **L2**: squared deviations of byte values from the segment mean
//!
//! # Example
//!
//! ```
//! use shannonigans::changepoint::{segment, SegmentationConfig};
//!
//! // A run of zeros followed by a run of distinct byte values
//! let mut buffer = vec![0u8; 100];
//! buffer.extend((0..100u32).map(|i| ((i * 37 + 11) % 256) as u8));
//!
//! let result = segment(&buffer, &SegmentationConfig::exact(1)).unwrap();
//! assert_eq!(result.breakpoints.as_slice(), &[100, 200]);
//!
//! let result = segment(&buffer, &SegmentationConfig::penalized(1e6)).unwrap();
//! assert_eq!(result.breakpoints.as_slice(), &[200]);
//! ```

pub mod breakpoints;
pub mod cost;
pub mod dynp;
pub mod pelt;

use std::ops::Range;

use serde::Serialize;

pub use breakpoints::Breakpoints;
pub use cost::{total_cost, CostKind, EntropyCost, L2Cost, SegmentCost, DEFAULT_MIN_SIZE};
pub use dynp::{dynp_detect, DynpConfig};
pub use pelt::{pelt_detect, PeltConfig};

use crate::error::{Result, SegmentError};

/// Search strategy and its parameters. Exactly one mode per invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentationConfig {
    /// Exact search for a fixed number of breakpoints.
    Exact(DynpConfig),
    /// Penalized search with a free number of breakpoints.
    Penalized(PeltConfig),
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        SegmentationConfig::Exact(DynpConfig::default())
    }
}

impl SegmentationConfig {
    /// Exact mode with `n_bkps` breakpoints and default limits.
    pub fn exact(n_bkps: usize) -> Self {
        SegmentationConfig::Exact(DynpConfig::new(n_bkps))
    }

    /// Penalized mode with the given per-breakpoint penalty.
    pub fn penalized(penalty: f64) -> Self {
        SegmentationConfig::Penalized(PeltConfig::new(penalty))
    }

    /// Set minimum segment length.
    pub fn min_size(self, min_size: usize) -> Self {
        match self {
            SegmentationConfig::Exact(c) => SegmentationConfig::Exact(c.min_size(min_size)),
            SegmentationConfig::Penalized(c) => {
                SegmentationConfig::Penalized(c.min_size(min_size))
            }
        }
    }

    /// Only consider breakpoints at multiples of `jump`.
    pub fn jump(self, jump: usize) -> Self {
        match self {
            SegmentationConfig::Exact(c) => SegmentationConfig::Exact(c.jump(jump)),
            SegmentationConfig::Penalized(c) => SegmentationConfig::Penalized(c.jump(jump)),
        }
    }

    /// Configured minimum segment length.
    pub fn min_size_value(&self) -> usize {
        match self {
            SegmentationConfig::Exact(c) => c.min_size,
            SegmentationConfig::Penalized(c) => c.min_size,
        }
    }
}

/// Result of a segmentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segmentation {
    /// Segment end indices, the last equal to the signal length
    pub breakpoints: Breakpoints,
    /// Total cost of the segments (excluding penalty)
    pub cost: f64,
    /// Per-breakpoint penalty, set in penalized mode
    pub penalty: Option<f64>,
}

impl Segmentation {
    /// Interior changepoints.
    pub fn changepoints(&self) -> &[usize] {
        self.breakpoints.changepoints()
    }

    /// Number of changepoints
    pub fn n_changepoints(&self) -> usize {
        self.breakpoints.n_changepoints()
    }

    /// Segment boundaries as half-open ranges.
    pub fn segments(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.breakpoints.segments()
    }

    /// Objective value minimized by the penalized search.
    ///
    /// Equal to `cost` in exact mode.
    pub fn penalized_cost(&self) -> f64 {
        match self.penalty {
            Some(penalty) => self.cost + penalty * self.n_changepoints() as f64,
            None => self.cost,
        }
    }
}

/// Segment `signal` with the entropy cost.
pub fn segment(signal: &[u8], config: &SegmentationConfig) -> Result<Segmentation> {
    let mut cost = EntropyCost::new().with_min_size(config.min_size_value());
    segment_with_cost(&mut cost, signal, config)
}

/// Fit `cost` to `signal` and run the configured search.
///
/// The cost is left bound to `signal` so callers can evaluate further ranges.
pub fn segment_with_cost(
    cost: &mut dyn SegmentCost,
    signal: &[u8],
    config: &SegmentationConfig,
) -> Result<Segmentation> {
    cost.fit(signal)?;
    match config {
        SegmentationConfig::Exact(c) => dynp_detect(cost, c),
        SegmentationConfig::Penalized(c) => pelt_detect(cost, c),
    }
}

/// Check the parameters shared by both searches.
pub(crate) fn validate_signal(len: usize, min_size: usize, jump: usize) -> Result<()> {
    if len == 0 {
        return Err(SegmentError::invalid("signal is empty"));
    }
    if min_size == 0 {
        return Err(SegmentError::invalid("min_size must be at least 1"));
    }
    if min_size > len {
        return Err(SegmentError::invalid(format!(
            "min_size ({min_size}) exceeds signal length ({len})"
        )));
    }
    if jump == 0 {
        return Err(SegmentError::invalid("jump must be at least 1"));
    }
    Ok(())
}

/// `0`, every multiple of `jump` below `len`, then `len`.
pub(crate) fn admissible_positions(len: usize, jump: usize) -> Vec<usize> {
    let mut positions: Vec<usize> = (0..len).step_by(jump).collect();
    positions.push(len);
    positions
}
