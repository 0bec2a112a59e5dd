//! Exact segmentation with a fixed number of breakpoints.
//!
//! Dynamic programming over `table[k][j]`, the minimum cost of splitting
//! `[0, j)` into `k` segments:
//!
//! ```text
//! table[0][0]   = 0
//! table[0][j>0] = +inf
//! table[k][j]   = min over i < j, j - i >= min_size of table[k-1][i] + error(i, j)
//! ```
//!
//! The optimum for `K` breakpoints is `table[K+1][N]`. Runs in `O(K * N^2)`
//! cost evaluations and keeps `O(K * N)` predecessor pointers, which limits it
//! to inputs of a few thousand candidate positions. Prefer
//! [`pelt_detect`](super::pelt_detect) for whole files.

use tracing::debug;

use super::breakpoints::Breakpoints;
use super::cost::{SegmentCost, DEFAULT_MIN_SIZE};
use super::{admissible_positions, validate_signal, Segmentation};
use crate::error::{Result, SegmentError};

/// Configuration for the exact search.
#[derive(Debug, Clone, PartialEq)]
pub struct DynpConfig {
    /// Number of interior breakpoints to place
    pub n_bkps: usize,
    /// Minimum segment length
    pub min_size: usize,
    /// Spacing of admissible breakpoint positions
    pub jump: usize,
}

impl Default for DynpConfig {
    fn default() -> Self {
        Self {
            n_bkps: 5,
            min_size: DEFAULT_MIN_SIZE,
            jump: 1,
        }
    }
}

impl DynpConfig {
    /// Create a config placing `n_bkps` breakpoints.
    pub fn new(n_bkps: usize) -> Self {
        Self {
            n_bkps,
            ..Default::default()
        }
    }

    /// Set the number of breakpoints.
    pub fn n_bkps(mut self, n_bkps: usize) -> Self {
        self.n_bkps = n_bkps;
        self
    }

    /// Set minimum segment length.
    pub fn min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    /// Only consider breakpoints at multiples of `jump`.
    pub fn jump(mut self, jump: usize) -> Self {
        self.jump = jump;
        self
    }
}

/// Find the partition into exactly `n_bkps + 1` segments of minimal total cost.
///
/// `cost` must already be fitted. The effective minimum segment length is the
/// larger of `config.min_size` and `cost.min_size()`. Among equally good
/// partitions the one with the earliest breakpoints is returned.
///
/// # Errors
/// * [`SegmentError::UnboundCost`] if `cost` is not fitted
/// * [`SegmentError::InvalidParameter`] for an empty signal, a zero or too
///   large `n_bkps`, or an invalid `min_size` / `jump`
/// * [`SegmentError::InfeasiblePartition`] if the `jump` grid leaves no valid partition
pub fn dynp_detect(cost: &dyn SegmentCost, config: &DynpConfig) -> Result<Segmentation> {
    let n = cost.signal_len().ok_or(SegmentError::UnboundCost)?;
    if config.min_size == 0 {
        return Err(SegmentError::invalid("min_size must be at least 1"));
    }
    let min_size = config.min_size.max(cost.min_size());
    validate_signal(n, min_size, config.jump)?;

    let n_bkps = config.n_bkps;
    if n_bkps == 0 {
        return Err(SegmentError::invalid("n_bkps must be at least 1"));
    }
    if n_bkps >= n / min_size {
        return Err(SegmentError::invalid(format!(
            "n_bkps ({n_bkps}) must be smaller than len / min_size ({n} / {min_size})"
        )));
    }

    debug!(
        len = n,
        n_bkps,
        min_size,
        jump = config.jump,
        cost = cost.name(),
        "running exact segmentation"
    );

    let positions = admissible_positions(n, config.jump);
    let m = positions.len() - 1;
    let n_segments = n_bkps + 1;

    // pred[k][j]: position index ending segment k-1 in the best k-segment split of [0, positions[j])
    let mut pred = vec![vec![usize::MAX; m + 1]; n_segments + 1];
    let mut prev = vec![f64::INFINITY; m + 1];
    prev[0] = 0.0;

    for k in 1..=n_segments {
        let mut current = vec![f64::INFINITY; m + 1];
        // Room left for the remaining n_segments - k segments
        let reserve = (n_segments - k) * min_size;

        for j in 1..=m {
            let end = positions[j];
            if end < k * min_size || end + reserve > n {
                continue;
            }
            if k == n_segments && j != m {
                continue;
            }

            let mut best = f64::INFINITY;
            let mut best_i = usize::MAX;
            for i in 0..j {
                let start = positions[i];
                if end - start < min_size {
                    break;
                }
                if !prev[i].is_finite() {
                    continue;
                }
                let total = prev[i] + cost.error(start, end)?;
                if total < best {
                    best = total;
                    best_i = i;
                }
            }

            current[j] = best;
            pred[k][j] = best_i;
        }

        prev = current;
    }

    let total = prev[m];
    if !total.is_finite() {
        return Err(SegmentError::InfeasiblePartition {
            n_bkps,
            min_size,
            jump: config.jump,
            len: n,
        });
    }

    // Backtrack
    let mut indices = Vec::with_capacity(n_segments);
    let mut j = m;
    for k in (1..=n_segments).rev() {
        indices.push(positions[j]);
        j = pred[k][j];
    }
    indices.reverse();

    let breakpoints = Breakpoints::new(indices, n)?;
    debug!(breakpoints = ?breakpoints.as_slice(), cost = total, "exact segmentation done");

    Ok(Segmentation {
        breakpoints,
        cost: total,
        penalty: None,
    })
}
