//! PELT (Pruned Exact Linear Time) algorithm for changepoint detection.
//!
//! Minimizes `total_cost + penalty * n_changepoints` without fixing the number
//! of changepoints in advance. With a cost that satisfies
//! [`SegmentCost::supports_pruning`] the candidate set stays small and the
//! search is linear on average; otherwise every earlier position is kept and
//! the search is quadratic but still exact.

use tracing::{debug, trace};

use super::breakpoints::Breakpoints;
use super::cost::{total_cost, SegmentCost, DEFAULT_MIN_SIZE};
use super::{admissible_positions, validate_signal, Segmentation};
use crate::error::{Result, SegmentError};

/// Configuration for PELT algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct PeltConfig {
    /// Penalty for each changepoint (controls number of changepoints)
    pub penalty: f64,
    /// Minimum segment length
    pub min_size: usize,
    /// Spacing of admissible breakpoint positions
    pub jump: usize,
}

impl Default for PeltConfig {
    fn default() -> Self {
        Self {
            penalty: 1.0,
            min_size: DEFAULT_MIN_SIZE,
            jump: 1,
        }
    }
}

impl PeltConfig {
    /// Create a config with the given penalty.
    pub fn new(penalty: f64) -> Self {
        Self {
            penalty,
            ..Default::default()
        }
    }

    /// Create a new config with BIC penalty.
    ///
    /// BIC penalty = log(n) where n is the signal length.
    pub fn with_bic_penalty(n: usize) -> Self {
        Self {
            penalty: (n.max(1) as f64).ln(),
            ..Default::default()
        }
    }

    /// Create a new config with AIC penalty.
    ///
    /// AIC penalty = 2.
    pub fn with_aic_penalty() -> Self {
        Self {
            penalty: 2.0,
            ..Default::default()
        }
    }

    /// Set the penalty.
    pub fn penalty(mut self, penalty: f64) -> Self {
        self.penalty = penalty;
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

/// Detect changepoints using the PELT algorithm.
///
/// Solves `F[t] = min over candidates s of F[s] + error(s, t) + penalty` with
/// `F[0] = -penalty`, so the first segment is not charged. Once
/// `F[s] + error(s, t) > F[t]`, candidate `s` is dropped for good as soon as
/// the search reaches `t + min_size`; until then `t` is not an admissible
/// split for the current end and `s` stays in play. Pruning only happens when
/// the cost reports that it is exact.
///
/// # Errors
/// * [`SegmentError::UnboundCost`] if `cost` is not fitted
/// * [`SegmentError::InvalidParameter`] for an empty signal, a non-positive
///   or non-finite penalty, or an invalid `min_size` / `jump`
pub fn pelt_detect(cost: &dyn SegmentCost, config: &PeltConfig) -> Result<Segmentation> {
    let n = cost.signal_len().ok_or(SegmentError::UnboundCost)?;
    if config.min_size == 0 {
        return Err(SegmentError::invalid("min_size must be at least 1"));
    }
    let min_size = config.min_size.max(cost.min_size());
    validate_signal(n, min_size, config.jump)?;

    let penalty = config.penalty;
    if !(penalty > 0.0) || !penalty.is_finite() {
        return Err(SegmentError::invalid(format!(
            "penalty must be positive and finite, got {penalty}"
        )));
    }

    let prune = cost.supports_pruning();
    debug!(
        len = n,
        penalty,
        min_size,
        jump = config.jump,
        cost = cost.name(),
        prune,
        "running penalized segmentation"
    );

    let positions = admissible_positions(n, config.jump);
    let m = positions.len() - 1;

    // f[j] = minimum penalized cost of segmenting [0, positions[j])
    let mut f = vec![f64::INFINITY; m + 1];
    f[0] = -penalty;

    // prev[j] = position index of the last changepoint before positions[j]
    let mut prev = vec![0usize; m + 1];

    // R = set of candidate changepoints (pruned)
    let mut candidates: Vec<usize> = vec![0];
    // pruned_at[s] = byte position at which s first failed the pruning test
    let mut pruned_at: Vec<Option<usize>> = vec![None; m + 1];
    let mut errors: Vec<Option<f64>> = Vec::new();
    let mut max_candidates = 1;

    for t in 1..=m {
        let end = positions[t];
        let mut best = f64::INFINITY;
        let mut best_s = 0;

        errors.clear();
        for &s in &candidates {
            let start = positions[s];
            if end - start < min_size || !f[s].is_finite() {
                errors.push(None);
                continue;
            }
            let seg_cost = cost.error(start, end)?;
            errors.push(Some(seg_cost));

            let total = f[s] + seg_cost + penalty;
            if total < best {
                best = total;
                best_s = s;
            }
        }

        f[t] = best;
        prev[t] = best_s;

        // Pruning: remove candidates that can never be optimal. A failed test
        // at `end` only rules s out for segment ends at least min_size past
        // `end`, where a split at `end` is admissible.
        if best.is_finite() {
            let mut kept = Vec::with_capacity(candidates.len() + 1);
            for (&s, seg_cost) in candidates.iter().zip(&errors) {
                let keep = match seg_cost {
                    Some(seg_cost) => {
                        if prune && pruned_at[s].is_none() && f[s] + seg_cost > best {
                            pruned_at[s] = Some(end);
                        }
                        pruned_at[s].map_or(true, |at| end < at + min_size)
                    }
                    // Unreachable positions never become reachable
                    None => end - positions[s] < min_size,
                };
                if keep {
                    kept.push(s);
                }
            }
            candidates = kept;
        }

        candidates.push(t);
        max_candidates = max_candidates.max(candidates.len());
    }

    trace!(max_candidates, positions = m, "pelt candidate set");

    // Backtrack to find changepoints
    let mut indices = Vec::new();
    let mut t = m;
    while t > 0 {
        indices.push(positions[t]);
        t = prev[t];
    }
    indices.reverse();

    let breakpoints = Breakpoints::new(indices, n)?;
    let unpenalized = total_cost(cost, breakpoints.as_slice())?;
    debug!(
        breakpoints = ?breakpoints.as_slice(),
        cost = unpenalized,
        "penalized segmentation done"
    );

    Ok(Segmentation {
        breakpoints,
        cost: unpenalized,
        penalty: Some(penalty),
    })
}
