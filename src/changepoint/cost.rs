//! Cost functions for changepoint detection.
//!
//! A cost function evaluates how badly a contiguous range of bytes is
//! described as a single homogeneous segment. Lower cost indicates a better fit.
//!
//! Costs are bound to a signal once with [`SegmentCost::fit`] and then queried
//! many times with [`SegmentCost::error`], so implementations precompute
//! whatever makes range queries cheap.

use crate::entropy::{HistogramIndex, DEFAULT_STRIDE};
use crate::error::{Result, SegmentError};

/// Default minimum segment length.
pub const DEFAULT_MIN_SIZE: usize = 2;

/// Common interface for segment cost functions.
///
/// This trait is object-safe and can be used as `&mut dyn SegmentCost`.
pub trait SegmentCost {
    /// Short identifier of the cost model.
    fn name(&self) -> &str;

    /// Smallest range length accepted by [`error`](Self::error).
    fn min_size(&self) -> usize;

    /// Bind the cost to a signal. Refitting replaces the previous binding.
    fn fit(&mut self, signal: &[u8]) -> Result<()>;

    /// Cost of treating `[start, end)` as a single segment.
    ///
    /// Fails with [`SegmentError::UnboundCost`] before `fit`, and with
    /// [`SegmentError::InvalidRange`] for empty, out-of-bounds or too short ranges.
    fn error(&self, start: usize, end: usize) -> Result<f64>;

    /// Length of the bound signal, `None` until fitted.
    fn signal_len(&self) -> Option<usize>;

    /// Check if the cost has been fitted.
    fn is_fitted(&self) -> bool {
        self.signal_len().is_some()
    }

    /// Whether PELT pruning is exact for this cost.
    ///
    /// Pruning is only valid when splitting never increases cost, i.e.
    /// `error(a, b) + error(b, c) <= error(a, c)` for all `a < b < c`.
    /// Implementations must not return `true` unless this holds. The search
    /// relies on it only for `b - a` and `c - b` both at least `min_size`, and
    /// applies a pruning decision made at `b` to segment ends `c >= b + min_size`.
    fn supports_pruning(&self) -> bool {
        false
    }
}

/// Closed set of built-in cost models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CostKind {
    /// Length-weighted normalized Shannon entropy of the byte distribution.
    #[default]
    Entropy,
    /// Sum of squared deviations of byte values from the segment mean.
    L2,
}

impl CostKind {
    /// Create an unfitted cost of this kind with the given minimum size.
    pub fn build(self, min_size: usize) -> Box<dyn SegmentCost> {
        match self {
            CostKind::Entropy => Box::new(EntropyCost::new().with_min_size(min_size)),
            CostKind::L2 => Box::new(L2Cost::new().with_min_size(min_size)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CostKind::Entropy => EntropyCost::NAME,
            CostKind::L2 => L2Cost::NAME,
        }
    }
}

fn check_range(start: usize, end: usize, len: usize, min_size: usize) -> Result<()> {
    if start >= end || end > len || end - start < min_size {
        return Err(SegmentError::InvalidRange {
            start,
            end,
            len,
            min_size,
        });
    }
    Ok(())
}

/// Entropy cost: `(end - start) * H(segment) / 8`.
///
/// `H` is the Shannon entropy in bits of the byte-value distribution inside
/// the range, so each byte contributes between 0 (uniform run) and 1 (all 256
/// values equally likely). Weighting by length keeps a partition into many
/// tiny segments from winning automatically.
#[derive(Debug, Clone)]
pub struct EntropyCost {
    min_size: usize,
    stride: usize,
    index: Option<HistogramIndex>,
}

impl Default for EntropyCost {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            stride: DEFAULT_STRIDE,
            index: None,
        }
    }
}

impl EntropyCost {
    pub const NAME: &'static str = "entropy";

    pub fn new() -> Self {
        Self::default()
    }

    /// Set minimum segment length.
    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size.max(1);
        self
    }

    /// Set the distance between stored prefix histograms.
    ///
    /// Smaller strides make queries faster at the price of memory
    /// (`1 KiB` per stored histogram).
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride.max(1);
        self
    }

    /// Normalized entropy of `[start, end)` in `[0, 1]`.
    pub fn normalized_entropy(&self, start: usize, end: usize) -> Result<f64> {
        let index = self.index.as_ref().ok_or(SegmentError::UnboundCost)?;
        check_range(start, end, index.len(), 1)?;
        Ok(index.normalized_entropy(start, end))
    }
}

impl SegmentCost for EntropyCost {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn min_size(&self) -> usize {
        self.min_size
    }

    fn fit(&mut self, signal: &[u8]) -> Result<()> {
        if signal.len() > u32::MAX as usize {
            return Err(SegmentError::invalid(format!(
                "signal of {} bytes exceeds the histogram counter range",
                signal.len()
            )));
        }
        self.index = Some(HistogramIndex::with_stride(signal, self.stride));
        Ok(())
    }

    fn error(&self, start: usize, end: usize) -> Result<f64> {
        let index = self.index.as_ref().ok_or(SegmentError::UnboundCost)?;
        check_range(start, end, index.len(), self.min_size)?;
        Ok((end - start) as f64 * index.normalized_entropy(start, end))
    }

    fn signal_len(&self) -> Option<usize> {
        self.index.as_ref().map(HistogramIndex::len)
    }

    fn supports_pruning(&self) -> bool {
        // n * H is concave under concatenation
        true
    }
}

/// L2 cost: sum of squared deviations of byte values from the segment mean.
///
/// Detects shifts in the average byte value rather than in its spread.
#[derive(Debug, Clone)]
pub struct L2Cost {
    min_size: usize,
    cum_sum: Option<Vec<f64>>,
    cum_sum_sq: Vec<f64>,
}

impl Default for L2Cost {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            cum_sum: None,
            cum_sum_sq: Vec::new(),
        }
    }
}

impl L2Cost {
    pub const NAME: &'static str = "l2";

    pub fn new() -> Self {
        Self::default()
    }

    /// Set minimum segment length.
    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size.max(1);
        self
    }
}

impl SegmentCost for L2Cost {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn min_size(&self) -> usize {
        self.min_size
    }

    fn fit(&mut self, signal: &[u8]) -> Result<()> {
        let cum_sum: Vec<f64> = std::iter::once(0.0)
            .chain(signal.iter().scan(0.0, |acc, &x| {
                *acc += x as f64;
                Some(*acc)
            }))
            .collect();

        self.cum_sum_sq = std::iter::once(0.0)
            .chain(signal.iter().scan(0.0, |acc, &x| {
                *acc += (x as f64) * (x as f64);
                Some(*acc)
            }))
            .collect();
        self.cum_sum = Some(cum_sum);
        Ok(())
    }

    fn error(&self, start: usize, end: usize) -> Result<f64> {
        let cum_sum = self.cum_sum.as_ref().ok_or(SegmentError::UnboundCost)?;
        check_range(start, end, cum_sum.len() - 1, self.min_size)?;

        // sum((x - mean)^2) = sum(x^2) - n * mean^2
        let n = (end - start) as f64;
        let sum = cum_sum[end] - cum_sum[start];
        let sum_sq = self.cum_sum_sq[end] - self.cum_sum_sq[start];
        let mean = sum / n;
        Ok((sum_sq - n * mean * mean).max(0.0))
    }

    fn signal_len(&self) -> Option<usize> {
        self.cum_sum.as_ref().map(|c| c.len() - 1)
    }

    fn supports_pruning(&self) -> bool {
        true
    }
}

/// Compute the cost of a whole segmentation.
///
/// # Arguments
/// * `cost` - A fitted cost function
/// * `breakpoints` - Segment end indices, ascending, the last equal to the signal length
pub fn total_cost(cost: &dyn SegmentCost, breakpoints: &[usize]) -> Result<f64> {
    let mut total = 0.0;
    let mut start = 0;

    for &end in breakpoints {
        total += cost.error(start, end)?;
        start = end;
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fitted_entropy(signal: &[u8]) -> EntropyCost {
        let mut cost = EntropyCost::new();
        cost.fit(signal).unwrap();
        cost
    }

    // ==================== EntropyCost ====================

    #[test]
    fn entropy_cost_unbound() {
        let cost = EntropyCost::new();
        assert!(!cost.is_fitted());
        assert_eq!(cost.error(0, 2), Err(SegmentError::UnboundCost));
        assert_eq!(cost.normalized_entropy(0, 2), Err(SegmentError::UnboundCost));
    }

    #[test]
    fn entropy_cost_constant() {
        let cost = fitted_entropy(&[0x41; 50]);
        assert_eq!(cost.error(0, 50).unwrap(), 0.0);
        assert_eq!(cost.error(10, 12).unwrap(), 0.0);
    }

    #[test]
    fn entropy_cost_known() {
        // [0, 1, 0, 1] -> 1 bit -> 4 * 1/8
        let cost = fitted_entropy(&[0, 1, 0, 1]);
        assert_relative_eq!(cost.error(0, 4).unwrap(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(cost.normalized_entropy(0, 4).unwrap(), 0.125, epsilon = 1e-12);
    }

    #[test]
    fn entropy_cost_uniform_is_length() {
        let signal: Vec<u8> = (0..=255u8).collect();
        let cost = fitted_entropy(&signal);
        assert_relative_eq!(cost.error(0, 256).unwrap(), 256.0, epsilon = 1e-9);
    }

    #[test]
    fn entropy_cost_range_checks() {
        let cost = fitted_entropy(&[1, 2, 3, 4, 5]);
        assert!(matches!(cost.error(3, 3), Err(SegmentError::InvalidRange { .. })));
        assert!(matches!(cost.error(4, 2), Err(SegmentError::InvalidRange { .. })));
        assert!(matches!(cost.error(0, 6), Err(SegmentError::InvalidRange { .. })));
        // shorter than min_size
        assert!(matches!(cost.error(1, 2), Err(SegmentError::InvalidRange { .. })));
        assert!(cost.error(3, 5).is_ok());
    }

    #[test]
    fn entropy_cost_min_size_builder() {
        let cost = EntropyCost::new().with_min_size(0);
        assert_eq!(cost.min_size(), 1);
        let cost = EntropyCost::new().with_min_size(8);
        assert_eq!(cost.min_size(), 8);
    }

    #[test]
    fn entropy_cost_stride_does_not_change_values() {
        let signal: Vec<u8> = (0..1000u32).map(|i| ((i * 31 + 7) % 251) as u8).collect();
        let mut coarse = EntropyCost::new().with_stride(512);
        let mut fine = EntropyCost::new().with_stride(3);
        coarse.fit(&signal).unwrap();
        fine.fit(&signal).unwrap();

        for &(s, e) in &[(0, 1000), (17, 900), (500, 502), (3, 515)] {
            assert_relative_eq!(
                coarse.error(s, e).unwrap(),
                fine.error(s, e).unwrap(),
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn entropy_cost_split_never_increases_cost() {
        let signal: Vec<u8> = (0..300u32).map(|i| ((i * i + 3 * i) % 97) as u8).collect();
        let cost = fitted_entropy(&signal);
        for b in (2..298).step_by(13) {
            let whole = cost.error(0, 300).unwrap();
            let split = cost.error(0, b).unwrap() + cost.error(b, 300).unwrap();
            assert!(split <= whole + 1e-9);
        }
        assert!(cost.supports_pruning());
    }

    #[test]
    fn entropy_cost_refit_replaces_binding() {
        let mut cost = fitted_entropy(&[0, 1, 2, 3]);
        assert_eq!(cost.signal_len(), Some(4));
        cost.fit(&[9; 10]).unwrap();
        assert_eq!(cost.signal_len(), Some(10));
        assert_eq!(cost.error(0, 10).unwrap(), 0.0);
    }

    // ==================== L2Cost ====================

    #[test]
    fn l2_cost_unbound() {
        assert_eq!(L2Cost::new().error(0, 2), Err(SegmentError::UnboundCost));
    }

    #[test]
    fn l2_cost_constant() {
        let mut cost = L2Cost::new();
        cost.fit(&[5; 10]).unwrap();
        assert_relative_eq!(cost.error(0, 10).unwrap(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn l2_cost_known() {
        // [1, 2, 3, 4, 5] -> mean = 3 -> 4+1+0+1+4 = 10
        let mut cost = L2Cost::new();
        cost.fit(&[1, 2, 3, 4, 5]).unwrap();
        assert_relative_eq!(cost.error(0, 5).unwrap(), 10.0, epsilon = 1e-10);
        assert_eq!(cost.signal_len(), Some(5));
    }

    // ==================== CostKind ====================

    #[test]
    fn cost_kind_default_is_entropy() {
        assert_eq!(CostKind::default(), CostKind::Entropy);
    }

    #[test]
    fn cost_kind_builds_named_costs() {
        let cost = CostKind::Entropy.build(4);
        assert_eq!(cost.name(), "entropy");
        assert_eq!(cost.min_size(), 4);

        let cost = CostKind::L2.build(2);
        assert_eq!(cost.name(), CostKind::L2.name());
        assert!(!cost.is_fitted());
    }

    // ==================== total_cost ====================

    #[test]
    fn total_cost_single_segment() {
        let signal = [0u8, 1, 0, 1, 7, 7];
        let cost = fitted_entropy(&signal);
        assert_relative_eq!(
            total_cost(&cost, &[6]).unwrap(),
            cost.error(0, 6).unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn total_cost_homogeneous_segments() {
        let mut signal = vec![0u8; 4];
        signal.extend(vec![9u8; 4]);
        let cost = fitted_entropy(&signal);
        assert_eq!(total_cost(&cost, &[4, 8]).unwrap(), 0.0);
        assert!(total_cost(&cost, &[8]).unwrap() > 0.0);
    }

    #[test]
    fn total_cost_propagates_range_errors() {
        let cost = fitted_entropy(&[1, 2, 3, 4]);
        assert!(total_cost(&cost, &[1, 4]).is_err());
    }
}
