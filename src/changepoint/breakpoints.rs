//! Validated breakpoint lists.

use std::ops::Range;

use serde::Serialize;

use crate::error::{Result, SegmentError};

/// Ordered segment end indices partitioning `[0, len)`.
///
/// The list is strictly increasing, starts above 0 and always ends with the
/// signal length, so consecutive entries describe contiguous, non-overlapping,
/// gap-free segments. The leading 0 is implicit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Breakpoints(Vec<usize>);

impl Breakpoints {
    /// Validate `indices` as a partition of a signal of length `len`.
    pub fn new(indices: Vec<usize>, len: usize) -> Result<Self> {
        validate(&indices, len)?;
        Ok(Self(indices))
    }

    /// The trivial partition: one segment covering everything.
    pub(crate) fn whole(len: usize) -> Self {
        Self(vec![len])
    }

    /// All segment ends, including the final signal length.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }

    /// Interior changepoints, i.e. every breakpoint except the final length.
    pub fn changepoints(&self) -> &[usize] {
        &self.0[..self.0.len() - 1]
    }

    /// Number of interior changepoints.
    pub fn n_changepoints(&self) -> usize {
        self.0.len() - 1
    }

    /// Number of segments.
    pub fn n_segments(&self) -> usize {
        self.0.len()
    }

    /// Length of the partitioned signal.
    pub fn signal_len(&self) -> usize {
        self.0[self.0.len() - 1]
    }

    /// Iterate over segments as half-open ranges.
    pub fn segments(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        std::iter::once(0)
            .chain(self.0.iter().copied())
            .zip(self.0.iter().copied())
            .map(|(start, end)| start..end)
    }

    /// Get the segment containing a specific index.
    pub fn segment_for_index(&self, index: usize) -> Option<Range<usize>> {
        self.segments().find(|segment| segment.contains(&index))
    }
}

impl AsRef<[usize]> for Breakpoints {
    fn as_ref(&self) -> &[usize] {
        &self.0
    }
}

/// Check that `indices` partitions `[0, len)`.
pub(crate) fn validate(indices: &[usize], len: usize) -> Result<()> {
    let Some(&last) = indices.last() else {
        return Err(SegmentError::invalid("breakpoints must not be empty"));
    };
    if last != len {
        return Err(SegmentError::invalid(format!(
            "last breakpoint {last} must equal the signal length {len}"
        )));
    }
    if indices[0] == 0 {
        return Err(SegmentError::invalid("breakpoints must be greater than 0"));
    }
    if let Some(pair) = indices.windows(2).find(|pair| pair[0] >= pair[1]) {
        return Err(SegmentError::invalid(format!(
            "breakpoints must be strictly increasing, found {} then {}",
            pair[0], pair[1]
        )));
    }
    Ok(())
}
