//! Per-segment statistics for detected breakpoints.
//!
//! Entropy is recomputed from the raw bytes of each segment, independent of
//! whatever the search evaluated internally. Class labels are left empty
//! here; they come from an external clustering step via
//! [`SegmentSummary::assign_classes`].

use std::fmt;

use serde::Serialize;

use crate::changepoint::breakpoints::validate;
use crate::entropy::{normalized_entropy, MAX_BITS_PER_BYTE};
use crate::error::{Result, SegmentError};

/// A contiguous region `[start, end)` of the analysed buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// Position of the segment, 0-based
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub length: usize,
    /// Shannon entropy normalized to `[0, 1]`
    pub entropy: f64,
    /// Label assigned by an external classifier
    pub class: Option<usize>,
}

impl Segment {
    /// Entropy in bits per byte, in `[0, 8]`.
    pub fn entropy_bits(&self) -> f64 {
        self.entropy * MAX_BITS_PER_BYTE
    }
}

/// One report line; entropy is shown in bits per byte.
impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Segment {}: Start={}, End={}, Length={}, Entropy={:.6}",
            self.index + 1,
            self.start,
            self.end,
            self.length,
            self.entropy_bits()
        )?;
        if let Some(class) = self.class {
            write!(f, ", Class={class}")?;
        }
        Ok(())
    }
}

/// Ordered segments covering a whole buffer.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct SegmentSummary {
    segments: Vec<Segment>,
}

impl SegmentSummary {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    /// Normalized entropy of every segment, in order.
    ///
    /// This is the feature vector handed to a clustering step.
    pub fn entropies(&self) -> Vec<f64> {
        self.segments.iter().map(|s| s.entropy).collect()
    }

    /// Attach one class label per segment.
    pub fn assign_classes(&mut self, labels: &[usize]) -> Result<()> {
        if labels.len() != self.segments.len() {
            return Err(SegmentError::invalid(format!(
                "expected {} class labels, got {}",
                self.segments.len(),
                labels.len()
            )));
        }
        for (segment, &label) in self.segments.iter_mut().zip(labels) {
            segment.class = Some(label);
        }
        Ok(())
    }

    /// Get the segment containing a specific byte offset.
    pub fn segment_at(&self, offset: usize) -> Option<&Segment> {
        self.segments
            .iter()
            .find(|s| offset >= s.start && offset < s.end)
    }

    pub fn into_vec(self) -> Vec<Segment> {
        self.segments
    }
}

impl<'a> IntoIterator for &'a SegmentSummary {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

/// Build per-segment statistics for `breakpoints` over `buffer`.
///
/// # Arguments
/// * `buffer` - The analysed bytes
/// * `breakpoints` - Segment ends, strictly increasing, the last equal to `buffer.len()`
pub fn summarize(buffer: &[u8], breakpoints: &[usize]) -> Result<SegmentSummary> {
    validate(breakpoints, buffer.len())?;

    let segments = std::iter::once(0)
        .chain(breakpoints.iter().copied())
        .zip(breakpoints.iter().copied())
        .enumerate()
        .map(|(index, (start, end))| Segment {
            index,
            start,
            end,
            length: end - start,
            entropy: normalized_entropy(&buffer[start..end]),
            class: None,
        })
        .collect();

    Ok(SegmentSummary { segments })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn zeros_then_uniform() -> Vec<u8> {
        let mut buffer = vec![0u8; 100];
        buffer.extend((0..=255u8).cycle().take(512));
        buffer
    }

    #[test]
    fn summarize_covers_buffer() {
        let buffer = zeros_then_uniform();
        let summary = summarize(&buffer, &[100, 612]).unwrap();

        assert_eq!(summary.len(), 2);
        let first = &summary.segments()[0];
        assert_eq!((first.index, first.start, first.end, first.length), (0, 0, 100, 100));
        assert_eq!(first.entropy, 0.0);
        assert!(first.class.is_none());

        let second = &summary.segments()[1];
        assert_eq!((second.index, second.start, second.end, second.length), (1, 100, 612, 512));
        assert_relative_eq!(second.entropy, 1.0, epsilon = 1e-9);
        assert_relative_eq!(second.entropy_bits(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn summarize_single_segment() {
        let summary = summarize(&[7u8; 10], &[10]).unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary.segments()[0].length, 10);
    }

    #[test]
    fn summarize_rejects_bad_breakpoints() {
        let buffer = [0u8; 10];
        assert!(summarize(&buffer, &[]).is_err());
        assert!(summarize(&buffer, &[5]).is_err());
        assert!(summarize(&buffer, &[5, 5, 10]).is_err());
        assert!(summarize(&buffer, &[0, 10]).is_err());
        assert!(summarize(&buffer, &[5, 11]).is_err());
    }

    #[test]
    fn summary_entropies_and_classes() {
        let buffer = zeros_then_uniform();
        let mut summary = summarize(&buffer, &[50, 100, 612]).unwrap();

        let entropies = summary.entropies();
        assert_eq!(entropies.len(), 3);
        assert_eq!(entropies[0], 0.0);

        assert!(summary.assign_classes(&[0, 1]).is_err());
        summary.assign_classes(&[0, 0, 1]).unwrap();
        let classes: Vec<_> = summary.iter().map(|s| s.class).collect();
        assert_eq!(classes, vec![Some(0), Some(0), Some(1)]);
    }

    #[test]
    fn summary_segment_at() {
        let buffer = zeros_then_uniform();
        let summary = summarize(&buffer, &[100, 612]).unwrap();
        assert_eq!(summary.segment_at(99).map(|s| s.index), Some(0));
        assert_eq!(summary.segment_at(100).map(|s| s.index), Some(1));
        assert!(summary.segment_at(612).is_none());
    }

    #[test]
    fn segment_display() {
        let mut summary = summarize(&[0u8, 0, 1, 1], &[2, 4]).unwrap();
        assert_eq!(
            summary.segments()[1].to_string(),
            "Segment 2: Start=2, End=4, Length=2, Entropy=0.000000"
        );
        summary.assign_classes(&[3, 4]).unwrap();
        assert_eq!(
            summary.segments()[0].to_string(),
            "Segment 1: Start=0, End=2, Length=2, Entropy=0.000000, Class=3"
        );
    }

    #[test]
    fn segment_display_uses_bits_per_byte() {
        let summary = summarize(&[0u8, 1, 0, 1, 2, 3, 4, 5], &[4, 8]).unwrap();
        assert_eq!(summary.segments()[0].entropy, 0.125);
        assert_eq!(
            summary.segments()[0].to_string(),
            "Segment 1: Start=0, End=4, Length=4, Entropy=1.000000"
        );
        assert_eq!(
            summary.segments()[1].to_string(),
            "Segment 2: Start=4, End=8, Length=4, Entropy=2.000000"
        );
    }

    #[test]
    fn summary_serializes_to_json() {
        let summary = summarize(&[1u8, 1, 1, 1], &[4]).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json[0]["start"], 0);
        assert_eq!(json[0]["length"], 4);
        assert!(json[0]["class"].is_null());
    }
}
