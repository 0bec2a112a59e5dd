//! Shannon entropy primitives over raw bytes.
//!
//! Two formulations of the same quantity live here: a direct single-pass
//! histogram over a slice ([`shannon_entropy`]) and a counts-based one
//! ([`entropy_from_counts`]) fed by a [`HistogramIndex`], which answers
//! histogram queries for arbitrary ranges without rescanning the whole range.

/// Maximum entropy of a byte distribution, in bits.
pub const MAX_BITS_PER_BYTE: f64 = 8.0;

/// Default distance between stored prefix histograms.
pub const DEFAULT_STRIDE: usize = 256;

/// Byte frequency histogram.
pub type ByteCounts = [u32; 256];

/// Counts occurrences of each byte value in `data`.
#[inline]
pub fn byte_histogram(data: &[u8]) -> ByteCounts {
    let mut counts = [0u32; 256];
    accumulate(&mut counts, data);
    counts
}

#[inline]
fn accumulate(counts: &mut ByteCounts, data: &[u8]) {
    for &byte in data {
        counts[byte as usize] += 1;
    }
}

/// Shannon entropy of a byte slice in bits per byte.
///
/// Returns a value in `[0, 8]`; an empty slice or a slice of a single repeated
/// value yields 0.
#[inline]
pub fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let counts = byte_histogram(data);
    entropy_from_counts(&counts, data.len())
}

/// Shannon entropy of a byte slice scaled to `[0, 1]`.
#[inline]
pub fn normalized_entropy(data: &[u8]) -> f64 {
    shannon_entropy(data) / MAX_BITS_PER_BYTE
}

/// Shannon entropy in bits computed from a histogram whose counts sum to `total`.
///
/// Zero counts contribute nothing.
pub fn entropy_from_counts(counts: &ByteCounts, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }

    let total = total as f64;
    let mut entropy = 0.0;

    for &count in counts {
        if count == 0 {
            continue;
        }
        let p = count as f64 / total;
        entropy -= p * p.log2();
    }

    if entropy > 0.0 {
        entropy
    } else {
        0.0
    }
}

/// Strided prefix histograms over an owned byte buffer.
///
/// `checkpoints[k]` holds the histogram of `bytes[0..k * stride]`. The
/// histogram of any `[start, end)` is the difference of the two enclosed
/// checkpoints plus at most `2 * stride` bytes counted directly, so a query
/// costs `O(256 + stride)` regardless of the range length.
#[derive(Debug, Clone)]
pub struct HistogramIndex {
    bytes: Vec<u8>,
    stride: usize,
    checkpoints: Vec<ByteCounts>,
}

impl HistogramIndex {
    /// Build an index with the default stride.
    pub fn new(data: &[u8]) -> Self {
        Self::with_stride(data, DEFAULT_STRIDE)
    }

    /// Build an index storing one prefix histogram every `stride` bytes.
    ///
    /// A stride of zero is treated as one.
    pub fn with_stride(data: &[u8], stride: usize) -> Self {
        let stride = stride.max(1);
        let mut checkpoints = Vec::with_capacity(data.len() / stride + 1);
        let mut running = [0u32; 256];
        checkpoints.push(running);

        for chunk in data.chunks_exact(stride) {
            accumulate(&mut running, chunk);
            checkpoints.push(running);
        }

        Self {
            bytes: data.to_vec(),
            stride,
            checkpoints,
        }
    }

    /// Number of indexed bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The indexed bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Histogram of `bytes[start..end]`.
    ///
    /// Bounds are clamped to the buffer; an empty range gives an empty histogram.
    pub fn counts(&self, start: usize, end: usize) -> ByteCounts {
        let end = end.min(self.bytes.len());
        let start = start.min(end);

        let lo = start.div_ceil(self.stride);
        let hi = end / self.stride;

        if lo >= hi {
            return byte_histogram(&self.bytes[start..end]);
        }

        let upper = &self.checkpoints[hi];
        let lower = &self.checkpoints[lo];
        let mut counts = [0u32; 256];
        for (slot, (u, l)) in counts.iter_mut().zip(upper.iter().zip(lower.iter())) {
            *slot = u - l;
        }

        accumulate(&mut counts, &self.bytes[start..lo * self.stride]);
        accumulate(&mut counts, &self.bytes[hi * self.stride..end]);
        counts
    }

    /// Shannon entropy of `bytes[start..end]` in bits per byte.
    pub fn entropy(&self, start: usize, end: usize) -> f64 {
        let end = end.min(self.bytes.len());
        let start = start.min(end);
        entropy_from_counts(&self.counts(start, end), end - start)
    }

    /// Shannon entropy of `bytes[start..end]` scaled to `[0, 1]`.
    pub fn normalized_entropy(&self, start: usize, end: usize) -> f64 {
        self.entropy(start, end) / MAX_BITS_PER_BYTE
    }
}
