//! # shannonigans
//!
//! Entropy-based change-point segmentation of binary data.
//!
//! Splits a byte buffer into contiguous regions of homogeneous statistical
//! character (zero padding, text, code, compressed or encrypted data) by
//! minimizing the length-weighted Shannon entropy of the segments, either
//! for a fixed number of breakpoints or under a per-breakpoint penalty.
//! Detected segments are summarized with offsets, lengths and entropy for
//! downstream reporting or clustering.

pub mod changepoint;
pub mod entropy;
pub mod error;
pub mod logging;
pub mod summary;

pub use error::{Result, SegmentError};

pub mod prelude {
    pub use crate::changepoint::{
        segment, segment_with_cost, Breakpoints, CostKind, DynpConfig, EntropyCost, PeltConfig,
        SegmentCost, Segmentation, SegmentationConfig,
    };
    pub use crate::error::{Result, SegmentError};
    pub use crate::summary::{summarize, Segment, SegmentSummary};
}
