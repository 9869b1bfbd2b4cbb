//! Error types for program transforms and the job workflow.
//!
//! Parsing and geometry never fail; only the transforms that produce machine
//! programs and the artifact plumbing around them return these.

use thiserror::Error;

use crate::store::ArtifactKind;

/// Errors raised by program transforms and artifact handling.
#[derive(Debug, Error)]
pub enum CutplanError {
    /// A reorder request does not name every contour block exactly once.
    #[error("order length {actual} != blocks {expected}")]
    OrderLengthMismatch {
        /// Number of contour blocks found in the program.
        expected: usize,
        /// Number of entries in the requested order.
        actual: usize,
    },

    /// A reorder entry is out of range or repeated.
    #[error("invalid order: {0}")]
    InvalidOrder(String),

    /// An `HKSTR` block is not closed by `HKSTO`.
    #[error("contour block starting at line {line} has no HKSTO")]
    UnterminatedBlock {
        /// 1-based line number of the block's `HKSTR` line.
        line: usize,
    },

    /// A workflow step needs an artifact that was never written.
    #[error("job {job_id} has no {kind} artifact")]
    MissingArtifact {
        /// Job identifier.
        job_id: u64,
        /// Artifact kind that was looked up.
        kind: ArtifactKind,
    },

    /// A stored model could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
