//! Error types for the dependence analysis engine.
//!
//! Within the algebra itself there are no recoverable errors: the `Top` and
//! `Bottom` chrec sentinels carry "don't know" and "proved independent"
//! through every fold, and documented caller-contract violations (inverting
//! a singular matrix, querying a loop with no subscript) panic. The types
//! here cover the remaining surface: malformed input handed in by the host
//! compiler at the `analyze` boundary.

use thiserror::Error;

/// Top-level error type for the analysis entry points.
#[derive(Error, Debug)]
pub enum LoopDepError {
    /// A data reference carries a different number of access functions
    /// than the other references for the same array base.
    #[error("reference {reference} to `{array}` has {found} subscripts, expected {expected}")]
    DimensionMismatch {
        /// Human-readable reference description
        reference: String,
        /// Array base name
        array: String,
        /// Number of subscripts found
        found: usize,
        /// Number of subscripts the first sighting of the base had
        expected: usize,
    },

    /// An access function mentions a loop that is not part of the nest
    /// being analyzed.
    #[error("access function mentions loop {loop_id}, not in the analyzed nest")]
    UnknownLoop {
        /// The offending loop id
        loop_id: u32,
    },

    /// The loop nest handed in by the host is empty.
    #[error("cannot analyze an empty loop nest")]
    EmptyNest,

    /// Internal invariant failure surfaced as an error rather than a panic.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type using [`LoopDepError`].
pub type LoopDepResult<T> = Result<T, LoopDepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LoopDepError::DimensionMismatch {
            reference: "S1 read".to_string(),
            array: "A".to_string(),
            found: 1,
            expected: 2,
        };
        let s = format!("{}", err);
        assert!(s.contains("`A`"));
        assert!(s.contains("expected 2"));
    }
}
