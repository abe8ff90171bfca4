//! # LoopDep - Data Dependence and Loop Evolution Analysis
//!
//! An exact integer engine for reasoning about array accesses inside loop
//! nests:
//! - Chains of recurrences (chrecs) as the symbolic representation of how
//!   scalar values evolve across loop iterations
//! - An exact linear-algebra kernel over integers (Bezout identities,
//!   adjugate inverses, Hermite decomposition, rational loop transforms)
//! - ZIV/SIV/MIV subscript dependence testing with classic distance and
//!   direction vectors
//! - A dependence graph and legality checks for loop transformations
//!
//! ## Architecture
//!
//! ```text
//! DataReferences → Subscript tests → Relations → Graph → Legality
//!                        ↑
//!            chrec algebra + integer linear algebra
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use loopdep::prelude::*;
//!
//! // for i in 0..n { A[i] = A[i-1] + 1; }
//! let nest = LoopNest::new(vec![LoopId(1)]);
//! let a = intern("A");
//! let write = DataReference::write(StmtId::new(0), a,
//!     vec![Chrec::affine(LoopId(1), 0, 1)]);
//! let read = DataReference::read(StmtId::new(0), a,
//!     vec![Chrec::affine(LoopId(1), -1, 1)]);
//!
//! let result = DependenceAnalysis::new().analyze(&[write, read], &nest)?;
//! assert!(!result.graph.is_parallelizable(LoopId(1)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algebra;
pub mod chrec;
pub mod dependence;
pub mod legality;
pub mod model;
pub mod utils;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::algebra::matrix::{matrix_hermite, matrix_inverse, IntMatrix};
    pub use crate::algebra::number::{bezout, binomial, gcd, lcm, Bezout};
    pub use crate::algebra::transform::TransformMatrix;
    pub use crate::algebra::vector::IntVector;
    pub use crate::chrec::{evaluate, fold_add, fold_multiply, fold_sub, merge, Chrec};
    pub use crate::dependence::{
        AnalysisResult, DependenceAnalysis, DependenceGraph, DependenceKind,
        DependenceRelation, Direction, DistanceEntry, Subscript, SubscriptClass, Verdict,
    };
    pub use crate::legality::{
        is_interchange_legal, is_transform_legal, lexicographically_positive,
    };
    pub use crate::model::{DataReference, LoopId, LoopNest, StmtId};
    pub use crate::utils::errors::*;
    pub use crate::utils::intern::{intern, Symbol};
}

use anyhow::Result;
use model::{DataReference, LoopNest};

/// Analyze all reference pairs of a nest with the default configuration.
pub fn analyze(
    refs: &[DataReference],
    nest: &LoopNest,
) -> Result<dependence::AnalysisResult> {
    dependence::DependenceAnalysis::new().analyze(refs, nest)
}
