//! Data-dependence analysis over a loop nest.
//!
//! The driver takes the data references the host enumerated for one nest,
//! tests every pair with the subscript solvers, and packages the results
//! as relations, classic distance and direction vectors, and a dependence
//! graph.

pub mod graph;
pub mod relation;
pub mod subscript;

pub use graph::{DependenceEdge, DependenceGraph, DependenceKind};
pub use relation::{DependenceRelation, Direction, DistanceEntry, Verdict};
pub use subscript::{analyze_subscript, classify, Subscript, SubscriptClass};

use crate::model::{DataReference, LoopNest};
use crate::utils::errors::LoopDepError;
use anyhow::Result;
use log::{debug, info};
use std::collections::BTreeSet;

/// Configuration of the pairwise dependence analysis.
#[derive(Debug, Clone, Default)]
pub struct DependenceAnalysis {
    /// Also test read-read pairs; they never constrain ordering
    pub include_read_read: bool,
}

/// Everything the analysis produced for one nest.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// One relation per tested pair, in pair order
    pub relations: Vec<DependenceRelation>,
    /// Graph over the non-independent relations
    pub graph: DependenceGraph,
}

impl AnalysisResult {
    /// Relations whose verdict is not `Independent`.
    pub fn dependences(&self) -> Vec<&DependenceRelation> {
        self.relations.iter().filter(|r| r.may_depend()).collect()
    }
}

impl DependenceAnalysis {
    /// Create a driver with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Test every reference pair of the nest, including each reference
    /// against itself.
    pub fn analyze(&self, refs: &[DataReference], nest: &LoopNest) -> Result<AnalysisResult> {
        validate(refs, nest)?;
        info!(
            "analyzing {} references over a nest of depth {}",
            refs.len(),
            nest.depth()
        );

        let mut relations = Vec::new();
        for (i, a) in refs.iter().enumerate() {
            for b in &refs[i..] {
                if a.is_read && b.is_read && !self.include_read_read {
                    continue;
                }
                let relation = DependenceRelation::analyze(a, b, nest);
                debug!("{}", relation);
                relations.push(relation);
            }
        }

        let graph = DependenceGraph::from_relations(&relations, nest);
        Ok(AnalysisResult { relations, graph })
    }
}

fn validate(refs: &[DataReference], nest: &LoopNest) -> Result<(), LoopDepError> {
    if nest.depth() == 0 {
        return Err(LoopDepError::EmptyNest);
    }
    let mut dims_by_base = std::collections::HashMap::new();
    for dr in refs {
        let expected = *dims_by_base.entry(dr.base).or_insert(dr.num_dimensions());
        if dr.num_dimensions() != expected {
            return Err(LoopDepError::DimensionMismatch {
                reference: dr.to_string(),
                array: dr.base.to_string(),
                found: dr.num_dimensions(),
                expected,
            });
        }
        let mut loops = BTreeSet::new();
        for access in &dr.access_fns {
            access.collect_loops(&mut loops);
        }
        for loop_id in loops {
            if !nest.contains(loop_id) {
                return Err(LoopDepError::UnknownLoop {
                    loop_id: loop_id.0,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chrec::Chrec;
    use crate::model::{LoopId, StmtId};
    use crate::utils::intern::intern;

    fn l(n: u32) -> LoopId {
        LoopId(n)
    }

    #[test]
    fn test_driver_pairs() {
        let base = intern("drv_A");
        let nest = LoopNest::new(vec![l(1)]);
        let w = DataReference::write(StmtId::new(0), base, vec![Chrec::affine(l(1), 0, 1)]);
        let r1 = DataReference::read(StmtId::new(1), base, vec![Chrec::affine(l(1), -1, 1)]);
        let r2 = DataReference::read(StmtId::new(1), base, vec![Chrec::affine(l(1), 1, 2)]);

        let result = DependenceAnalysis::new()
            .analyze(&[w, r1, r2], &nest)
            .unwrap();
        // (w,w), (w,r1), (w,r2); the read-read pair is skipped.
        assert_eq!(result.relations.len(), 3);
        assert!(result.dependences().len() >= 2);
    }

    #[test]
    fn test_read_read_included_on_demand() {
        let base = intern("drv_B");
        let nest = LoopNest::new(vec![l(1)]);
        let r1 = DataReference::read(StmtId::new(0), base, vec![Chrec::affine(l(1), 0, 1)]);
        let r2 = DataReference::read(StmtId::new(1), base, vec![Chrec::affine(l(1), 0, 1)]);

        let driver = DependenceAnalysis {
            include_read_read: true,
        };
        let result = driver.analyze(&[r1, r2], &nest).unwrap();
        assert_eq!(result.relations.len(), 3);
        assert!(result
            .graph
            .edges
            .iter()
            .all(|e| e.kind == DependenceKind::Input));
    }

    #[test]
    fn test_empty_nest_rejected() {
        let err = DependenceAnalysis::new()
            .analyze(&[], &LoopNest::new(vec![]))
            .unwrap_err();
        assert!(err.downcast_ref::<LoopDepError>().is_some());
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let base = intern("drv_D");
        let nest = LoopNest::new(vec![l(1)]);
        let w = DataReference::write(StmtId::new(0), base, vec![Chrec::int(0)]);
        let r = DataReference::read(StmtId::new(1), base, vec![Chrec::int(0), Chrec::int(1)]);
        let err = DependenceAnalysis::new()
            .analyze(&[w, r], &nest)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoopDepError>(),
            Some(LoopDepError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_unknown_loop_rejected() {
        let base = intern("drv_C");
        let nest = LoopNest::new(vec![l(1)]);
        let w = DataReference::write(StmtId::new(0), base, vec![Chrec::affine(l(2), 0, 1)]);
        let err = DependenceAnalysis::new().analyze(&[w], &nest).unwrap_err();
        match err.downcast_ref::<LoopDepError>() {
            Some(LoopDepError::UnknownLoop { loop_id }) => assert_eq!(*loop_id, 2),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
