//! Legality checks for loop transformations.
//!
//! Every valid dependence in the original program has a lexicographically
//! non-negative distance vector. A transformation of the iteration space
//! is legal when it keeps all of them non-negative; these checks answer
//! that question for loop interchange and for general unimodular
//! transforms.

use crate::algebra::transform::TransformMatrix;
use crate::dependence::graph::DependenceGraph;
use crate::dependence::relation::{Direction, DistanceEntry};
use log::debug;

/// Whether a direction vector is lexicographically positive: the first
/// entry that orders the iterations must be forward.
pub fn lexicographically_positive(directions: &[Direction]) -> bool {
    for d in directions {
        match d {
            Direction::Lt | Direction::Le => return true,
            Direction::Gt | Direction::Ge => return false,
            Direction::Eq => continue,
            Direction::Star => return false,
        }
    }
    // All equal: loop independent.
    true
}

/// Whether interchanging the loops at nest depths `outer` and `inner`
/// preserves every ordering dependence in the graph.
pub fn is_interchange_legal(graph: &DependenceGraph, outer: usize, inner: usize) -> bool {
    graph.edges.iter().all(|edge| {
        if !edge.kind.is_ordering() {
            return true;
        }
        let Some(directions) = &edge.relation.directions else {
            // An undecided relation could be violated.
            return false;
        };
        let mut swapped = directions.clone();
        swapped.swap(outer, inner);
        let legal = lexicographically_positive(&swapped);
        if !legal {
            debug!("interchange {} <-> {} violates {}", outer, inner, edge.relation);
        }
        legal
    })
}

/// Whether applying a unimodular iteration-space transform preserves
/// every ordering dependence.
///
/// Each exact distance vector is mapped through the transform and must
/// stay lexicographically non-negative. Relations without a fully exact
/// vector make the transform illegal, except the all-zero
/// (loop-independent) case which any iteration-space transform preserves.
pub fn is_transform_legal(transform: &TransformMatrix, graph: &DependenceGraph) -> bool {
    if !transform.is_unimodular() {
        return false;
    }
    graph.edges.iter().all(|edge| {
        if !edge.kind.is_ordering() {
            return true;
        }
        let Some(distance) = exact_distance(&edge.relation.distances) else {
            return false;
        };
        if distance.iter().all(|&d| d == 0) {
            return true;
        }
        match transform.apply(&distance) {
            Some(mapped) => {
                let legal = lexicographically_non_negative(&mapped);
                if !legal {
                    debug!(
                        "transform maps distance {:?} to {:?}, violating {}",
                        distance, mapped, edge.relation
                    );
                }
                legal
            }
            None => false,
        }
    })
}

fn exact_distance(distances: &Option<Vec<DistanceEntry>>) -> Option<Vec<i64>> {
    distances.as_ref()?.iter()
        .map(|e| match e {
            DistanceEntry::Exact(d) => Some(*d),
            DistanceEntry::Unknown => None,
        })
        .collect()
}

fn lexicographically_non_negative(distance: &[i64]) -> bool {
    for &d in distance {
        if d > 0 {
            return true;
        }
        if d < 0 {
            return false;
        }
    }
    true
}
