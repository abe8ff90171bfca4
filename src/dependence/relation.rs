//! Dependence relations between reference pairs.
//!
//! A [`DependenceRelation`] aggregates the per-dimension subscript results
//! for one pair of data references into a single verdict, and summarizes
//! the surviving conflicts as classic distance and direction vectors over
//! the shared loop nest.

use crate::chrec::Chrec;
use crate::dependence::subscript::{analyze_subscript, Subscript};
use crate::model::{DataReference, LoopId, LoopNest};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a dependence along one loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Source iteration precedes target (positive distance)
    Lt,
    /// Precedes or equal
    Le,
    /// Same iteration (zero distance)
    Eq,
    /// Follows or equal
    Ge,
    /// Source iteration follows target (negative distance)
    Gt,
    /// Unknown direction
    Star,
}

impl Direction {
    /// The direction corresponding to a known constant distance.
    pub fn from_distance(distance: i64) -> Direction {
        match distance.cmp(&0) {
            std::cmp::Ordering::Greater => Direction::Lt,
            std::cmp::Ordering::Equal => Direction::Eq,
            std::cmp::Ordering::Less => Direction::Gt,
        }
    }

    /// Least upper bound of two directions.
    pub fn union(self, other: Direction) -> Direction {
        use Direction::*;
        if self == other {
            return self;
        }
        match (self, other) {
            (Lt, Eq) | (Eq, Lt) | (Lt, Le) | (Le, Lt) | (Eq, Le) | (Le, Eq) => Le,
            (Gt, Eq) | (Eq, Gt) | (Gt, Ge) | (Ge, Gt) | (Eq, Ge) | (Ge, Eq) => Ge,
            _ => Star,
        }
    }

    /// The direction seen from the opposite reference order.
    pub fn reverse(self) -> Direction {
        match self {
            Direction::Lt => Direction::Gt,
            Direction::Le => Direction::Ge,
            Direction::Gt => Direction::Lt,
            Direction::Ge => Direction::Le,
            Direction::Eq => Direction::Eq,
            Direction::Star => Direction::Star,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Lt => "<",
            Direction::Le => "<=",
            Direction::Eq => "=",
            Direction::Ge => ">=",
            Direction::Gt => ">",
            Direction::Star => "*",
        };
        f.write_str(s)
    }
}

/// Outcome of testing a reference pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// A dependence may exist; subscripts and vectors describe it
    Pending,
    /// The tester could not decide
    Unknown,
    /// Proven independent
    Independent,
}

/// One component of a classic distance vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceEntry {
    /// Constant iteration distance along the loop
    Exact(i64),
    /// Distance varies or could not be computed
    Unknown,
}

impl fmt::Display for DistanceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceEntry::Exact(d) => write!(f, "{}", d),
            DistanceEntry::Unknown => f.write_str("*"),
        }
    }
}

/// The complete dependence-test result for one pair of references.
#[derive(Debug, Clone)]
pub struct DependenceRelation {
    /// First reference of the pair
    pub ref_a: DataReference,
    /// Second reference of the pair
    pub ref_b: DataReference,
    /// Overall outcome
    pub verdict: Verdict,
    /// Per-dimension results, populated only while the verdict is
    /// `Pending`
    pub subscripts: Vec<Subscript>,
    /// Distance per nest loop, outermost first; `None` until the verdict
    /// is `Pending`
    pub distances: Option<Vec<DistanceEntry>>,
    /// Direction per nest loop, outermost first
    pub directions: Option<Vec<Direction>>,
}

impl DependenceRelation {
    /// Test a pair of references against the shared loop nest.
    ///
    /// Distances follow the convention `iteration(b) - iteration(a)`: a
    /// positive distance means the conflict in `a` happens in an earlier
    /// iteration than the matching conflict in `b`.
    ///
    /// References to distinct bases are `Independent`. References to the
    /// same base with differing dimensionality are `Unknown`, not
    /// `Independent`: mismatched ranks can still touch the same memory,
    /// and the per-dimension model has no way to prove otherwise.
    pub fn analyze(a: &DataReference, b: &DataReference, nest: &LoopNest) -> DependenceRelation {
        let mut relation = DependenceRelation {
            ref_a: a.clone(),
            ref_b: b.clone(),
            verdict: Verdict::Pending,
            subscripts: Vec::new(),
            distances: None,
            directions: None,
        };

        if a.base != b.base {
            // Distinct bases cannot alias.
            relation.verdict = Verdict::Independent;
            return relation;
        }
        if a.num_dimensions() != b.num_dimensions() {
            // Same base at different ranks may still overlap; give up
            // rather than claim independence.
            relation.verdict = Verdict::Unknown;
            return relation;
        }

        for (fn_a, fn_b) in a.access_fns.iter().zip(&b.access_fns) {
            let sub = analyze_subscript(fn_a, fn_b);
            if sub.is_independent() {
                debug!("{} vs {}: independent subscript {} / {}", a, b, fn_a, fn_b);
                relation.verdict = Verdict::Independent;
                relation.subscripts.clear();
                return relation;
            }
            if sub.is_unknown() {
                relation.verdict = Verdict::Unknown;
                relation.subscripts.clear();
                return relation;
            }
            relation.subscripts.push(sub);
        }

        match build_vectors(nest, &relation.subscripts) {
            Some((distances, directions)) => {
                relation.distances = Some(distances);
                relation.directions = Some(directions);
            }
            None => {
                // Coupled subscripts demand incompatible distances on the
                // same loop; no single iteration pair satisfies all of
                // them.
                debug!("{} vs {}: incoherent coupled subscripts", a, b);
                relation.verdict = Verdict::Independent;
                relation.subscripts.clear();
            }
        }
        relation
    }

    /// Whether a dependence may exist.
    pub fn may_depend(&self) -> bool {
        !matches!(self.verdict, Verdict::Independent)
    }

    /// Distance along one loop of the nest, when computed.
    pub fn distance_in(&self, nest: &LoopNest, loop_id: LoopId) -> Option<DistanceEntry> {
        let depth = nest.depth_of(loop_id)?;
        self.distances.as_ref().map(|d| d[depth])
    }

    /// Direction along one loop of the nest, when computed.
    pub fn direction_in(&self, nest: &LoopNest, loop_id: LoopId) -> Option<Direction> {
        let depth = nest.depth_of(loop_id)?;
        self.directions.as_ref().map(|d| d[depth])
    }

    /// Whether the dependence is carried by `loop_id`: the distance there
    /// is nonzero (or unknown) and every outer loop has distance zero.
    pub fn is_carried_by(&self, nest: &LoopNest, loop_id: LoopId) -> bool {
        let Some(depth) = nest.depth_of(loop_id) else {
            return false;
        };
        let Some(distances) = &self.distances else {
            return false;
        };
        if distances[..depth]
            .iter()
            .any(|d| !matches!(d, DistanceEntry::Exact(0)))
        {
            return false;
        }
        !matches!(distances[depth], DistanceEntry::Exact(0))
    }
}

impl fmt::Display for DependenceRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {:?}", self.ref_a, self.ref_b, self.verdict)?;
        if let Some(distances) = &self.distances {
            write!(f, " distance (")?;
            for (i, d) in distances.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", d)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Merge per-subscript distances into per-loop vectors. Returns `None`
/// when two subscripts constrain the same loop to different constant
/// distances.
fn build_vectors(
    nest: &LoopNest,
    subscripts: &[Subscript],
) -> Option<(Vec<DistanceEntry>, Vec<Direction>)> {
    let mut entries: Vec<Option<DistanceEntry>> = vec![None; nest.depth()];

    for sub in subscripts {
        let constraint = match sub.distance {
            Chrec::IntCst(d) if sub.loops.len() == 1 => DistanceEntry::Exact(d),
            _ => DistanceEntry::Unknown,
        };
        for &loop_id in &sub.loops {
            let Some(depth) = nest.depth_of(loop_id) else {
                continue;
            };
            entries[depth] = match (entries[depth], constraint) {
                (None, c) => Some(c),
                (Some(DistanceEntry::Exact(d1)), DistanceEntry::Exact(d2)) if d1 != d2 => {
                    return None;
                }
                (Some(DistanceEntry::Exact(d)), _) | (_, DistanceEntry::Exact(d)) => {
                    Some(DistanceEntry::Exact(d))
                }
                _ => Some(DistanceEntry::Unknown),
            };
        }
    }

    // Loops enclosing both references but absent from every access
    // function repeat the same elements each iteration.
    let distances: Vec<DistanceEntry> = entries
        .into_iter()
        .map(|e| e.unwrap_or(DistanceEntry::Exact(1)))
        .collect();
    let directions = distances
        .iter()
        .map(|d| match d {
            DistanceEntry::Exact(d) => Direction::from_distance(*d),
            DistanceEntry::Unknown => Direction::Star,
        })
        .collect();
    Some((distances, directions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StmtId;
    use crate::utils::intern::intern;

    fn l(n: u32) -> LoopId {
        LoopId(n)
    }

    fn nest2() -> LoopNest {
        LoopNest::new(vec![l(1), l(2)])
    }

    #[test]
    fn test_direction_union() {
        assert_eq!(Direction::Lt.union(Direction::Eq), Direction::Le);
        assert_eq!(Direction::Gt.union(Direction::Ge), Direction::Ge);
        assert_eq!(Direction::Lt.union(Direction::Gt), Direction::Star);
        assert_eq!(Direction::Eq.union(Direction::Eq), Direction::Eq);
    }

    #[test]
    fn test_distinct_bases_independent() {
        let a = DataReference::write(StmtId::new(0), intern("rel_A"), vec![Chrec::int(0)]);
        let b = DataReference::read(StmtId::new(1), intern("rel_B"), vec![Chrec::int(0)]);
        let rel = DependenceRelation::analyze(&a, &b, &nest2());
        assert_eq!(rel.verdict, Verdict::Independent);
        assert!(!rel.may_depend());
    }

    #[test]
    fn test_dimension_mismatch_unknown() {
        let base = intern("rel_C");
        let a = DataReference::write(StmtId::new(0), base, vec![Chrec::int(0)]);
        let b = DataReference::read(StmtId::new(1), base, vec![Chrec::int(0), Chrec::int(0)]);
        let rel = DependenceRelation::analyze(&a, &b, &nest2());
        assert_eq!(rel.verdict, Verdict::Unknown);
    }

    #[test]
    fn test_unit_distance_vector() {
        // for i: A[i] = ... A[i-1]: distance 1 in loop 1, 1 in the
        // unmentioned loop 2.
        let base = intern("rel_D");
        let a = DataReference::write(StmtId::new(0), base, vec![Chrec::affine(l(1), 0, 1)]);
        let b = DataReference::read(StmtId::new(0), base, vec![Chrec::affine(l(1), -1, 1)]);
        let rel = DependenceRelation::analyze(&a, &b, &nest2());
        assert_eq!(rel.verdict, Verdict::Pending);
        assert_eq!(
            rel.distances.as_ref().unwrap(),
            &[DistanceEntry::Exact(1), DistanceEntry::Exact(1)]
        );
        assert_eq!(
            rel.directions.as_ref().unwrap(),
            &[Direction::Lt, Direction::Lt]
        );
        assert!(rel.is_carried_by(&nest2(), l(1)));
        assert!(!rel.is_carried_by(&nest2(), l(2)));
    }

    #[test]
    fn test_self_dependence_zero_distance() {
        let base = intern("rel_E");
        let a = DataReference::write(
            StmtId::new(0),
            base,
            vec![Chrec::affine(l(1), 0, 1), Chrec::affine(l(2), 0, 1)],
        );
        let rel = DependenceRelation::analyze(&a, &a.clone(), &nest2());
        assert_eq!(rel.verdict, Verdict::Pending);
        assert_eq!(
            rel.distances.as_ref().unwrap(),
            &[DistanceEntry::Exact(0), DistanceEntry::Exact(0)]
        );
    }

    #[test]
    fn test_coupled_subscripts_independent() {
        // T[i+1][i] vs T[i][i]: the first subscript wants distance 1,
        // the second wants 0.
        let base = intern("rel_T");
        let a = DataReference::write(
            StmtId::new(0),
            base,
            vec![Chrec::affine(l(1), 1, 1), Chrec::affine(l(1), 0, 1)],
        );
        let b = DataReference::read(
            StmtId::new(1),
            base,
            vec![Chrec::affine(l(1), 0, 1), Chrec::affine(l(1), 0, 1)],
        );
        let rel = DependenceRelation::analyze(&a, &b, &LoopNest::new(vec![l(1)]));
        assert_eq!(rel.verdict, Verdict::Independent);
    }

    #[test]
    fn test_gcd_independent_pair() {
        // A[2i] vs A[2i+1].
        let base = intern("rel_F");
        let a = DataReference::write(StmtId::new(0), base, vec![Chrec::affine(l(1), 0, 2)]);
        let b = DataReference::read(StmtId::new(1), base, vec![Chrec::affine(l(1), 1, 2)]);
        let rel = DependenceRelation::analyze(&a, &b, &LoopNest::new(vec![l(1)]));
        assert_eq!(rel.verdict, Verdict::Independent);
    }

    #[test]
    fn test_unknown_access_function() {
        let base = intern("rel_G");
        let a = DataReference::write(StmtId::new(0), base, vec![Chrec::Top]);
        let b = DataReference::read(StmtId::new(1), base, vec![Chrec::affine(l(1), 0, 1)]);
        let rel = DependenceRelation::analyze(&a, &b, &LoopNest::new(vec![l(1)]));
        assert_eq!(rel.verdict, Verdict::Unknown);
        assert!(rel.may_depend());
    }
}
