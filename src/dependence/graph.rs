//! Dependence graph over statements.
//!
//! Each edge records the relation between one pair of references whose
//! verdict did not come back `Independent`. Queries answer the questions
//! loop transforms ask: is there any dependence between two statements,
//! and with what distance or direction along a given loop.

use crate::dependence::relation::{DependenceRelation, Direction, DistanceEntry, Verdict};
use crate::model::{LoopId, LoopNest, StmtId};
use std::collections::HashMap;
use std::fmt;

/// Classification of a dependence by the access kinds of its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependenceKind {
    /// Write then read (RAW)
    Flow,
    /// Read then write (WAR)
    Anti,
    /// Write then write (WAW)
    Output,
    /// Read then read
    Input,
}

impl DependenceKind {
    fn of(relation: &DependenceRelation) -> DependenceKind {
        match (relation.ref_a.is_write(), relation.ref_b.is_write()) {
            (true, false) => DependenceKind::Flow,
            (false, true) => DependenceKind::Anti,
            (true, true) => DependenceKind::Output,
            (false, false) => DependenceKind::Input,
        }
    }

    /// Whether the dependence constrains execution order.
    pub fn is_ordering(&self) -> bool {
        !matches!(self, DependenceKind::Input)
    }
}

/// One edge of the graph.
#[derive(Debug, Clone)]
pub struct DependenceEdge {
    /// Statement of the first reference
    pub source: StmtId,
    /// Statement of the second reference
    pub target: StmtId,
    /// Access-kind classification
    pub kind: DependenceKind,
    /// The underlying relation, `Pending` or `Unknown`
    pub relation: DependenceRelation,
}

impl DependenceEdge {
    /// Whether the dependence is carried by some loop rather than staying
    /// within one iteration of the whole nest.
    pub fn is_loop_carried(&self) -> bool {
        match &self.relation.distances {
            Some(distances) => distances
                .iter()
                .any(|d| !matches!(d, DistanceEntry::Exact(0))),
            // Unknown relations must be assumed carried.
            None => true,
        }
    }
}

/// Dependence graph for one loop nest.
#[derive(Debug, Clone)]
pub struct DependenceGraph {
    /// Statements of the nest, in discovery order
    pub statements: Vec<StmtId>,
    /// Non-independent relations
    pub edges: Vec<DependenceEdge>,
    /// The shared loop nest
    pub nest: LoopNest,
    successors: HashMap<StmtId, Vec<usize>>,
    predecessors: HashMap<StmtId, Vec<usize>>,
}

impl DependenceGraph {
    /// Build the graph from analyzed relations, dropping the independent
    /// ones.
    pub fn from_relations(relations: &[DependenceRelation], nest: &LoopNest) -> DependenceGraph {
        let mut graph = DependenceGraph {
            statements: Vec::new(),
            edges: Vec::new(),
            nest: nest.clone(),
            successors: HashMap::new(),
            predecessors: HashMap::new(),
        };
        for relation in relations {
            graph.add_statement(relation.ref_a.stmt);
            graph.add_statement(relation.ref_b.stmt);
            if relation.verdict == Verdict::Independent {
                continue;
            }
            let edge = DependenceEdge {
                source: relation.ref_a.stmt,
                target: relation.ref_b.stmt,
                kind: DependenceKind::of(relation),
                relation: relation.clone(),
            };
            let index = graph.edges.len();
            graph
                .successors
                .entry(edge.source)
                .or_default()
                .push(index);
            graph
                .predecessors
                .entry(edge.target)
                .or_default()
                .push(index);
            graph.edges.push(edge);
        }
        graph
    }

    fn add_statement(&mut self, stmt: StmtId) {
        if !self.statements.contains(&stmt) {
            self.statements.push(stmt);
        }
    }

    /// Edges whose source is `stmt`.
    pub fn outgoing(&self, stmt: StmtId) -> Vec<&DependenceEdge> {
        self.successors
            .get(&stmt)
            .map(|indices| indices.iter().map(|&i| &self.edges[i]).collect())
            .unwrap_or_default()
    }

    /// Edges whose target is `stmt`.
    pub fn incoming(&self, stmt: StmtId) -> Vec<&DependenceEdge> {
        self.predecessors
            .get(&stmt)
            .map(|indices| indices.iter().map(|&i| &self.edges[i]).collect())
            .unwrap_or_default()
    }

    /// Edges connecting two statements, in either orientation.
    pub fn edges_between(&self, a: StmtId, b: StmtId) -> Vec<&DependenceEdge> {
        self.edges
            .iter()
            .filter(|e| {
                (e.source == a && e.target == b) || (e.source == b && e.target == a)
            })
            .collect()
    }

    /// Whether any dependence connects the two statements.
    pub fn has_dependence(&self, a: StmtId, b: StmtId) -> bool {
        !self.edges_between(a, b).is_empty()
    }

    /// Dependence distance along `loop_id` between two statements.
    ///
    /// `None` means no dependence connects the statements. A connecting
    /// edge without a computed vector answers `Unknown`.
    ///
    /// # Panics
    ///
    /// Panics if `loop_id` is not part of the analyzed nest.
    pub fn distance_between(&self, a: StmtId, b: StmtId, loop_id: LoopId) -> Option<DistanceEntry> {
        let depth = self
            .nest
            .depth_of(loop_id)
            .unwrap_or_else(|| panic!("loop {} is not in the analyzed nest", loop_id));
        let edges = self.edges_between(a, b);
        if edges.is_empty() {
            return None;
        }
        let mut merged: Option<DistanceEntry> = None;
        for edge in edges {
            let entry = match &edge.relation.distances {
                Some(distances) => {
                    let mut entry = distances[depth];
                    // A self-edge has no reversed orientation.
                    if a != b && edge.source == b && edge.target == a {
                        if let DistanceEntry::Exact(d) = entry {
                            entry = DistanceEntry::Exact(-d);
                        }
                    }
                    entry
                }
                None => DistanceEntry::Unknown,
            };
            merged = Some(match merged {
                None => entry,
                Some(m) if m == entry => m,
                Some(_) => DistanceEntry::Unknown,
            });
        }
        merged
    }

    /// Dependence direction along `loop_id` between two statements, with
    /// the same conventions as [`DependenceGraph::distance_between`].
    pub fn direction_between(&self, a: StmtId, b: StmtId, loop_id: LoopId) -> Option<Direction> {
        let depth = self
            .nest
            .depth_of(loop_id)
            .unwrap_or_else(|| panic!("loop {} is not in the analyzed nest", loop_id));
        let edges = self.edges_between(a, b);
        if edges.is_empty() {
            return None;
        }
        let mut merged: Option<Direction> = None;
        for edge in edges {
            let dir = match &edge.relation.directions {
                Some(directions) => {
                    let d = directions[depth];
                    if a != b && edge.source == b && edge.target == a {
                        d.reverse()
                    } else {
                        d
                    }
                }
                None => Direction::Star,
            };
            merged = Some(match merged {
                None => dir,
                Some(m) => m.union(dir),
            });
        }
        merged
    }

    /// Ordering edges carried by a given loop.
    pub fn carried_by(&self, loop_id: LoopId) -> Vec<&DependenceEdge> {
        self.edges
            .iter()
            .filter(|e| e.kind.is_ordering() && e.relation.is_carried_by(&self.nest, loop_id))
            .collect()
    }

    /// Whether the loop at `loop_id` carries no ordering dependence and
    /// its iterations can therefore run in any order.
    pub fn is_parallelizable(&self, loop_id: LoopId) -> bool {
        self.edges.iter().all(|e| {
            if !e.kind.is_ordering() {
                return true;
            }
            match (&e.relation.distances, self.nest.depth_of(loop_id)) {
                (Some(distances), Some(depth)) => {
                    // Safe if the dependence is not carried here, either
                    // satisfied at this level or carried further out.
                    matches!(distances[depth], DistanceEntry::Exact(0))
                        || distances[..depth]
                            .iter()
                            .any(|d| matches!(d, DistanceEntry::Exact(d) if *d != 0))
                }
                _ => false,
            }
        })
    }
}

impl fmt::Display for DependenceGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "dependence graph: {} statements, {} edges",
            self.statements.len(),
            self.edges.len()
        )?;
        for edge in &self.edges {
            writeln!(f, "  {:?} {}", edge.kind, edge.relation)?;
        }
        Ok(())
    }
}
