//! Host-compiler contracts: loop identifiers, loop nests, statement
//! identities and data references.
//!
//! These types are the boundary between the analysis engine and the host
//! IR. The host's data-reference enumerator produces one [`DataReference`]
//! per array access, with one access function (a chrec) per array
//! dimension, already expressed relative to the shared loop nest.

use crate::chrec::Chrec;
use crate::utils::intern::Symbol;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a loop in the analyzed nest.
///
/// Loop ids form a total order matching nesting depth: outer loops carry
/// numerically smaller ids. Id 0 is reserved for the parameter of
/// Diophantine solution families in overlap functions; real loops are
/// numbered from 1. Consistency of this order across one analysis is a
/// caller contract, not validated here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LoopId(pub u32);

impl LoopId {
    /// The reserved id for the conflict-solution parameter.
    pub const SOLUTION_PARAM: LoopId = LoopId(0);

    /// Whether this is a real loop rather than the reserved parameter.
    pub fn is_real_loop(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for LoopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// The loop nest shared by the references under analysis, listed from the
/// outermost loop inward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopNest {
    loops: Vec<LoopId>,
}

impl LoopNest {
    /// Build a nest from outer-to-inner loop ids.
    pub fn new(loops: Vec<LoopId>) -> Self {
        debug_assert!(loops.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(loops.iter().all(|l| l.is_real_loop()));
        Self { loops }
    }

    /// Number of loops in the nest.
    pub fn depth(&self) -> usize {
        self.loops.len()
    }

    /// The loops, outermost first.
    pub fn loops(&self) -> &[LoopId] {
        &self.loops
    }

    /// Whether the nest contains a given loop.
    pub fn contains(&self, loop_id: LoopId) -> bool {
        self.loops.contains(&loop_id)
    }

    /// Nesting depth of a loop within this nest (0 = outermost).
    pub fn depth_of(&self, loop_id: LoopId) -> Option<usize> {
        self.loops.iter().position(|&l| l == loop_id)
    }
}

/// Statement identity within the host IR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StmtId(u64);

impl StmtId {
    /// Create a statement id from the host's numbering.
    pub fn new(id: u64) -> Self {
        StmtId(id)
    }

    /// The raw id.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for StmtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

/// One memory access found by the host's data-reference enumerator.
///
/// Created once per access; read-only to the analysis core.
#[derive(Debug, Clone, PartialEq)]
pub struct DataReference {
    /// Statement containing the access
    pub stmt: StmtId,
    /// Whether the access is a read (false = write)
    pub is_read: bool,
    /// Interned array base name
    pub base: Symbol,
    /// Access function per array dimension, as evolutions over the
    /// enclosing loop nest
    pub access_fns: Vec<Chrec>,
}

impl DataReference {
    /// Construct a read reference.
    pub fn read(stmt: StmtId, base: Symbol, access_fns: Vec<Chrec>) -> Self {
        Self {
            stmt,
            is_read: true,
            base,
            access_fns,
        }
    }

    /// Construct a write reference.
    pub fn write(stmt: StmtId, base: Symbol, access_fns: Vec<Chrec>) -> Self {
        Self {
            stmt,
            is_read: false,
            base,
            access_fns,
        }
    }

    /// Number of array dimensions.
    pub fn num_dimensions(&self) -> usize {
        self.access_fns.len()
    }

    /// Whether the access writes memory.
    pub fn is_write(&self) -> bool {
        !self.is_read
    }
}

impl fmt::Display for DataReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.stmt,
            if self.is_read { "read" } else { "write" },
            self.base
        )?;
        for access in &self.access_fns {
            write!(f, "[{}]", access)?;
        }
        Ok(())
    }
}
