//! Chains of recurrences: the symbolic representation of how a scalar value
//! evolves across loop iterations.
//!
//! A chrec is a small closed algebra:
//! - `IntCst` / `Symbol` / `Interval` — loop-invariant values
//! - `Polynomial {left, +, right}_l` — `left` at entry to loop `l`,
//!   incremented by `right` each iteration
//! - `Exponential {left, *, right}_l` — `left * right^i`
//! - `Peeled (left, right)_l` — `left` on the first iteration, `right`
//!   (a function of `i-1`) afterwards
//! - three sentinels: `Top` ("don't know"), `Bottom` (proved independent /
//!   unreachable), `NotAnalyzedYet` (fixpoint placeholder)
//!
//! Values are immutable and structurally shared through `Rc`; construction
//! always builds new nodes. Equality is structural; the sentinels are unit
//! variants, so matching on them replaces the pointer-identity checks a
//! tagged-pointer representation would use.

pub mod eval;
pub mod fold;

pub use eval::evaluate;
pub use fold::{fold_add, fold_multiply, fold_negate, fold_sub, merge};

use crate::model::LoopId;
use crate::utils::intern::Symbol;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

/// A chain of recurrences.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Chrec {
    /// Loop-invariant integer constant
    IntCst(i64),
    /// Loop-invariant named scalar (array-size parameter, etc.)
    Symbol(Symbol),
    /// `{left, +, right}_loop`
    Polynomial {
        /// Loop the evolution belongs to
        loop_id: LoopId,
        /// Value at loop entry
        left: Rc<Chrec>,
        /// Increment per iteration
        right: Rc<Chrec>,
    },
    /// `{left, *, right}_loop`
    Exponential {
        /// Loop the evolution belongs to
        loop_id: LoopId,
        /// Value at loop entry
        left: Rc<Chrec>,
        /// Multiplier per iteration
        right: Rc<Chrec>,
    },
    /// `(left, right)_loop`: `left` on the first iteration, `right`
    /// (a function of the previous iteration) thereafter
    Peeled {
        /// Loop the peel belongs to
        loop_id: LoopId,
        /// First-iteration value
        left: Rc<Chrec>,
        /// Value on later iterations
        right: Rc<Chrec>,
    },
    /// Conservative range, used when exact evolution is lost
    Interval {
        /// Inclusive lower bound
        low: i64,
        /// Inclusive upper bound
        up: i64,
    },
    /// Unknown ("don't know"); absorbs every operation
    Top,
    /// Definitely independent / unreachable
    Bottom,
    /// Placeholder during fixpoint construction
    NotAnalyzedYet,
}

impl Chrec {
    /// An integer constant chrec.
    pub fn int(value: i64) -> Chrec {
        Chrec::IntCst(value)
    }

    /// A loop-invariant symbolic chrec.
    pub fn symbol(sym: Symbol) -> Chrec {
        Chrec::Symbol(sym)
    }

    /// Build `{left, +, right}_loop`, collapsing a zero step to `left` and
    /// propagating sentinels per the absorption table.
    pub fn polynomial(loop_id: LoopId, left: Chrec, right: Chrec) -> Chrec {
        if let Some(s) = sentinel_of(&left, &right) {
            return s;
        }
        if right == Chrec::IntCst(0) {
            return left;
        }
        Chrec::Polynomial {
            loop_id,
            left: Rc::new(left),
            right: Rc::new(right),
        }
    }

    /// Build `{left, *, right}_loop`, collapsing a unit multiplier to
    /// `left`.
    pub fn exponential(loop_id: LoopId, left: Chrec, right: Chrec) -> Chrec {
        if let Some(s) = sentinel_of(&left, &right) {
            return s;
        }
        if right == Chrec::IntCst(1) {
            return left;
        }
        Chrec::Exponential {
            loop_id,
            left: Rc::new(left),
            right: Rc::new(right),
        }
    }

    /// Build a peeled chrec, collapsing the trivial peel.
    pub fn peeled(loop_id: LoopId, left: Chrec, right: Chrec) -> Chrec {
        if let Some(s) = sentinel_of(&left, &right) {
            return s;
        }
        if left == right {
            return left;
        }
        Chrec::Peeled {
            loop_id,
            left: Rc::new(left),
            right: Rc::new(right),
        }
    }

    /// Build an interval, collapsing a degenerate one to a constant.
    pub fn interval(low: i64, up: i64) -> Chrec {
        debug_assert!(low <= up);
        if low == up {
            Chrec::IntCst(low)
        } else {
            Chrec::Interval { low, up }
        }
    }

    /// A univariate affine chrec `{left, +, right}_loop` from integers.
    pub fn affine(loop_id: LoopId, left: i64, right: i64) -> Chrec {
        Chrec::polynomial(loop_id, Chrec::int(left), Chrec::int(right))
    }

    /// Whether this is one of the three abstract sentinels.
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Chrec::Top | Chrec::Bottom | Chrec::NotAnalyzedYet)
    }

    /// The integer value, when this is an integer constant.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Chrec::IntCst(v) => Some(*v),
            _ => None,
        }
    }

    /// Loop-invariant: no evolution in any loop (constants, symbols,
    /// intervals).
    pub fn is_constant(&self) -> bool {
        matches!(
            self,
            Chrec::IntCst(_) | Chrec::Symbol(_) | Chrec::Interval { .. }
        )
    }

    /// Affine: `{left, +, right}` with loop-invariant left and right.
    pub fn is_affine(&self) -> bool {
        match self {
            Chrec::Polynomial { left, right, .. } => left.is_constant() && right.is_constant(),
            _ => false,
        }
    }

    /// Affine with integer constant components, yielding
    /// `(loop, left, right)`.
    pub fn as_int_affine(&self) -> Option<(LoopId, i64, i64)> {
        match self {
            Chrec::Polynomial {
                loop_id,
                left,
                right,
            } => Some((*loop_id, left.as_int()?, right.as_int()?)),
            _ => None,
        }
    }

    /// Every nested evolution shares a single loop id.
    pub fn is_univariate(&self) -> bool {
        let mut loops = BTreeSet::new();
        self.collect_loops(&mut loops);
        loops.len() <= 1
    }

    /// Evolution in more than one loop.
    pub fn is_multivariate(&self) -> bool {
        !self.is_univariate()
    }

    /// Whether a symbolic leaf is reachable.
    pub fn contains_symbols(&self) -> bool {
        match self {
            Chrec::Symbol(_) => true,
            Chrec::Polynomial { left, right, .. }
            | Chrec::Exponential { left, right, .. }
            | Chrec::Peeled { left, right, .. } => {
                left.contains_symbols() || right.contains_symbols()
            }
            _ => false,
        }
    }

    /// Whether any sentinel is reachable.
    pub fn contains_undetermined(&self) -> bool {
        match self {
            Chrec::Top | Chrec::Bottom | Chrec::NotAnalyzedYet => true,
            Chrec::Polynomial { left, right, .. }
            | Chrec::Exponential { left, right, .. }
            | Chrec::Peeled { left, right, .. } => {
                left.contains_undetermined() || right.contains_undetermined()
            }
            _ => false,
        }
    }

    /// Whether an `Interval` leaf is reachable. An interval stands for a
    /// set of possible values, so two structurally equal intervals need
    /// not denote the same value.
    pub fn contains_interval(&self) -> bool {
        match self {
            Chrec::Interval { .. } => true,
            Chrec::Polynomial { left, right, .. }
            | Chrec::Exponential { left, right, .. }
            | Chrec::Peeled { left, right, .. } => {
                left.contains_interval() || right.contains_interval()
            }
            _ => false,
        }
    }

    /// Whether the value evolves in the given loop.
    pub fn evolves_in(&self, loop_id: LoopId) -> bool {
        match self {
            Chrec::Polynomial {
                loop_id: l,
                left,
                right,
            }
            | Chrec::Exponential {
                loop_id: l,
                left,
                right,
            }
            | Chrec::Peeled {
                loop_id: l,
                left,
                right,
            } => *l == loop_id || left.evolves_in(loop_id) || right.evolves_in(loop_id),
            _ => false,
        }
    }

    /// Collect every loop id with an evolution in this chrec.
    pub fn collect_loops(&self, out: &mut BTreeSet<LoopId>) {
        if let Chrec::Polynomial {
            loop_id,
            left,
            right,
        }
        | Chrec::Exponential {
            loop_id,
            left,
            right,
        }
        | Chrec::Peeled {
            loop_id,
            left,
            right,
        } = self
        {
            out.insert(*loop_id);
            left.collect_loops(out);
            right.collect_loops(out);
        }
    }

    /// The single loop this chrec evolves in, when univariate and not
    /// invariant.
    pub fn univariate_loop(&self) -> Option<LoopId> {
        let mut loops = BTreeSet::new();
        self.collect_loops(&mut loops);
        if loops.len() == 1 {
            loops.into_iter().next()
        } else {
            None
        }
    }

    /// Strip all `Polynomial`/`Exponential` wrappers down to the base
    /// value.
    pub fn initial_condition(&self) -> Chrec {
        match self {
            Chrec::Polynomial { left, .. } | Chrec::Exponential { left, .. } => {
                left.initial_condition()
            }
            other => other.clone(),
        }
    }
}

/// Sentinel absorption: `Top` takes precedence, then `Bottom`, then
/// `NotAnalyzedYet`.
pub(crate) fn sentinel_of(a: &Chrec, b: &Chrec) -> Option<Chrec> {
    if matches!(a, Chrec::Top) || matches!(b, Chrec::Top) {
        Some(Chrec::Top)
    } else if matches!(a, Chrec::Bottom) || matches!(b, Chrec::Bottom) {
        Some(Chrec::Bottom)
    } else if matches!(a, Chrec::NotAnalyzedYet) || matches!(b, Chrec::NotAnalyzedYet) {
        Some(Chrec::NotAnalyzedYet)
    } else {
        None
    }
}

impl fmt::Display for Chrec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chrec::IntCst(v) => write!(f, "{}", v),
            Chrec::Symbol(s) => write!(f, "{}", s),
            Chrec::Polynomial {
                loop_id,
                left,
                right,
            } => write!(f, "{{{}, +, {}}}_{}", left, right, loop_id),
            Chrec::Exponential {
                loop_id,
                left,
                right,
            } => write!(f, "{{{}, *, {}}}_{}", left, right, loop_id),
            Chrec::Peeled {
                loop_id,
                left,
                right,
            } => write!(f, "({}, {})_{}", left, right, loop_id),
            Chrec::Interval { low, up } => write!(f, "[{}, {}]", low, up),
            Chrec::Top => write!(f, "T"),
            Chrec::Bottom => write!(f, "_|_"),
            Chrec::NotAnalyzedYet => write!(f, "?"),
        }
    }
}
