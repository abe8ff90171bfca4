//! Per-subscript dependence testing.
//!
//! For one array dimension of a reference pair, the tester classifies the
//! two access functions as ZIV, SIV or MIV (by how many distinct loops they
//! depend on) and solves for the iterations at which the two accesses touch
//! the same element. Results come back as chrecs: `Bottom` proves the
//! subscript independent, `Top` gives up, and anything else describes the
//! conflicting iteration of each side (parameterized by the reserved
//! solution loop when there are infinitely many).

use crate::algebra::number::{bezout, ceil_div, divides, gcd};
use crate::chrec::{fold_sub, Chrec};
use crate::dependence::relation::Direction;
use crate::model::LoopId;
use log::{debug, trace};
use std::collections::BTreeSet;

/// Classification of a subscript pair by the number of distinct loops its
/// access functions depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptClass {
    /// Zero index variables: both sides loop-invariant
    Ziv,
    /// Single index variable: one loop involved overall
    Siv,
    /// Multiple index variables
    Miv,
}

/// Classify a subscript pair. The classes are mutually exclusive and
/// checked in this priority order.
pub fn classify(chrec_a: &Chrec, chrec_b: &Chrec) -> SubscriptClass {
    let mut loops = BTreeSet::new();
    chrec_a.collect_loops(&mut loops);
    chrec_b.collect_loops(&mut loops);
    match loops.len() {
        0 => SubscriptClass::Ziv,
        1 => SubscriptClass::Siv,
        _ => SubscriptClass::Miv,
    }
}

/// Dependence-test working state for one array dimension of a reference
/// pair.
#[derive(Debug, Clone)]
pub struct Subscript {
    /// Iterations of reference A at which a conflict occurs
    pub conflicts_in_a: Chrec,
    /// Iterations of reference B at which a conflict occurs
    pub conflicts_in_b: Chrec,
    /// Last conflicting iteration of A (count of conflicts when finite)
    pub last_conflict_in_a: Chrec,
    /// Last conflicting iteration of B
    pub last_conflict_in_b: Chrec,
    /// `conflicts_in_b - conflicts_in_a`, ideally a constant
    pub distance: Chrec,
    /// Sign class of the distance
    pub direction: Direction,
    /// Real loops either access function evolves in
    pub loops: BTreeSet<LoopId>,
}

impl Subscript {
    fn from_overlaps(
        chrec_a: &Chrec,
        chrec_b: &Chrec,
        conflicts_in_a: Chrec,
        conflicts_in_b: Chrec,
        last_conflict: Chrec,
    ) -> Subscript {
        let mut loops = BTreeSet::new();
        chrec_a.collect_loops(&mut loops);
        chrec_b.collect_loops(&mut loops);

        let distance = fold_sub(&conflicts_in_b, &conflicts_in_a);
        let direction = match &distance {
            Chrec::IntCst(d) => Direction::from_distance(*d),
            _ => Direction::Star,
        };
        Subscript {
            conflicts_in_a,
            conflicts_in_b,
            last_conflict_in_a: last_conflict.clone(),
            last_conflict_in_b: last_conflict,
            distance,
            direction,
            loops,
        }
    }

    /// The subscript proves the whole pair independent.
    pub fn is_independent(&self) -> bool {
        matches!(self.conflicts_in_a, Chrec::Bottom) || matches!(self.conflicts_in_b, Chrec::Bottom)
    }

    /// The subscript gave up.
    pub fn is_unknown(&self) -> bool {
        matches!(self.conflicts_in_a, Chrec::Top) || matches!(self.conflicts_in_b, Chrec::Top)
    }
}

/// Test one subscript pair, classifying and dispatching to the matching
/// solver.
pub fn analyze_subscript(chrec_a: &Chrec, chrec_b: &Chrec) -> Subscript {
    // Anything undetermined in either access function poisons the test.
    if chrec_a.contains_undetermined() || chrec_b.contains_undetermined() {
        return unknown(chrec_a, chrec_b);
    }
    let class = classify(chrec_a, chrec_b);
    trace!("subscript {} vs {} classified {:?}", chrec_a, chrec_b, class);
    match class {
        SubscriptClass::Ziv => analyze_ziv(chrec_a, chrec_b),
        SubscriptClass::Siv => analyze_siv(chrec_a, chrec_b),
        SubscriptClass::Miv => analyze_miv(chrec_a, chrec_b),
    }
}

fn unknown(chrec_a: &Chrec, chrec_b: &Chrec) -> Subscript {
    Subscript::from_overlaps(chrec_a, chrec_b, Chrec::Top, Chrec::Top, Chrec::Top)
}

fn independent(chrec_a: &Chrec, chrec_b: &Chrec) -> Subscript {
    Subscript::from_overlaps(chrec_a, chrec_b, Chrec::Bottom, Chrec::Bottom, Chrec::Bottom)
}

/// Both access functions are loop-invariant: they either always collide or
/// never do.
fn analyze_ziv(chrec_a: &Chrec, chrec_b: &Chrec) -> Subscript {
    let diff = fold_sub(chrec_b, chrec_a);
    match diff {
        Chrec::IntCst(0) => Subscript::from_overlaps(
            chrec_a,
            chrec_b,
            Chrec::int(0),
            Chrec::int(0),
            Chrec::Top,
        ),
        Chrec::IntCst(_) => independent(chrec_a, chrec_b),
        Chrec::Interval { low, up } if low > 0 || up < 0 => independent(chrec_a, chrec_b),
        _ => unknown(chrec_a, chrec_b),
    }
}

/// Single loop involved: constant-vs-affine or affine-vs-affine in the
/// same loop.
fn analyze_siv(chrec_a: &Chrec, chrec_b: &Chrec) -> Subscript {
    if chrec_a.is_constant() && chrec_b.is_affine() {
        analyze_siv_cst_affine(chrec_a, chrec_b, false)
    } else if chrec_b.is_constant() && chrec_a.is_affine() {
        analyze_siv_cst_affine(chrec_b, chrec_a, true)
    } else if chrec_a.is_affine() && chrec_b.is_affine() {
        // Same loop by classification.
        analyze_affine_affine(chrec_a, chrec_b)
    } else {
        unknown(chrec_a, chrec_b)
    }
}

/// Constant `c` against affine `{l, +, r}`: the unique candidate conflict
/// iteration is `(c - l) / r`; it must be a non-negative integer.
///
/// When `swapped` is set, the constant side is reference B.
fn analyze_siv_cst_affine(cst: &Chrec, affine: &Chrec, swapped: bool) -> Subscript {
    let (chrec_a, chrec_b) = if swapped {
        (affine, cst)
    } else {
        (cst, affine)
    };
    let (Chrec::Polynomial { left, right, .. }, Some(c)) = (affine, cst.as_int()) else {
        // Symbolic constant against a symbolic-based affine: exact when the
        // initial conditions cancel, unknown otherwise.
        if let Chrec::Polynomial { left, .. } = affine {
            if fold_sub(left, cst) == Chrec::int(0) {
                let (ca, cb) = (Chrec::int(0), Chrec::int(0));
                return Subscript::from_overlaps(chrec_a, chrec_b, ca, cb, Chrec::int(1));
            }
        }
        return unknown(chrec_a, chrec_b);
    };
    let (Some(l), Some(r)) = (left.as_int(), right.as_int()) else {
        return unknown(chrec_a, chrec_b);
    };
    debug_assert!(r != 0);

    let diff = c - l;
    if !divides(r, diff) {
        // The two sequences never align on an integer iteration.
        debug!("siv cst-affine: {} does not divide {}, independent", r, diff);
        return independent(chrec_a, chrec_b);
    }
    let x = diff / r;
    if x < 0 {
        // The affine sequence moves away from the constant.
        return independent(chrec_a, chrec_b);
    }

    let (conflict_cst, conflict_affine) = (Chrec::int(0), Chrec::int(x));
    let (ca, cb) = if swapped {
        (conflict_affine, conflict_cst)
    } else {
        (conflict_cst, conflict_affine)
    };
    Subscript::from_overlaps(chrec_a, chrec_b, ca, cb, Chrec::int(1))
}

/// Two affine functions `{la, +, sa}` and `{lb, +, sb}` (same or different
/// loops): conflicts are the integer solutions of the linear Diophantine
/// equation `sa*x - sb*y = lb - la`.
fn analyze_affine_affine(chrec_a: &Chrec, chrec_b: &Chrec) -> Subscript {
    let (Some((_, la, sa)), Some((_, lb, sb))) =
        (chrec_a.as_int_affine(), chrec_b.as_int_affine())
    else {
        return unknown(chrec_a, chrec_b);
    };

    let (mut sa, mut sb, mut gamma) = (sa, sb, lb - la);
    if sa < 0 && sb < 0 {
        sa = -sa;
        sb = -sb;
        gamma = -gamma;
    }
    if sa <= 0 || sb <= 0 {
        // No bound on the iteration domain in the diverging direction.
        return unknown(chrec_a, chrec_b);
    }

    let bz = bezout(sa, sb);
    if !divides(bz.gcd, gamma) {
        // Classic gcd test: sa*x - sb*y = gamma has no integer solution.
        debug!(
            "gcd test: gcd({}, {}) = {} does not divide {}, independent",
            sa, sb, bz.gcd, gamma
        );
        return independent(chrec_a, chrec_b);
    }

    // Particular solution from the Bezout identity, then the earliest
    // member of the family with both iterations non-negative.
    let scale = gamma / bz.gcd;
    let x0 = bz.u11 * scale;
    let y0 = -bz.u12 * scale;
    let x_step = sb / bz.gcd;
    let y_step = sa / bz.gcd;
    let t0 = ceil_div(-x0, x_step).max(ceil_div(-y0, y_step));
    let x_start = x0 + x_step * t0;
    let y_start = y0 + y_step * t0;
    debug_assert!(x_start >= 0 && y_start >= 0);
    debug_assert_eq!(sa * x_start - sb * y_start, gamma);

    let conflicts_a = Chrec::affine(LoopId::SOLUTION_PARAM, x_start, x_step);
    let conflicts_b = Chrec::affine(LoopId::SOLUTION_PARAM, y_start, y_step);
    Subscript::from_overlaps(chrec_a, chrec_b, conflicts_a, conflicts_b, Chrec::Top)
}

/// Multiple loops involved: the conservative fallback.
fn analyze_miv(chrec_a: &Chrec, chrec_b: &Chrec) -> Subscript {
    let diff = fold_sub(chrec_a, chrec_b);

    if diff == Chrec::int(0) {
        // Equal access functions conflict at every iteration.
        return Subscript::from_overlaps(
            chrec_a,
            chrec_b,
            Chrec::int(0),
            Chrec::int(0),
            Chrec::Top,
        );
    }

    if let Some(c) = diff.as_int() {
        // A constant offset can only be bridged if the gcd of the
        // evolution steps divides it.
        if let Some(g) = gcd_of_steps(chrec_a) {
            if !divides(g, c) {
                return independent(chrec_a, chrec_b);
            }
        }
    }

    if chrec_a.is_affine() && chrec_b.is_affine() {
        // Univariate affine in two different loops still reduces to the
        // Diophantine solver.
        return analyze_affine_affine(chrec_a, chrec_b);
    }

    unknown(chrec_a, chrec_b)
}

/// Gcd of every integer evolution step in the chrec, `None` when any step
/// is not an integer constant.
fn gcd_of_steps(chrec: &Chrec) -> Option<i64> {
    fn walk(chrec: &Chrec, acc: &mut i64) -> bool {
        match chrec {
            Chrec::Polynomial { left, right, .. } => {
                match right.as_int() {
                    Some(s) => *acc = gcd(*acc, s),
                    None => {
                        if !walk(right, acc) {
                            return false;
                        }
                    }
                }
                walk(left, acc)
            }
            Chrec::Exponential { .. } | Chrec::Peeled { .. } => false,
            _ => true,
        }
    }
    let mut acc = 0;
    if walk(chrec, &mut acc) && acc != 0 {
        Some(acc)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::intern::intern;

    fn l(n: u32) -> LoopId {
        LoopId(n)
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify(&Chrec::int(1), &Chrec::int(2)),
            SubscriptClass::Ziv
        );
        assert_eq!(
            classify(&Chrec::int(1), &Chrec::affine(l(1), 0, 1)),
            SubscriptClass::Siv
        );
        assert_eq!(
            classify(&Chrec::affine(l(1), 0, 1), &Chrec::affine(l(1), 1, 1)),
            SubscriptClass::Siv
        );
        assert_eq!(
            classify(&Chrec::affine(l(1), 0, 1), &Chrec::affine(l(2), 0, 1)),
            SubscriptClass::Miv
        );
    }

    #[test]
    fn test_ziv() {
        // Equal constants: conflict at every iteration.
        let sub = analyze_subscript(&Chrec::int(3), &Chrec::int(3));
        assert_eq!(sub.conflicts_in_a, Chrec::int(0));
        assert_eq!(sub.conflicts_in_b, Chrec::int(0));

        // Distinct constants: independent.
        let sub = analyze_subscript(&Chrec::int(3), &Chrec::int(4));
        assert!(sub.is_independent());

        // Equal symbols cancel; distinct symbols give up.
        let n = Chrec::symbol(intern("ziv_n"));
        let m = Chrec::symbol(intern("ziv_m"));
        assert_eq!(analyze_subscript(&n, &n).conflicts_in_a, Chrec::int(0));
        assert!(analyze_subscript(&n, &m).is_unknown());
    }

    #[test]
    fn test_ziv_intervals() {
        // [1,3] vs [1,3]: the values may or may not coincide.
        let iv = Chrec::interval(1, 3);
        let sub = analyze_subscript(&iv, &iv.clone());
        assert!(sub.is_unknown());

        // Disjoint ranges never collide.
        let sub = analyze_subscript(&Chrec::interval(1, 3), &Chrec::interval(5, 9));
        assert!(sub.is_independent());
    }

    #[test]
    fn test_siv_cst_affine_divisible() {
        // c = 12 vs {10, +, 2}: conflict at iteration (12-10)/2 = 1.
        let sub = analyze_subscript(&Chrec::int(12), &Chrec::affine(l(1), 10, 2));
        assert!(!sub.is_independent());
        assert_eq!(sub.conflicts_in_a, Chrec::int(0));
        assert_eq!(sub.conflicts_in_b, Chrec::int(1));
        assert_eq!(sub.last_conflict_in_b, Chrec::int(1));
    }

    #[test]
    fn test_siv_cst_affine_not_divisible() {
        // c = 12 vs {10, +, 3}: 3 does not divide 2.
        let sub = analyze_subscript(&Chrec::int(12), &Chrec::affine(l(1), 10, 3));
        assert!(sub.is_independent());
    }

    #[test]
    fn test_siv_cst_affine_diverging() {
        // c = 5 vs {10, +, 2}: the sequence only moves away from 5.
        let sub = analyze_subscript(&Chrec::int(5), &Chrec::affine(l(1), 10, 2));
        assert!(sub.is_independent());
    }

    #[test]
    fn test_siv_cst_affine_swapped() {
        // Affine side as reference A.
        let sub = analyze_subscript(&Chrec::affine(l(1), 10, 2), &Chrec::int(12));
        assert_eq!(sub.conflicts_in_a, Chrec::int(1));
        assert_eq!(sub.conflicts_in_b, Chrec::int(0));
    }

    #[test]
    fn test_gcd_test_independent() {
        // {0, +, 2} vs {1, +, 2}: even vs odd, gcd(2,2)=2 does not
        // divide 1.
        let sub = analyze_subscript(&Chrec::affine(l(1), 0, 2), &Chrec::affine(l(1), 1, 2));
        assert!(sub.is_independent());
    }

    #[test]
    fn test_affine_affine_unit_distance() {
        // Write A[i], read A[i-1]: {0,+,1} vs {-1,+,1}, distance 1.
        let sub = analyze_subscript(&Chrec::affine(l(1), 0, 1), &Chrec::affine(l(1), -1, 1));
        assert!(!sub.is_independent() && !sub.is_unknown());
        assert_eq!(sub.distance, Chrec::int(1));
        assert_eq!(sub.direction, Direction::Lt);
        // Conflicts start at the earliest valid pair: x=0 conflicts y=1.
        assert_eq!(sub.conflicts_in_a, Chrec::affine(LoopId::SOLUTION_PARAM, 0, 1));
        assert_eq!(sub.conflicts_in_b, Chrec::affine(LoopId::SOLUTION_PARAM, 1, 1));
    }

    #[test]
    fn test_affine_affine_different_steps() {
        // {0, +, 2} vs {0, +, 4}: conflicts where 2x = 4y.
        let sub = analyze_subscript(&Chrec::affine(l(1), 0, 2), &Chrec::affine(l(1), 0, 4));
        assert!(!sub.is_independent() && !sub.is_unknown());
        assert_eq!(sub.conflicts_in_a, Chrec::affine(LoopId::SOLUTION_PARAM, 0, 2));
        assert_eq!(sub.conflicts_in_b, Chrec::affine(LoopId::SOLUTION_PARAM, 0, 1));
    }

    #[test]
    fn test_affine_affine_opposite_signs_unknown() {
        let sub = analyze_subscript(&Chrec::affine(l(1), 0, 1), &Chrec::affine(l(1), 10, -1));
        assert!(sub.is_unknown());
    }

    #[test]
    fn test_miv_equal_functions() {
        // A[i + j] against itself.
        let f = Chrec::polynomial(l(2), Chrec::affine(l(1), 0, 1), Chrec::int(1));
        let sub = analyze_subscript(&f, &f.clone());
        assert_eq!(sub.conflicts_in_a, Chrec::int(0));
    }

    #[test]
    fn test_miv_gcd_of_steps() {
        // {0,+,2}_1 + 4j steps {2,4}; offset 1 is unreachable.
        let a = Chrec::polynomial(l(2), Chrec::affine(l(1), 0, 2), Chrec::int(4));
        let b = Chrec::polynomial(l(2), Chrec::affine(l(1), 1, 2), Chrec::int(4));
        let sub = analyze_subscript(&a, &b);
        assert!(sub.is_independent());
    }

    #[test]
    fn test_miv_cross_loop_affine() {
        // A[i] vs A[j] in different loops: solvable family.
        let sub = analyze_subscript(&Chrec::affine(l(1), 0, 1), &Chrec::affine(l(2), 0, 1));
        assert!(!sub.is_independent() && !sub.is_unknown());
    }

    #[test]
    fn test_undetermined_inputs() {
        let sub = analyze_subscript(&Chrec::Top, &Chrec::int(0));
        assert!(sub.is_unknown());
    }
}
