//! Total folding operations over chrecs.
//!
//! Every function here is total: inapplicable operand combinations degrade
//! to `Top` rather than failing, and the sentinel absorption table (`Top`
//! over `Bottom` over `NotAnalyzedYet`) is applied before anything else.
//! `merge` is the single exception where `NotAnalyzedYet` acts as an
//! identity instead of absorbing.

use super::{sentinel_of, Chrec};

/// Inclusive integer range of an invariant chrec, when it has one.
fn as_range(c: &Chrec) -> Option<(i64, i64)> {
    match c {
        Chrec::IntCst(v) => Some((*v, *v)),
        Chrec::Interval { low, up } => Some((*low, *up)),
        _ => None,
    }
}

fn range_add(a: (i64, i64), b: (i64, i64)) -> Chrec {
    match (a.0.checked_add(b.0), a.1.checked_add(b.1)) {
        (Some(low), Some(up)) => Chrec::interval(low, up),
        _ => Chrec::Top,
    }
}

fn range_mul(a: (i64, i64), b: (i64, i64)) -> Chrec {
    let products = [
        a.0.checked_mul(b.0),
        a.0.checked_mul(b.1),
        a.1.checked_mul(b.0),
        a.1.checked_mul(b.1),
    ];
    let mut low = i64::MAX;
    let mut up = i64::MIN;
    for p in products {
        match p {
            Some(v) => {
                low = low.min(v);
                up = up.max(v);
            }
            None => return Chrec::Top,
        }
    }
    Chrec::interval(low, up)
}

/// `a + b`.
pub fn fold_add(a: &Chrec, b: &Chrec) -> Chrec {
    if let Some(s) = sentinel_of(a, b) {
        return s;
    }
    if a.as_int() == Some(0) {
        return b.clone();
    }
    if b.as_int() == Some(0) {
        return a.clone();
    }

    match (a, b) {
        (
            Chrec::Polynomial {
                loop_id: l1,
                left: left1,
                right: right1,
            },
            Chrec::Polynomial {
                loop_id: l2,
                left: left2,
                right: right2,
            },
        ) => {
            if l1 == l2 {
                Chrec::polynomial(*l1, fold_add(left1, left2), fold_add(right1, right2))
            } else if l1 > l2 {
                // The larger loop id wraps; the other chrec folds into its
                // initial condition. This tie-break must stay consistent
                // with the nesting order used by the projections.
                Chrec::polynomial(*l1, fold_add(left1, b), (**right1).clone())
            } else {
                Chrec::polynomial(*l2, fold_add(a, left2), (**right2).clone())
            }
        }
        (
            Chrec::Polynomial {
                loop_id,
                left,
                right,
            },
            other,
        ) if other.is_constant() => {
            Chrec::polynomial(*loop_id, fold_add(left, other), (**right).clone())
        }
        (
            other,
            Chrec::Polynomial {
                loop_id,
                left,
                right,
            },
        ) if other.is_constant() => {
            Chrec::polynomial(*loop_id, fold_add(other, left), (**right).clone())
        }
        (
            Chrec::Peeled {
                loop_id: l1,
                left: left1,
                right: right1,
            },
            Chrec::Peeled {
                loop_id: l2,
                left: left2,
                right: right2,
            },
        ) if l1 == l2 => Chrec::peeled(*l1, fold_add(left1, left2), fold_add(right1, right2)),
        (
            Chrec::Peeled {
                loop_id,
                left,
                right,
            },
            other,
        )
        | (
            other,
            Chrec::Peeled {
                loop_id,
                left,
                right,
            },
        ) if other.is_constant() => {
            Chrec::peeled(*loop_id, fold_add(left, other), fold_add(right, other))
        }
        _ => match (as_range(a), as_range(b)) {
            (Some(ra), Some(rb)) => range_add(ra, rb),
            // Symbolic sums have no representation in the algebra.
            _ => Chrec::Top,
        },
    }
}

/// `-a`.
pub fn fold_negate(a: &Chrec) -> Chrec {
    match a {
        Chrec::Top => Chrec::Top,
        Chrec::Bottom => Chrec::Bottom,
        Chrec::NotAnalyzedYet => Chrec::NotAnalyzedYet,
        Chrec::IntCst(v) => v.checked_neg().map(Chrec::IntCst).unwrap_or(Chrec::Top),
        Chrec::Interval { low, up } => match (up.checked_neg(), low.checked_neg()) {
            (Some(l), Some(u)) => Chrec::interval(l, u),
            _ => Chrec::Top,
        },
        Chrec::Symbol(_) => Chrec::Top,
        Chrec::Polynomial {
            loop_id,
            left,
            right,
        } => Chrec::polynomial(*loop_id, fold_negate(left), fold_negate(right)),
        Chrec::Exponential {
            loop_id,
            left,
            right,
        } => Chrec::exponential(*loop_id, fold_negate(left), (**right).clone()),
        Chrec::Peeled {
            loop_id,
            left,
            right,
        } => Chrec::peeled(*loop_id, fold_negate(left), fold_negate(right)),
    }
}

/// `a - b`.
pub fn fold_sub(a: &Chrec, b: &Chrec) -> Chrec {
    if let Some(s) = sentinel_of(a, b) {
        return s;
    }
    if b.as_int() == Some(0) {
        return a.clone();
    }
    // Structurally equal determinate values cancel exactly, which keeps
    // symbolic accesses like A[n] vs A[n] analyzable. Intervals do not
    // cancel: [1,3] on each side may denote two different values.
    if a == b && !a.contains_undetermined() && !a.contains_interval() {
        return Chrec::int(0);
    }
    fold_add(a, &fold_negate(b))
}

/// `a * b`.
pub fn fold_multiply(a: &Chrec, b: &Chrec) -> Chrec {
    if let Some(s) = sentinel_of(a, b) {
        return s;
    }
    if a.as_int() == Some(0) || b.as_int() == Some(0) {
        return Chrec::int(0);
    }
    if a.as_int() == Some(1) {
        return b.clone();
    }
    if b.as_int() == Some(1) {
        return a.clone();
    }

    match (a, b) {
        (
            Chrec::Polynomial {
                loop_id: l1,
                left: left1,
                right: right1,
            },
            Chrec::Polynomial {
                loop_id: l2,
                left: left2,
                right: right2,
            },
        ) => {
            if l1 == l2 {
                // {a, +, b} * {c, +, d} = {ac, +, ad+bc+bd, +, 2bd}
                let t0 = fold_multiply(left1, left2);
                let t1 = fold_add(
                    &fold_add(&fold_multiply(left1, right2), &fold_multiply(right1, left2)),
                    &fold_multiply(right1, right2),
                );
                let t2 = fold_multiply(&Chrec::int(2), &fold_multiply(right1, right2));
                Chrec::polynomial(*l1, t0, Chrec::polynomial(*l1, t1, t2))
            } else if l1 > l2 {
                Chrec::polynomial(*l1, fold_multiply(left1, b), fold_multiply(right1, b))
            } else {
                Chrec::polynomial(*l2, fold_multiply(a, left2), fold_multiply(a, right2))
            }
        }
        (
            Chrec::Polynomial {
                loop_id,
                left,
                right,
            },
            other,
        )
        | (
            other,
            Chrec::Polynomial {
                loop_id,
                left,
                right,
            },
        ) if other.is_constant() => Chrec::polynomial(
            *loop_id,
            fold_multiply(left, other),
            fold_multiply(right, other),
        ),
        (
            Chrec::Exponential {
                loop_id: l1,
                left: left1,
                right: right1,
            },
            Chrec::Exponential {
                loop_id: l2,
                left: left2,
                right: right2,
            },
        ) if l1 == l2 => Chrec::exponential(
            *l1,
            fold_multiply(left1, left2),
            fold_multiply(right1, right2),
        ),
        (
            Chrec::Exponential {
                loop_id,
                left,
                right,
            },
            other,
        )
        | (
            other,
            Chrec::Exponential {
                loop_id,
                left,
                right,
            },
        ) if other.is_constant() => {
            Chrec::exponential(*loop_id, fold_multiply(left, other), (**right).clone())
        }
        (
            Chrec::Peeled {
                loop_id: l1,
                left: left1,
                right: right1,
            },
            Chrec::Peeled {
                loop_id: l2,
                left: left2,
                right: right2,
            },
        ) if l1 == l2 => Chrec::peeled(
            *l1,
            fold_multiply(left1, left2),
            fold_multiply(right1, right2),
        ),
        (
            Chrec::Peeled {
                loop_id,
                left,
                right,
            },
            other,
        )
        | (
            other,
            Chrec::Peeled {
                loop_id,
                left,
                right,
            },
        ) if other.is_constant() => Chrec::peeled(
            *loop_id,
            fold_multiply(left, other),
            fold_multiply(right, other),
        ),
        _ => match (as_range(a), as_range(b)) {
            (Some(ra), Some(rb)) => range_mul(ra, rb),
            _ => Chrec::Top,
        },
    }
}

/// Branch-join of two evolutions of the same value.
///
/// `Top` dominates; `Bottom` dominates everything but `Top`;
/// `NotAnalyzedYet` is the identity (the one place it does not absorb);
/// equal operands merge to themselves; same-loop polynomials merge
/// component-wise; anything else widens to an interval when both sides
/// have known ranges, and otherwise to `Top`.
pub fn merge(a: &Chrec, b: &Chrec) -> Chrec {
    if matches!(a, Chrec::Top) || matches!(b, Chrec::Top) {
        return Chrec::Top;
    }
    if matches!(a, Chrec::Bottom) || matches!(b, Chrec::Bottom) {
        return Chrec::Bottom;
    }
    if matches!(a, Chrec::NotAnalyzedYet) {
        return b.clone();
    }
    if matches!(b, Chrec::NotAnalyzedYet) {
        return a.clone();
    }
    if a == b {
        return a.clone();
    }

    match (a, b) {
        (
            Chrec::Polynomial {
                loop_id: l1,
                left: left1,
                right: right1,
            },
            Chrec::Polynomial {
                loop_id: l2,
                left: left2,
                right: right2,
            },
        ) if l1 == l2 => Chrec::polynomial(*l1, merge(left1, left2), merge(right1, right2)),
        _ => match (as_range(a), as_range(b)) {
            (Some(ra), Some(rb)) => Chrec::interval(ra.0.min(rb.0), ra.1.max(rb.1)),
            _ => Chrec::Top,
        },
    }
}
