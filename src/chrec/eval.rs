//! Evaluation and loop projections of chrecs.
//!
//! `evaluate` computes the value of a recurrence after `n` iterations of a
//! loop using the Newton interpolating series
//! `value(n) = Σ binomial(n, k) * coefficient_k`, where the coefficients
//! come from repeatedly peeling the `right` component of the polynomial.
//! The projections split a multivariate chrec into the part contributed by
//! one loop and the part visible outside it.

use super::fold::{fold_add, fold_multiply};
use super::Chrec;
use crate::algebra::number::binomial;
use crate::model::LoopId;

/// Evaluate `chrec` after `n` iterations of `loop_id`.
///
/// `n` must be a non-negative integer constant; a symbolic or negative `n`,
/// an `Exponential`/`Peeled` evolution in the evaluated loop, or a binomial
/// coefficient past the `i64` range yields `Top`.
pub fn evaluate(loop_id: LoopId, chrec: &Chrec, n: &Chrec) -> Chrec {
    let Some(n) = n.as_int() else {
        return Chrec::Top;
    };
    if n < 0 {
        return Chrec::Top;
    }
    evaluate_rec(loop_id, chrec, n, 0)
}

fn evaluate_rec(loop_id: LoopId, chrec: &Chrec, n: i64, k: i64) -> Chrec {
    // binomial(n, k) is zero past the iteration count.
    if k > n {
        return Chrec::int(0);
    }
    match chrec {
        Chrec::Top => Chrec::Top,
        Chrec::Bottom => Chrec::Bottom,
        Chrec::NotAnalyzedYet => Chrec::NotAnalyzedYet,
        Chrec::Polynomial {
            loop_id: l,
            left,
            right,
        } if *l == loop_id => fold_add(
            &evaluate_rec(loop_id, left, n, k),
            &evaluate_rec(loop_id, right, n, k + 1),
        ),
        Chrec::Exponential { loop_id: l, .. } | Chrec::Peeled { loop_id: l, .. }
            if *l == loop_id =>
        {
            Chrec::Top
        }
        other => match binomial(n, k) {
            Some(c) => fold_multiply(other, &Chrec::int(c)),
            None => Chrec::Top,
        },
    }
}

impl Chrec {
    /// Drop the evolution contributed by `loop_id` and every loop nested
    /// inside it, returning the function as it appears outside that loop.
    ///
    /// Inner loops carry numerically larger ids, so everything at
    /// `loop_id` or above is stripped to its initial condition.
    pub fn hide_evolution_in_loop(&self, loop_id: LoopId) -> Chrec {
        match self {
            Chrec::Polynomial {
                loop_id: l,
                left,
                right,
            } => {
                if *l >= loop_id {
                    left.hide_evolution_in_loop(loop_id)
                } else {
                    Chrec::polynomial(
                        *l,
                        left.hide_evolution_in_loop(loop_id),
                        right.hide_evolution_in_loop(loop_id),
                    )
                }
            }
            Chrec::Exponential {
                loop_id: l,
                left,
                right,
            } => {
                if *l >= loop_id {
                    left.hide_evolution_in_loop(loop_id)
                } else {
                    Chrec::exponential(
                        *l,
                        left.hide_evolution_in_loop(loop_id),
                        right.hide_evolution_in_loop(loop_id),
                    )
                }
            }
            Chrec::Peeled {
                loop_id: l,
                left,
                right,
            } => {
                if *l >= loop_id {
                    left.hide_evolution_in_loop(loop_id)
                } else {
                    Chrec::peeled(
                        *l,
                        left.hide_evolution_in_loop(loop_id),
                        right.hide_evolution_in_loop(loop_id),
                    )
                }
            }
            other => other.clone(),
        }
    }

    /// The complementary projection: a univariate function describing only
    /// the evolution due to `loop_id`. Contributions from strictly outer
    /// loops are replaced by their initial condition; strictly inner loops
    /// are skipped by recursing on `left`.
    pub fn hide_evolution_in_other_loops_than(&self, loop_id: LoopId) -> Chrec {
        match self {
            Chrec::Polynomial {
                loop_id: l,
                left,
                right,
            } => {
                if *l == loop_id {
                    Chrec::polynomial(
                        *l,
                        left.hide_evolution_in_other_loops_than(loop_id),
                        right.hide_evolution_in_other_loops_than(loop_id),
                    )
                } else if *l > loop_id {
                    left.hide_evolution_in_other_loops_than(loop_id)
                } else {
                    self.initial_condition()
                }
            }
            Chrec::Exponential {
                loop_id: l,
                left,
                right,
            } => {
                if *l == loop_id {
                    Chrec::exponential(
                        *l,
                        left.hide_evolution_in_other_loops_than(loop_id),
                        right.hide_evolution_in_other_loops_than(loop_id),
                    )
                } else if *l > loop_id {
                    left.hide_evolution_in_other_loops_than(loop_id)
                } else {
                    self.initial_condition()
                }
            }
            Chrec::Peeled {
                loop_id: l, left, ..
            } => {
                if *l >= loop_id {
                    if *l == loop_id {
                        self.clone()
                    } else {
                        left.hide_evolution_in_other_loops_than(loop_id)
                    }
                } else {
                    self.initial_condition()
                }
            }
            other => other.clone(),
        }
    }

    /// The step component attributable to `loop_id`, or `None` if that
    /// loop contributes no evolution. Sentinels propagate as
    /// `Some(sentinel)`.
    pub fn evolution_part_in_loop(&self, loop_id: LoopId) -> Option<Chrec> {
        match self.hide_evolution_in_other_loops_than(loop_id) {
            Chrec::Polynomial {
                loop_id: l, right, ..
            } if l == loop_id => Some((*right).clone()),
            Chrec::Exponential {
                loop_id: l, right, ..
            } if l == loop_id => Some((*right).clone()),
            s @ (Chrec::Top | Chrec::Bottom | Chrec::NotAnalyzedYet) => Some(s),
            _ => None,
        }
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
    fn test_newton_evaluation() {
        // evaluate(1, {5, +, {3, +, 4}_1}_1, 10)
        //   = 5*C(10,0) + 3*C(10,1) + 4*C(10,2)
        let chrec = Chrec::polynomial(
            l(1),
            Chrec::int(5),
            Chrec::polynomial(l(1), Chrec::int(3), Chrec::int(4)),
        );
        let expected = 5 * binomial(10, 0).unwrap()
            + 3 * binomial(10, 1).unwrap()
            + 4 * binomial(10, 2).unwrap();
        assert_eq!(evaluate(l(1), &chrec, &Chrec::int(10)), Chrec::int(expected));
    }

    #[test]
    fn test_evaluate_affine() {
        // {7, +, 3} after 5 iterations = 22
        let chrec = Chrec::affine(l(1), 7, 3);
        assert_eq!(evaluate(l(1), &chrec, &Chrec::int(5)), Chrec::int(22));
        assert_eq!(evaluate(l(1), &chrec, &Chrec::int(0)), Chrec::int(7));
    }

    #[test]
    fn test_evaluate_rejects_bad_counts() {
        let chrec = Chrec::affine(l(1), 7, 3);
        assert_eq!(evaluate(l(1), &chrec, &Chrec::int(-1)), Chrec::Top);
        assert_eq!(
            evaluate(l(1), &chrec, &Chrec::symbol(intern("m"))),
            Chrec::Top
        );
        let exp = Chrec::exponential(l(1), Chrec::int(1), Chrec::int(2));
        assert_eq!(evaluate(l(1), &exp, &Chrec::int(4)), Chrec::Top);
    }

    #[test]
    fn test_evaluate_overflow_gives_top() {
        // Cubic chrec at n = 10^9: C(n, 3) does not fit i64.
        let cubic = Chrec::polynomial(
            l(1),
            Chrec::int(0),
            Chrec::polynomial(
                l(1),
                Chrec::int(0),
                Chrec::polynomial(l(1), Chrec::int(0), Chrec::int(1)),
            ),
        );
        assert_eq!(
            evaluate(l(1), &cubic, &Chrec::int(1_000_000_000)),
            Chrec::Top
        );
        // An affine chrec at the same count stays exact.
        let affine = Chrec::affine(l(1), 7, 3);
        assert_eq!(
            evaluate(l(1), &affine, &Chrec::int(1_000_000_000)),
            Chrec::int(3_000_000_007)
        );
    }

    #[test]
    fn test_evaluate_other_loop_is_invariant() {
        // {2, +, 9}_2 does not evolve in loop 1.
        let chrec = Chrec::affine(l(2), 2, 9);
        assert_eq!(evaluate(l(1), &chrec, &Chrec::int(3)), chrec);
    }

    #[test]
    fn test_hide_evolution_in_loop() {
        // {{1, +, 2}_1, +, 3}_2: hiding loop 2 leaves {1, +, 2}_1,
        // hiding loop 1 strips everything down to 1.
        let chrec = Chrec::polynomial(l(2), Chrec::affine(l(1), 1, 2), Chrec::int(3));
        assert_eq!(
            chrec.hide_evolution_in_loop(l(2)),
            Chrec::affine(l(1), 1, 2)
        );
        assert_eq!(chrec.hide_evolution_in_loop(l(1)), Chrec::int(1));
    }

    #[test]
    fn test_hide_evolution_in_other_loops_than() {
        let chrec = Chrec::polynomial(l(2), Chrec::affine(l(1), 1, 2), Chrec::int(3));
        // Projecting onto loop 2: the loop-1 contribution collapses to its
        // initial condition.
        assert_eq!(
            chrec.hide_evolution_in_other_loops_than(l(2)),
            Chrec::affine(l(2), 1, 3)
        );
        // Projecting onto loop 1: the loop-2 wrapper is skipped.
        assert_eq!(
            chrec.hide_evolution_in_other_loops_than(l(1)),
            Chrec::affine(l(1), 1, 2)
        );
    }

    #[test]
    fn test_evolution_part_in_loop() {
        let chrec = Chrec::polynomial(l(2), Chrec::affine(l(1), 1, 2), Chrec::int(3));
        assert_eq!(chrec.evolution_part_in_loop(l(2)), Some(Chrec::int(3)));
        assert_eq!(chrec.evolution_part_in_loop(l(1)), Some(Chrec::int(2)));
        assert_eq!(chrec.evolution_part_in_loop(l(3)), None);
        assert_eq!(Chrec::Top.evolution_part_in_loop(l(1)), Some(Chrec::Top));
    }
}
