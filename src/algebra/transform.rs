//! Rational linear loop transforms.
//!
//! A `TransformMatrix` is an integer matrix with an implicit integer
//! denominator: every entry is divided by it. Keeping the denominator as a
//! separate integer preserves exactness through inversion, where the
//! determinant becomes the new denominator.

use crate::algebra::matrix::{matrix_hermite, matrix_inverse, IntMatrix};
use num_integer::Integer;
use num_rational::Rational64;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An integer matrix plus `(row_count, col_count, denominator)`,
/// representing the rational linear transform `matrix / denominator`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformMatrix {
    matrix: IntMatrix,
    rows: usize,
    cols: usize,
    denominator: i64,
}

impl TransformMatrix {
    /// Wrap an integer matrix with the given denominator.
    pub fn new(matrix: IntMatrix, denominator: i64) -> Self {
        assert!(denominator != 0, "transform denominator must be nonzero");
        let rows = matrix.nrows();
        let cols = matrix.ncols();
        Self {
            matrix,
            rows,
            cols,
            denominator,
        }
    }

    /// The identity transform on `n` loops.
    pub fn identity(n: usize) -> Self {
        Self::new(IntMatrix::identity(n), 1)
    }

    /// Build an integer (denominator 1) transform from explicit rows.
    pub fn from_rows(rows: Vec<Vec<i64>>) -> Self {
        Self::new(IntMatrix::from_vec(rows), 1)
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// The denominator every entry is implicitly divided by.
    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    /// The underlying integer matrix (numerators).
    pub fn matrix(&self) -> &IntMatrix {
        &self.matrix
    }

    /// Entry as an exact rational.
    pub fn entry(&self, row: usize, col: usize) -> Rational64 {
        Rational64::new(self.matrix.get(row, col), self.denominator)
    }

    /// Determinant of the rational transform (square matrices up to the
    /// sizes loop transforms use; computed from the scaled inverse).
    pub fn determinant(&self) -> Rational64 {
        assert_eq!(self.rows, self.cols);
        let n = self.rows;
        // det(M/d) = det(M) / d^n; det(M) is recovered via expansion for
        // small n and Gauss elimination otherwise.
        let det_num = int_determinant(&self.matrix, n);
        let mut denom_pow = 1i64;
        for _ in 0..n {
            denom_pow *= self.denominator;
        }
        Rational64::new(det_num, denom_pow)
    }

    /// Whether the transform is unimodular: integral entries with
    /// determinant exactly ±1, hence invertible over the integers.
    pub fn is_unimodular(&self) -> bool {
        if self.rows != self.cols {
            return false;
        }
        if (0..self.rows).any(|i| {
            (0..self.cols).any(|j| self.matrix.get(i, j) % self.denominator != 0)
        }) {
            return false;
        }
        self.determinant().abs().is_one()
    }

    /// Composition `self ∘ other` (apply `other` first).
    pub fn compose(&self, other: &Self) -> Self {
        Self::new(
            self.matrix.multiply(&other.matrix),
            self.denominator * other.denominator,
        )
    }

    /// Exact inverse.
    ///
    /// With `T = M/d`, the inverse is `d * adj(M) / det(M)`; the integer
    /// companion from [`matrix_inverse`] becomes the numerator matrix and
    /// the determinant the new denominator.
    ///
    /// Panics on singular transforms (caller contract, as for
    /// `matrix_inverse`).
    pub fn inverse(&self) -> Self {
        assert_eq!(self.rows, self.cols);
        let (det, adj) = matrix_inverse(&self.matrix, self.rows);
        let mut numer = adj;
        for i in 0..self.rows {
            numer.row_scale(i, self.denominator);
        }
        Self::new(numer, det).reduced()
    }

    /// Hermite decomposition of the numerator matrix (integer transforms
    /// only): `H = U * M` with `H` lower triangular and `U` unimodular.
    pub fn hermite(&self) -> (IntMatrix, IntMatrix) {
        assert_eq!(
            self.denominator, 1,
            "hermite decomposition is defined on integer transforms"
        );
        matrix_hermite(&self.matrix, self.rows)
    }

    /// Apply the transform to an integer vector, returning `None` when the
    /// image is not integral.
    pub fn apply(&self, vec: &[i64]) -> Option<Vec<i64>> {
        let raw = self.matrix.multiply_vec(vec);
        raw.iter()
            .map(|&x| {
                if x % self.denominator == 0 {
                    Some(x / self.denominator)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Divide out the gcd of all numerators and the denominator.
    fn reduced(mut self) -> Self {
        let mut g = self.denominator.abs();
        for i in 0..self.rows {
            for j in 0..self.cols {
                g = g.gcd(&self.matrix.get(i, j));
            }
        }
        if g > 1 {
            for i in 0..self.rows {
                for j in 0..self.cols {
                    let v = self.matrix.get(i, j);
                    self.matrix.set(i, j, v / g);
                }
            }
            self.denominator /= g;
        }
        if self.denominator < 0 {
            self.denominator = -self.denominator;
            for i in 0..self.rows {
                self.matrix.row_negate(i);
            }
        }
        self
    }
}

/// Integer determinant by elimination over rationals.
fn int_determinant(m: &IntMatrix, n: usize) -> i64 {
    match n {
        0 => return 1,
        1 => return m.get(0, 0),
        2 => return m.get(0, 0) * m.get(1, 1) - m.get(0, 1) * m.get(1, 0),
        _ => {}
    }
    let mut work: Vec<Vec<Rational64>> = (0..n)
        .map(|i| (0..n).map(|j| Rational64::from_integer(m.get(i, j))).collect())
        .collect();
    let mut det = Rational64::one();
    for k in 0..n {
        let mut pivot = k;
        for i in (k + 1)..n {
            if work[i][k].abs() > work[pivot][k].abs() {
                pivot = i;
            }
        }
        if work[pivot][k].is_zero() {
            return 0;
        }
        if pivot != k {
            work.swap(k, pivot);
            det = -det;
        }
        det *= work[k][k];
        for i in (k + 1)..n {
            let factor = work[i][k] / work[k][k];
            let row_k: Vec<Rational64> = work[k].clone();
            for j in k..n {
                work[i][j] -= factor * row_k[j];
            }
        }
    }
    debug_assert!(det.is_integer());
    *det.numer() / *det.denom()
}

impl fmt::Display for TransformMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.matrix)
        } else {
            write!(f, "1/{} * {}", self.denominator, self.matrix)
        }
    }
}
