//! Dense exact integer matrices and the two decompositions the dependence
//! engine and loop-transform construction rely on: the exact inverse scaled
//! by the determinant, and the Hermite decomposition into a lower-triangular
//! factor times a unimodular one.
//!
//! Every algorithm works on owned working copies; caller-visible matrices
//! are never aliased with elimination state.

use crate::algebra::number::floor_div;
use crate::algebra::vector::IntVector;
use num_rational::Rational64;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A dense matrix of signed integers with row-major storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntMatrix {
    data: Vec<Vec<i64>>,
    rows: usize,
    cols: usize,
}

impl IntMatrix {
    /// Create a zero matrix with the given dimensions.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![vec![0; cols]; rows],
            rows,
            cols,
        }
    }

    /// Create an identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut mat = Self::zeros(n, n);
        for i in 0..n {
            mat.data[i][i] = 1;
        }
        mat
    }

    /// Create a matrix from explicit rows.
    pub fn from_vec(data: Vec<Vec<i64>>) -> Self {
        let rows = data.len();
        let cols = if rows > 0 { data[0].len() } else { 0 };
        debug_assert!(data.iter().all(|r| r.len() == cols));
        Self { data, rows, cols }
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Entry accessor.
    pub fn get(&self, row: usize, col: usize) -> i64 {
        self.data[row][col]
    }

    /// Entry mutator.
    pub fn set(&mut self, row: usize, col: usize, value: i64) {
        self.data[row][col] = value;
    }

    /// Extract a row as a vector.
    pub fn row(&self, row: usize) -> IntVector {
        IntVector::from_vec(self.data[row].clone())
    }

    /// Extract a column as a vector.
    pub fn column(&self, col: usize) -> IntVector {
        IntVector::from_vec(self.data.iter().map(|r| r[col]).collect())
    }

    /// Transpose.
    pub fn transpose(&self) -> Self {
        let mut result = Self::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                result.data[j][i] = self.data[i][j];
            }
        }
        result
    }

    /// Component-wise sum.
    pub fn add(&self, other: &Self) -> Self {
        assert_eq!((self.rows, self.cols), (other.rows, other.cols));
        let mut result = self.clone();
        for i in 0..self.rows {
            for j in 0..self.cols {
                result.data[i][j] += other.data[i][j];
            }
        }
        result
    }

    /// Scaled sum: `ca*a + cb*b`.
    pub fn add_scaled(a: &Self, ca: i64, b: &Self, cb: i64) -> Self {
        assert_eq!((a.rows, a.cols), (b.rows, b.cols));
        let mut result = Self::zeros(a.rows, a.cols);
        for i in 0..a.rows {
            for j in 0..a.cols {
                result.data[i][j] = ca * a.data[i][j] + cb * b.data[i][j];
            }
        }
        result
    }

    /// Matrix product (`m×r` by `r×n` gives `m×n`).
    pub fn multiply(&self, other: &Self) -> Self {
        assert_eq!(self.cols, other.rows);
        let mut result = Self::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for j in 0..other.cols {
                let mut sum = 0i64;
                for k in 0..self.cols {
                    sum += self.data[i][k] * other.data[k][j];
                }
                result.data[i][j] = sum;
            }
        }
        result
    }

    /// Apply to an integer vector.
    pub fn multiply_vec(&self, vec: &[i64]) -> Vec<i64> {
        assert_eq!(self.cols, vec.len());
        let mut result = vec![0i64; self.rows];
        for i in 0..self.rows {
            for j in 0..self.cols {
                result[i] += self.data[i][j] * vec[j];
            }
        }
        result
    }

    /// Swap two rows in place.
    pub fn row_exchange(&mut self, r1: usize, r2: usize) {
        self.data.swap(r1, r2);
    }

    /// Swap two columns in place.
    pub fn col_exchange(&mut self, c1: usize, c2: usize) {
        for row in &mut self.data {
            row.swap(c1, c2);
        }
    }

    /// `row[dst] += factor * row[src]` in place.
    pub fn row_add_scaled(&mut self, dst: usize, src: usize, factor: i64) {
        debug_assert_ne!(dst, src);
        let src_row: Vec<i64> = self.data[src].clone();
        for (d, s) in self.data[dst].iter_mut().zip(src_row) {
            *d += factor * s;
        }
    }

    /// `col[dst] += factor * col[src]` in place.
    pub fn col_add_scaled(&mut self, dst: usize, src: usize, factor: i64) {
        debug_assert_ne!(dst, src);
        for row in &mut self.data {
            row[dst] += factor * row[src];
        }
    }

    /// Negate a row in place.
    pub fn row_negate(&mut self, row: usize) {
        self.data[row].iter_mut().for_each(|x| *x = -*x);
    }

    /// Negate a column in place.
    pub fn col_negate(&mut self, col: usize) {
        for row in &mut self.data {
            row[col] = -row[col];
        }
    }

    /// Multiply a row by a constant in place.
    pub fn row_scale(&mut self, row: usize, factor: i64) {
        self.data[row].iter_mut().for_each(|x| *x *= factor);
    }

    /// Multiply a column by a constant in place.
    pub fn col_scale(&mut self, col: usize, factor: i64) {
        for row in &mut self.data {
            row[col] *= factor;
        }
    }

    /// Delete rows `from..=to`, compacting the remaining rows upward.
    pub fn delete_rows(&mut self, from: usize, to: usize) {
        assert!(from <= to && to < self.rows);
        self.data.drain(from..=to);
        self.rows = self.data.len();
    }
}

impl fmt::Display for IntMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[")?;
        for row in &self.data {
            write!(f, "  [")?;
            for (j, val) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", val)?;
            }
            writeln!(f, "]")?;
        }
        write!(f, "]")
    }
}

/// Compute `(det(M), det(M) * M^-1)` for a full-rank `n×n` matrix.
///
/// The scaled inverse is the adjugate, so every entry is an exact integer:
/// `M * Minv == det * I` holds with no rounding. The determinant is
/// normalized to be non-negative (the scaled inverse is negated along with
/// it, preserving the identity).
///
/// Panics if `M` is singular: the caller is responsible for only inverting
/// matrices already known full-rank.
pub fn matrix_inverse(m: &IntMatrix, n: usize) -> (i64, IntMatrix) {
    assert_eq!(m.nrows(), n);
    assert_eq!(m.ncols(), n);

    // Direct formula for the 2x2 case.
    if n == 2 {
        let (a, b, c, d) = (m.get(0, 0), m.get(0, 1), m.get(1, 0), m.get(1, 1));
        let det = a * d - b * c;
        assert!(det != 0, "matrix_inverse: singular matrix (caller contract)");
        let mut inv = IntMatrix::from_vec(vec![vec![d, -b], vec![-c, a]]);
        if det < 0 {
            for i in 0..2 {
                inv.row_negate(i);
            }
            return (-det, inv);
        }
        return (det, inv);
    }

    // Gauss-Jordan elimination over exact rationals on an owned working
    // copy, run in parallel on an identity matrix.
    let zero = Rational64::zero();
    let mut work: Vec<Vec<Rational64>> = (0..n)
        .map(|i| (0..n).map(|j| Rational64::from_integer(m.get(i, j))).collect())
        .collect();
    let mut inv: Vec<Vec<Rational64>> = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| {
                    if i == j {
                        Rational64::one()
                    } else {
                        Rational64::zero()
                    }
                })
                .collect()
        })
        .collect();

    let mut det = Rational64::one();
    for k in 0..n {
        // Partial pivot on the current column.
        let mut pivot_row = k;
        for i in (k + 1)..n {
            if work[i][k].abs() > work[pivot_row][k].abs() {
                pivot_row = i;
            }
        }
        assert!(
            work[pivot_row][k] != zero,
            "matrix_inverse: singular matrix (caller contract)"
        );
        if pivot_row != k {
            work.swap(k, pivot_row);
            inv.swap(k, pivot_row);
            det = -det;
        }

        let pivot = work[k][k];
        det *= pivot;
        for j in 0..n {
            work[k][j] /= pivot;
            inv[k][j] /= pivot;
        }
        for i in 0..n {
            if i != k && work[i][k] != zero {
                let factor = work[i][k];
                let work_k: Vec<Rational64> = work[k].clone();
                let inv_k: Vec<Rational64> = inv[k].clone();
                for j in 0..n {
                    work[i][j] -= factor * work_k[j];
                    inv[i][j] -= factor * inv_k[j];
                }
            }
        }
    }

    debug_assert!(det.is_integer());
    let mut det_int = *det.numer() / *det.denom();

    // Scale the rational inverse by the determinant; the result is the
    // adjugate and must come out integral.
    let mut result = IntMatrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            let scaled = inv[i][j] * det;
            debug_assert!(scaled.is_integer());
            result.set(i, j, *scaled.numer() / *scaled.denom());
        }
    }

    if det_int < 0 {
        det_int = -det_int;
        for i in 0..n {
            result.row_negate(i);
        }
    }
    (det_int, result)
}

/// Hermite decomposition of a square matrix: `H = U * M` with `H` lower
/// triangular (non-negative diagonal) and `U` unimodular.
///
/// Columns are processed right to left; within each column, repeated
/// pivoting and floor-quotient reduction (mirroring the inversion
/// elimination, but tracking the row operations on `U` instead of a second
/// copy of `M`) clears the entries above the diagonal.
pub fn matrix_hermite(m: &IntMatrix, n: usize) -> (IntMatrix, IntMatrix) {
    assert_eq!(m.nrows(), n);
    assert_eq!(m.ncols(), n);
    let mut h = m.clone();
    let mut u = IntMatrix::identity(n);

    for j in (0..n).rev() {
        loop {
            // Pick the nonzero entry of minimal magnitude among rows 0..=j
            // of column j and move it onto the diagonal.
            let mut pivot: Option<usize> = None;
            for i in 0..=j {
                if h.get(i, j) != 0 {
                    match pivot {
                        Some(p) if h.get(p, j).abs() <= h.get(i, j).abs() => {}
                        _ => pivot = Some(i),
                    }
                }
            }
            let Some(pivot) = pivot else { break };
            if pivot != j {
                h.row_exchange(pivot, j);
                u.row_exchange(pivot, j);
            }

            // Reduce the rows above; nonzero remainders mean another
            // Euclid round with a smaller pivot.
            let mut reduced = true;
            for i in 0..j {
                let entry = h.get(i, j);
                if entry != 0 {
                    let q = floor_div(entry, h.get(j, j));
                    if q != 0 {
                        h.row_add_scaled(i, j, -q);
                        u.row_add_scaled(i, j, -q);
                    }
                    if h.get(i, j) != 0 {
                        reduced = false;
                    }
                }
            }
            if reduced {
                break;
            }
        }
        if h.get(j, j) < 0 {
            h.row_negate(j);
            u.row_negate(j);
        }
    }

    (h, u)
}
