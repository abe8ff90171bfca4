//! Dense exact integer vectors.
//!
//! `IntVector` is owned by its constructing operation and mutated in place
//! by the elementary operations the matrix algorithms are built from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A dense, fixed-length vector of signed integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntVector {
    data: Vec<i64>,
}

impl IntVector {
    /// Create a zero vector of the given length.
    pub fn zeros(len: usize) -> Self {
        Self { data: vec![0; len] }
    }

    /// Create a vector from explicit entries.
    pub fn from_vec(data: Vec<i64>) -> Self {
        Self { data }
    }

    /// Length of the vector.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the vector has no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Entry accessor.
    pub fn get(&self, i: usize) -> i64 {
        self.data[i]
    }

    /// Entry mutator.
    pub fn set(&mut self, i: usize, value: i64) {
        self.data[i] = value;
    }

    /// Borrow the underlying slice.
    pub fn as_slice(&self) -> &[i64] {
        &self.data
    }

    /// Reset every entry to zero.
    pub fn clear(&mut self) {
        self.data.iter_mut().for_each(|x| *x = 0);
    }

    /// Component-wise addition: `self += other`.
    pub fn add(&mut self, other: &IntVector) {
        assert_eq!(self.len(), other.len());
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += b;
        }
    }

    /// Scaled addition: `self = ca*a + cb*b`.
    pub fn add_scaled(&mut self, a: &IntVector, ca: i64, b: &IntVector, cb: i64) {
        assert_eq!(a.len(), b.len());
        assert_eq!(self.len(), a.len());
        for (i, out) in self.data.iter_mut().enumerate() {
            *out = ca * a.data[i] + cb * b.data[i];
        }
    }

    /// Negate every entry in place.
    pub fn negate(&mut self) {
        self.data.iter_mut().for_each(|x| *x = -*x);
    }

    /// Multiply every entry by a constant in place.
    pub fn scale(&mut self, factor: i64) {
        self.data.iter_mut().for_each(|x| *x *= factor);
    }

    /// Whether every entry is zero.
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|&x| x == 0)
    }

    /// Index of the first nonzero entry at or after `start`; returns the
    /// vector length when the suffix is all zero.
    pub fn first_nonzero(&self, start: usize) -> usize {
        (start..self.data.len())
            .find(|&i| self.data[i] != 0)
            .unwrap_or(self.data.len())
    }

    /// Index of the entry with minimal absolute value among the nonzero
    /// entries at or after `start`.
    ///
    /// Panics if the suffix is all zero: callers must have checked
    /// `first_nonzero` first.
    pub fn min_nonzero(&self, start: usize) -> usize {
        let first = self.first_nonzero(start);
        assert!(
            first < self.data.len(),
            "min_nonzero on an all-zero suffix (caller contract)"
        );
        let mut best = first;
        for i in (first + 1)..self.data.len() {
            if self.data[i] != 0 && self.data[i].abs() < self.data[best].abs() {
                best = i;
            }
        }
        best
    }
}

impl fmt::Display for IntVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_scaled() {
        let a = IntVector::from_vec(vec![1, 2, 3]);
        let b = IntVector::from_vec(vec![4, 5, 6]);
        let mut out = IntVector::zeros(3);
        out.add_scaled(&a, 2, &b, -1);
        assert_eq!(out.as_slice(), &[-2, -1, 0]);
    }

    #[test]
    fn test_negate_scale_clear() {
        let mut v = IntVector::from_vec(vec![1, -2, 3]);
        v.negate();
        assert_eq!(v.as_slice(), &[-1, 2, -3]);
        v.scale(3);
        assert_eq!(v.as_slice(), &[-3, 6, -9]);
        v.clear();
        assert!(v.is_zero());
    }

    #[test]
    fn test_first_nonzero() {
        let v = IntVector::from_vec(vec![0, 0, 5, 0, 7]);
        assert_eq!(v.first_nonzero(0), 2);
        assert_eq!(v.first_nonzero(3), 4);
        assert_eq!(v.first_nonzero(5), 5);
        let z = IntVector::zeros(4);
        assert_eq!(z.first_nonzero(0), 4);
    }

    #[test]
    fn test_min_nonzero() {
        let v = IntVector::from_vec(vec![0, 9, -2, 4]);
        assert_eq!(v.min_nonzero(0), 2);
        assert_eq!(v.min_nonzero(3), 3);
    }

    #[test]
    #[should_panic]
    fn test_min_nonzero_all_zero_panics() {
        let v = IntVector::zeros(3);
        v.min_nonzero(0);
    }
}
