//! Exact integer algebra used by the dependence tester and by
//! loop-transformation matrix construction:
//! - Scalar number theory (gcd, lcm, Bezout, binomials)
//! - Dense integer vectors and matrices
//! - Rational linear transforms with an integer denominator

pub mod matrix;
pub mod number;
pub mod transform;
pub mod vector;

pub use matrix::{matrix_hermite, matrix_inverse, IntMatrix};
pub use number::{bezout, binomial, ceil_div, divides, factorial, floor_div, gcd, lcm, Bezout};
pub use transform::TransformMatrix;
pub use vector::IntVector;
