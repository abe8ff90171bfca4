//! Scalar integer arithmetic: gcd/lcm, the Blankinship form of the extended
//! Euclidean algorithm, exact divisibility, and factorial/binomial helpers
//! used by the Newton evaluation of chains of recurrences.
//!
//! All division here uses mathematical floor/ceiling semantics; the solvers
//! depend on that, not on Rust's truncating `/`.

use num_integer::Integer;

/// Greatest common divisor. `gcd(0, 0) == 0`; otherwise non-negative.
pub fn gcd(a: i64, b: i64) -> i64 {
    a.gcd(&b)
}

/// Least common multiple, via gcd. `lcm(0, x) == 0`.
pub fn lcm(a: i64, b: i64) -> i64 {
    a.lcm(&b)
}

/// Exact divisibility: does `a` divide `b`?
///
/// `divides(0, b)` holds only for `b == 0`.
pub fn divides(a: i64, b: i64) -> bool {
    if a == 0 {
        b == 0
    } else {
        b % a == 0
    }
}

/// Integer floor division (rounds toward negative infinity).
pub fn floor_div(a: i64, b: i64) -> i64 {
    debug_assert!(b != 0);
    let d = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        d - 1
    } else {
        d
    }
}

/// Integer ceiling division (rounds toward positive infinity).
pub fn ceil_div(a: i64, b: i64) -> i64 {
    -floor_div(-a, b)
}

/// Result of the extended Euclidean algorithm on `(a1, a2)`.
///
/// The matrix `[[u11, u12], [u21, u22]]` is unimodular and satisfies
/// `u11*a1 + u12*a2 == gcd` and `u21*a1 + u22*a2 == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bezout {
    /// gcd(a1, a2), non-negative
    pub gcd: i64,
    /// Coefficient of `a1` in the gcd row
    pub u11: i64,
    /// Coefficient of `a2` in the gcd row
    pub u12: i64,
    /// Coefficient of `a1` in the kernel row
    pub u21: i64,
    /// Coefficient of `a2` in the kernel row
    pub u22: i64,
}

/// Extended Euclid in the Blankinship variant: row reduction on the
/// augmented system `[a1 | 1 0; a2 | 0 1]`, tracking signs explicitly so
/// the quotients match mathematical floor division.
pub fn bezout(a1: i64, a2: i64) -> Bezout {
    // Rows (r, u, v) maintain the invariant r == u*a1 + v*a2.
    let mut top = (a1, 1i64, 0i64);
    let mut bot = (a2, 0i64, 1i64);

    while bot.0 != 0 {
        let q = floor_div(top.0, bot.0);
        let next = (top.0 - q * bot.0, top.1 - q * bot.1, top.2 - q * bot.2);
        top = bot;
        bot = next;
    }

    // Keep the reported gcd non-negative. Each elimination step has
    // determinant -1, so the witness matrix stays unimodular throughout.
    if top.0 < 0 {
        top = (-top.0, -top.1, -top.2);
    }

    Bezout {
        gcd: top.0,
        u11: top.1,
        u12: top.2,
        u21: bot.1,
        u22: bot.2,
    }
}

/// Exact factorial. Caller guarantees `n` is small enough not to overflow
/// (the Newton evaluation only ever needs small degrees).
pub fn factorial(n: i64) -> i64 {
    debug_assert!(n >= 0);
    (1..=n).product()
}

/// Binomial coefficient `C(n, k)`, or `None` when it does not fit `i64`.
///
/// Caller guarantees `0 <= k <= n`. Computed multiplicatively so
/// intermediate values stay bounded by the result times `n`.
pub fn binomial(n: i64, k: i64) -> Option<i64> {
    debug_assert!(n >= 0 && k >= 0 && k <= n);
    let k = k.min(n - k);
    let mut result = 1i64;
    for i in 0..k {
        result = result.checked_mul(n - i)? / (i + 1);
    }
    Some(result)
}
