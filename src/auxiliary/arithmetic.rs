//! Exact rational arithmetic for fractional translations.

use fraction::GenericFraction;
use num::Integer;
use num_traits::{One, Zero};

#[cfg(test)]
#[path = "arithmetic_tests.rs"]
mod arithmetic_tests;

/// Exact fraction type used for all fractional-translation components.
pub type Frac = GenericFraction<u32>;

/// An exact rational three-vector.
pub type FracVector = [Frac; 3];

/// Reduces a fraction modulo one into the interval $`[0, 1)`$.
///
/// # Arguments
///
/// * `f` - The fraction to be reduced.
///
/// # Returns
///
/// The fractional part of `f`, made non-negative.
#[must_use]
pub fn reduce_mod_one(f: Frac) -> Frac {
    let fract = f.fract();
    if fract < Frac::zero() {
        fract + Frac::one()
    } else {
        fract
    }
}

/// Reduces every component of a rational vector modulo one.
#[must_use]
pub fn reduce_vector_mod_one(v: &FracVector) -> FracVector {
    [
        reduce_mod_one(v[0]),
        reduce_mod_one(v[1]),
        reduce_mod_one(v[2]),
    ]
}

/// Greatest common divisor of a sequence of integers. An empty sequence gives zero.
pub fn gcd_all<I: IntoIterator<Item = u32>>(values: I) -> u32 {
    values.into_iter().fold(0, |acc, v| acc.gcd(&v))
}

/// Least common multiple of a sequence of integers. An empty sequence gives one.
pub fn lcm_all<I: IntoIterator<Item = u32>>(values: I) -> u32 {
    values.into_iter().fold(1, |acc, v| acc.lcm(&v))
}

/// Determines the order of a fractional translation, *i.e.* the smallest positive integer $`k`$
/// such that $`k\mathbf{t}`$ has integral components.
///
/// With each component written as a reduced fraction $`p_i/q_i`$, $`k\,p_i/q_i`$ is an integer iff
/// $`q_i \mid k`$, hence the order is $`\operatorname{lcm}(q_1, q_2, q_3)`$.
///
/// # Arguments
///
/// * `v` - The translation vector.
///
/// # Returns
///
/// The order of the translation. The zero translation has order one.
#[must_use]
pub fn translation_order(v: &FracVector) -> u32 {
    lcm_all(
        reduce_vector_mod_one(v)
            .iter()
            .map(|c| c.denom().copied().unwrap_or(1)),
    )
}

/// Like [`translation_order`], but in 64-bit arithmetic, returning `None` if the order does not
/// fit in a `u64`.
#[must_use]
pub fn checked_translation_order(v: &FracVector) -> Option<u64> {
    reduce_vector_mod_one(v)
        .iter()
        .map(|c| u64::from(c.denom().copied().unwrap_or(1)))
        .try_fold(1u64, |acc, q| (acc / acc.gcd(&q)).checked_mul(q))
}

/// Multiplies a rational vector by a non-negative integer.
#[must_use]
pub fn scale_vector(v: &FracVector, k: u32) -> FracVector {
    let kf = Frac::new(k, 1u32);
    [kf * v[0], kf * v[1], kf * v[2]]
}

/// Component-wise sum of two rational vectors.
#[must_use]
pub fn add_vectors(a: &FracVector, b: &FracVector) -> FracVector {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

/// Exact cross product $`\mathbf{a} \times \mathbf{b}`$.
#[must_use]
pub fn cross(a: &FracVector, b: &FracVector) -> FracVector {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Exact determinant of the matrix whose rows are `a`, `b` and `c`.
#[must_use]
pub fn determinant(a: &FracVector, b: &FracVector, c: &FracVector) -> Frac {
    let axb = cross(a, b);
    axb[0] * c[0] + axb[1] * c[1] + axb[2] * c[2]
}

/// Returns `true` if every component of the vector is zero.
pub fn is_zero_vector(v: &FracVector) -> bool {
    v.iter().all(Zero::is_zero)
}

/// Decomposes a flat index into its mixed-radix digits $`(i, j, k)`$ such that
/// $`\text{index} = i\,n_2 n_3 + j\,n_3 + k`$ with $`(n_1, n_2, n_3)`$ the radices.
#[must_use]
pub fn mixed_radix_digits(index: usize, radices: &[u32; 3]) -> [u32; 3] {
    let n2 = radices[1] as usize;
    let n3 = radices[2] as usize;
    let k = index % n3;
    let j = (index / n3) % n2;
    let i = index / (n2 * n3);
    [i as u32, j as u32, k as u32]
}

/// Inverse of [`mixed_radix_digits`].
#[must_use]
pub fn mixed_radix_index(digits: &[u32; 3], radices: &[u32; 3]) -> usize {
    let n2 = radices[1] as usize;
    let n3 = radices[2] as usize;
    digits[0] as usize * n2 * n3 + digits[1] as usize * n3 + digits[2] as usize
}
