//! Exact representation of roots of unity.

use std::fmt;
use std::ops::Mul;

use fraction::ToPrimitive;
use num::Complex;
use num_traits::{One, Pow, Zero};

use crate::auxiliary::arithmetic::{reduce_mod_one, Frac};

#[cfg(test)]
#[path = "unityroot_tests.rs"]
mod unityroot_tests;

/// A struct to represent roots of unity symbolically.
///
/// The root $`z = e^{2k\pi i/n}`$ is stored as the reduced fraction $`k/n \in [0, 1)`$, so that two
/// roots compare equal exactly when they are the same complex number.
#[derive(Clone, Copy, PartialOrd, PartialEq, Eq, Hash)]
pub struct UnityRoot {
    /// The fraction $`k/n \in [0, 1)`$ of the unity root.
    fraction: Frac,
}

impl UnityRoot {
    /// Constructs a unity root $`e^{2k\pi i/n}`$ from a non-negative index $`k`$ and an order
    /// $`n`$. The index is reduced modulo the order.
    ///
    /// # Panics
    ///
    /// Panics if `order` is zero.
    #[must_use]
    pub fn new(index: u32, order: u32) -> Self {
        assert!(order > 0, "The order of a unity root must be positive.");
        Self {
            fraction: Frac::new(index % order, order),
        }
    }

    /// The unity root $`1`$.
    #[must_use]
    pub fn unity() -> Self {
        Self::new(0, 1)
    }

    /// The primitive root $`e^{-2\pi i/n}`$ used to generate the irreducible representations of a
    /// cyclic group of order $`n`$.
    #[must_use]
    pub fn conjugate_primitive(order: u32) -> Self {
        Self::new(order - 1, order)
    }

    /// The order $`n`$ of the root $`z`$ in lowest terms, *i.e.* the smallest $`n`$ with
    /// $`z^n = 1`$.
    pub fn order(&self) -> u32 {
        self.fraction.denom().copied().unwrap_or(1)
    }

    /// The index $`k`$ of the root $`z = e^{2k\pi i/n}`$ in lowest terms.
    pub fn index(&self) -> u32 {
        self.fraction.numer().copied().unwrap_or(0)
    }

    /// The fraction $`k/n`$ of a full turn.
    pub fn fraction(&self) -> &Frac {
        &self.fraction
    }

    /// The complex value of this root.
    #[must_use]
    pub fn complex_value(&self) -> Complex<f64> {
        let theta = self.fraction.to_f64().unwrap_or(0.0) * std::f64::consts::PI * 2.0;
        Complex::<f64>::from_polar(1.0, theta)
    }

    /// The complex conjugate of this root.
    #[must_use]
    pub fn complex_conjugate(&self) -> Self {
        Self::new(self.order() - self.index(), self.order())
    }
}

impl Default for UnityRoot {
    fn default() -> Self {
        Self::unity()
    }
}

// ---
// Mul
// ---
impl Mul<&'_ UnityRoot> for &UnityRoot {
    type Output = UnityRoot;

    fn mul(self, rhs: &UnityRoot) -> Self::Output {
        #[allow(clippy::suspicious_arithmetic_impl)]
        let fraction = reduce_mod_one(self.fraction + rhs.fraction);
        UnityRoot { fraction }
    }
}

impl Mul<UnityRoot> for UnityRoot {
    type Output = UnityRoot;

    fn mul(self, rhs: UnityRoot) -> Self::Output {
        &self * &rhs
    }
}

// ---
// Pow
// ---
impl Pow<i32> for &UnityRoot {
    type Output = UnityRoot;

    fn pow(self, rhs: i32) -> Self::Output {
        let order = i64::from(self.order());
        let index = (i64::from(self.index()) * i64::from(rhs)).rem_euclid(order);
        UnityRoot::new(
            u32::try_from(index).unwrap_or_else(|_| {
                panic!("Unable to convert the reduced index `{index}` to `u32`.")
            }),
            self.order(),
        )
    }
}

impl Pow<i32> for UnityRoot {
    type Output = UnityRoot;

    fn pow(self, rhs: i32) -> Self::Output {
        (&self).pow(rhs)
    }
}

// -------
// Display
// -------
impl fmt::Display for UnityRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quarter = Frac::new(1u32, 4u32);
        if self.fraction.is_zero() {
            write!(f, "1")
        } else if self.fraction == quarter {
            write!(f, "i")
        } else if self.fraction == quarter + quarter {
            write!(f, "-1")
        } else if self.fraction == Frac::one() - quarter {
            write!(f, "-i")
        } else if self.index() == 1 {
            write!(f, "E{}", self.order())
        } else {
            write!(f, "(E{})^{}", self.order(), self.index())
        }
    }
}

impl fmt::Debug for UnityRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fraction.is_zero() {
            write!(f, "1")
        } else if self.index() == 1 {
            write!(f, "E{}", self.order())
        } else {
            write!(f, "(E{})^{}", self.order(), self.index())
        }
    }
}
