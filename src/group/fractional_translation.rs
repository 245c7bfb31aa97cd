//! Fractional translations of a periodic cell.

use std::fmt;
use std::str::FromStr;

use fraction::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::auxiliary::arithmetic::{
    add_vectors, reduce_vector_mod_one, scale_vector, translation_order, Frac, FracVector,
};
use crate::error::UnfoldingError;

/// A translation by a rational fraction of the lattice vectors, reduced into $`[0, 1)^3`$.
///
/// Components are held as exact fractions. As a generator, each component is either $`0`$ or
/// $`1/n`$ for a positive integer $`n`$; general group elements are integer combinations of
/// generators reduced modulo one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FractionalTranslation {
    components: FracVector,
}

impl FractionalTranslation {
    /// Constructs a fractional translation from arbitrary rational components, reducing them
    /// modulo one.
    #[must_use]
    pub fn new(components: FracVector) -> Self {
        Self {
            components: reduce_vector_mod_one(&components),
        }
    }

    /// The identity translation $`(0, 0, 0)`$.
    #[must_use]
    pub fn identity() -> Self {
        let zero = Frac::new(0u32, 1u32);
        Self::new([zero, zero, zero])
    }

    /// Constructs the generator $`(1/n_1, 1/n_2, 1/n_3)`$ from denominators, where a zero
    /// denominator denotes a zero component.
    #[must_use]
    pub fn from_denominators(denominators: [u32; 3]) -> Self {
        let components = denominators.map(|n| {
            if n == 0 {
                Frac::new(0u32, 1u32)
            } else {
                Frac::new(1u32, n)
            }
        });
        Self::new(components)
    }

    pub fn components(&self) -> &FracVector {
        &self.components
    }

    /// The components as floating-point numbers.
    pub fn to_f64(&self) -> [f64; 3] {
        self.components.map(|c| c.to_f64().unwrap_or(0.0))
    }

    /// The order of this translation, *i.e.* the smallest positive $`k`$ such that $`k`$ times
    /// this translation is a lattice vector.
    pub fn order(&self) -> u32 {
        translation_order(&self.components)
    }

    /// Returns `true` if this is the identity translation.
    pub fn is_identity(&self) -> bool {
        self.order() == 1
    }

    /// The translation repeated `k` times, reduced modulo one.
    #[must_use]
    pub fn repeated(&self, k: u32) -> Self {
        Self::new(scale_vector(&self.components, k))
    }

    /// The composition of this translation with `other`, reduced modulo one.
    #[must_use]
    pub fn compose(&self, other: &Self) -> Self {
        Self::new(add_vectors(&self.components, &other.components))
    }
}

impl FromStr for FractionalTranslation {
    type Err = UnfoldingError;

    /// Parses a generator written as `SX,SY,SZ`, where every component is either `0` or `1/n`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_component = |comp: &str| -> Result<Frac, UnfoldingError> {
            let comp = comp.trim();
            if comp == "0" {
                return Ok(Frac::new(0u32, 1u32));
            }
            let denom = comp
                .strip_prefix("1/")
                .and_then(|n| n.trim().parse::<u32>().ok())
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    UnfoldingError::Configuration(format!(
                        "unable to parse `{comp}` in the translation generator `{s}`; every \
                        component must be either `0` or `1/n` with `n` a positive integer"
                    ))
                })?;
            Ok(Frac::new(1u32, denom))
        };
        let components = s
            .split(',')
            .map(parse_component)
            .collect::<Result<Vec<_>, _>>()?;
        let components: FracVector = components.try_into().map_err(|comps: Vec<Frac>| {
            UnfoldingError::Configuration(format!(
                "the translation generator `{s}` has {} components instead of three",
                comps.len()
            ))
        })?;
        Ok(Self::new(components))
    }
}

impl TryFrom<String> for FractionalTranslation {
    type Error = UnfoldingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FractionalTranslation> for String {
    fn from(value: FractionalTranslation) -> Self {
        value.to_string()
    }
}

impl fmt::Display for FractionalTranslation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{}",
            self.components[0], self.components[1], self.components[2]
        )
    }
}

impl fmt::Debug for FractionalTranslation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.components[0], self.components[1], self.components[2]
        )
    }
}
