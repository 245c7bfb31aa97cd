//! Finite translation groups generated by fractional translations.

use std::fmt;

use indexmap::IndexMap;
use itertools::{iproduct, Itertools};
use log;
use num_traits::Zero;

use crate::auxiliary::arithmetic::{
    checked_translation_order, cross, determinant, is_zero_vector, mixed_radix_digits,
    mixed_radix_index,
};
use crate::chartab::CharacterTable;
use crate::error::UnfoldingError;

pub mod fractional_translation;

pub use fractional_translation::FractionalTranslation;


/// The maximum number of translation generators.
pub const MAX_GENERATORS: usize = 3;

/// The maximum number of translations in a group.
pub const MAX_GROUP_ORDER: u64 = 4096;

// ==================
// Struct definitions
// ==================

/// A structure to manage a finite abelian group of fractional translations, together with its
/// table of one-dimensional irreducible representations.
///
/// Elements are indexed by the mixed-radix encoding $`i\,n_2 n_3 + j\,n_3 + k`$ of the powers
/// $`(i, j, k)`$ of the three (padded) generators, whose orders are $`(n_1, n_2, n_3)`$. Irreducible
/// representations are indexed in the same way.
#[derive(Clone)]
pub struct TranslationGroup {
    /// The three generators, padded with identity translations when fewer were supplied.
    generators: [FractionalTranslation; MAX_GENERATORS],

    /// The number of generators actually supplied.
    n_supplied_generators: usize,

    /// The orders of the three generators.
    generator_orders: [u32; MAX_GENERATORS],

    /// All group elements in mixed-radix order.
    translations: Vec<FractionalTranslation>,

    /// The character table of the group.
    character_table: CharacterTable,
}

impl TranslationGroup {
    /// Constructs the translation group spanned by at most three fractional-translation
    /// generators.
    ///
    /// # Arguments
    ///
    /// * `generators` - Zero to three linearly independent generators. No generators give the
    /// trivial group.
    ///
    /// # Returns
    ///
    /// The translation group with its character table, or a configuration error if more than
    /// three generators are given, if the product of the generator orders exceeds
    /// [`MAX_GROUP_ORDER`], if the generators are linearly dependent, or if distinct generator
    /// powers coincide modulo the lattice.
    pub fn from_generators(generators: &[FractionalTranslation]) -> Result<Self, UnfoldingError> {
        validate_generators(generators)?;

        let mut padded = [FractionalTranslation::identity(); MAX_GENERATORS];
        padded[..generators.len()].copy_from_slice(generators);
        let generator_orders = padded.map(|g| g.order());
        log::debug!(
            "Translation generators {} have orders {:?}.",
            padded.iter().map(|g| format!("{g:?}")).join(", "),
            generator_orders
        );

        let translations = iproduct!(
            0..generator_orders[0],
            0..generator_orders[1],
            0..generator_orders[2]
        )
        .map(|(i, j, k)| {
            padded[0]
                .repeated(i)
                .compose(&padded[1].repeated(j))
                .compose(&padded[2].repeated(k))
        })
        .collect_vec();

        // Distinct powers must give distinct translations, otherwise the group is smaller than the
        // direct product of the cyclic groups of the generators.
        let mut seen: IndexMap<FractionalTranslation, usize> = IndexMap::new();
        for (ii, t) in translations.iter().enumerate() {
            if let Some(jj) = seen.insert(*t, ii) {
                return Err(UnfoldingError::Configuration(format!(
                    "generator powers {:?} and {:?} both give the translation {t:?}; the \
                    generators are not independent modulo the lattice",
                    mixed_radix_digits(jj, &generator_orders),
                    mixed_radix_digits(ii, &generator_orders),
                )));
            }
        }

        let character_table = CharacterTable::from_generator_orders(&generator_orders)?;

        Ok(Self {
            generators: padded,
            n_supplied_generators: generators.len(),
            generator_orders,
            translations,
            character_table,
        })
    }

    /// The number of elements in the group.
    pub fn order(&self) -> usize {
        self.translations.len()
    }

    /// The three generators, including any identity padding.
    pub fn generators(&self) -> &[FractionalTranslation; MAX_GENERATORS] {
        &self.generators
    }

    /// The generators that were actually supplied.
    pub fn supplied_generators(&self) -> &[FractionalTranslation] {
        &self.generators[..self.n_supplied_generators]
    }

    pub fn generator_orders(&self) -> &[u32; MAX_GENERATORS] {
        &self.generator_orders
    }

    /// All group elements in mixed-radix order. The identity is always first.
    pub fn translations(&self) -> &[FractionalTranslation] {
        &self.translations
    }

    pub fn character_table(&self) -> &CharacterTable {
        &self.character_table
    }

    /// The index of the identity translation.
    pub fn identity_index(&self) -> usize {
        0
    }

    /// The generator powers $`(i, j, k)`$ of the element with index `ii`.
    pub fn decompose_index(&self, ii: usize) -> [u32; MAX_GENERATORS] {
        mixed_radix_digits(ii, &self.generator_orders)
    }

    /// The index of the element with generator powers $`(i, j, k)`$. Powers are taken modulo
    /// the generator orders.
    pub fn compose_powers(&self, powers: &[u32; MAX_GENERATORS]) -> usize {
        let reduced = [0usize, 1, 2].map(|d| powers[d] % self.generator_orders[d]);
        mixed_radix_index(&reduced, &self.generator_orders)
    }

    /// The index of the sum (modulo one) of the elements with indices `a` and `b`.
    pub fn add_indices(&self, a: usize, b: usize) -> usize {
        let pa = self.decompose_index(a);
        let pb = self.decompose_index(b);
        self.compose_powers(&[pa[0] + pb[0], pa[1] + pb[1], pa[2] + pb[2]])
    }
}

/// Checks the number, the orders and the linear independence of the supplied generators.
///
/// The orders are bounded before the exact independence checks, whose intermediate denominators
/// divide the product of the generator orders.
fn validate_generators(generators: &[FractionalTranslation]) -> Result<(), UnfoldingError> {
    if generators.len() > MAX_GENERATORS {
        return Err(UnfoldingError::Configuration(format!(
            "there can be at most {MAX_GENERATORS} generators of fractional translations, but {} \
            were given",
            generators.len()
        )));
    }

    let order = generators.iter().try_fold(1u64, |acc, g| {
        checked_translation_order(g.components())
            .and_then(|n| acc.checked_mul(n))
            .filter(|&n| n <= MAX_GROUP_ORDER)
    });
    if order.is_none() {
        return Err(UnfoldingError::Configuration(format!(
            "the generators {} span more than {MAX_GROUP_ORDER} translations",
            generators.iter().map(|g| format!("{g:?}")).join(", ")
        )));
    }

    match generators {
        [a, b] => {
            if is_zero_vector(&cross(a.components(), b.components())) {
                Err(UnfoldingError::Configuration(format!(
                    "the generators {a:?} and {b:?} are not linearly independent"
                )))
            } else {
                Ok(())
            }
        }
        [a, b, c] => {
            if determinant(a.components(), b.components(), c.components()).is_zero() {
                Err(UnfoldingError::Configuration(format!(
                    "the generators {a:?}, {b:?} and {c:?} are not linearly independent"
                )))
            } else {
                Ok(())
            }
        }
        _ => Ok(()),
    }
}

impl fmt::Display for TranslationGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Translation group of order {}", self.order())?;
        if self.n_supplied_generators == 0 {
            writeln!(f, "  (no generators supplied: trivial group)")?;
        }
        for (g, n) in self
            .supplied_generators()
            .iter()
            .zip(self.generator_orders.iter())
        {
            writeln!(f, "  Generator {g:?} of order {n}")?;
        }
        writeln!(f, "Elements:")?;
        let width = self.order().to_string().chars().count();
        for (ii, t) in self.translations.iter().enumerate() {
            writeln!(f, "  T{ii:<width$} = {t:?}")?;
        }
        Ok(())
    }
}
