//! Permutations of atomic sites induced by fractional translations.

use std::fmt;
use std::ops::Mul;

use derive_builder::Builder;
use indexmap::IndexSet;
use itertools::Itertools;
use log;
use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::error::UnfoldingError;
use crate::group::FractionalTranslation;


// ==================
// Struct definitions
// ==================

/// A structure to manage permutation actions of a finite set.
#[derive(Builder, Clone, Debug, PartialEq, Eq, Hash)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Permutation {
    /// If the permutation acts on the ordered sequence $`0, 1, \ldots, n - 1`$, then this gives
    /// the result of the action.
    image: Vec<usize>,

    #[builder(setter(skip), default = "self.calc_cycles()")]
    cycles: Vec<Vec<usize>>,
}

impl PermutationBuilder {
    fn validate(&self) -> Result<(), String> {
        let image = self
            .image
            .as_ref()
            .ok_or("No permutation image found.".to_string())?;
        let distinct = image.iter().collect::<IndexSet<_>>();
        if distinct.len() != image.len() || image.iter().any(|i| *i >= image.len()) {
            return Err(format!("`{image:?}` is not a permutation image."));
        }
        Ok(())
    }

    fn calc_cycles(&self) -> Vec<Vec<usize>> {
        let image = match self.image.as_ref() {
            Some(image) => image,
            None => return Vec::new(),
        };
        let mut remaining = (0..image.len()).rev().collect::<IndexSet<usize>>();
        let mut cycles: Vec<Vec<usize>> = Vec::new();
        while let Some(start) = remaining.pop() {
            let mut cycle = vec![start];
            let mut idx = image[start];
            // Images that are not a permutation are rejected by `validate`, so only stop on
            // revisits here.
            while idx != start && remaining.shift_remove(&idx) {
                cycle.push(idx);
                idx = image[idx];
            }
            cycles.push(cycle);
        }
        cycles.sort_by_key(|cycle| (!cycle.len(), cycle.clone()));
        cycles
    }
}

impl Permutation {
    /// Returns a builder to construct a new permutation.
    #[must_use]
    pub fn builder() -> PermutationBuilder {
        PermutationBuilder::default()
    }

    /// Constructs a permutation from its image, or returns `None` if `image` does not describe a
    /// bijection of $`0, 1, \ldots, n - 1`$.
    pub fn from_image(image: &[usize]) -> Option<Self> {
        Self::builder().image(image.to_vec()).build().ok()
    }

    /// The number of elements acted upon.
    pub fn rank(&self) -> usize {
        self.image.len()
    }

    pub fn image(&self) -> &[usize] {
        &self.image
    }

    /// The cycles of the permutation, longest first.
    pub fn cycles(&self) -> &[Vec<usize>] {
        &self.cycles
    }

    /// The lengths of the cycles of the permutation.
    pub fn cycle_pattern(&self) -> Vec<usize> {
        self.cycles.iter().map(Vec::len).collect_vec()
    }

    /// Returns `true` if this permutation leaves every element in place.
    pub fn is_identity(&self) -> bool {
        self.image.iter().enumerate().all(|(i, img)| i == *img)
    }
}

// ---
// Mul
// ---
impl Mul<&'_ Permutation> for &Permutation {
    type Output = Option<Permutation>;

    /// Composes two permutations, with `rhs` acting first. Returns `None` if the ranks differ.
    fn mul(self, rhs: &Permutation) -> Self::Output {
        if self.rank() != rhs.rank() {
            return None;
        }
        Permutation::from_image(&rhs.image.iter().map(|&ri| self.image[ri]).collect_vec())
    }
}

impl Mul<Permutation> for Permutation {
    type Output = Option<Permutation>;

    fn mul(self, rhs: Permutation) -> Self::Output {
        &self * &rhs
    }
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.cycles
                .iter()
                .map(|cycle| format!("({})", cycle.iter().join(" ")))
                .join("")
        )
    }
}

/// The zero-one matrix $`O_t`$ describing how the translation with index `translation_index`
/// maps atomic sites onto one another.
///
/// Entry $`(j, k)`$ is one when site $`j`$ translated by $`t`$ lands on site $`k`$ modulo the
/// lattice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PermutationOperator {
    translation_index: usize,
    matrix: Array2<u8>,
}

impl PermutationOperator {
    /// The index of the translation this operator represents, in the order of the translation
    /// group.
    pub fn translation_index(&self) -> usize {
        self.translation_index
    }

    pub fn matrix(&self) -> &Array2<u8> {
        &self.matrix
    }

    /// The number of atomic sites.
    pub fn natoms(&self) -> usize {
        self.matrix.nrows()
    }

    /// The number of sites each site is mapped onto.
    pub fn row_sums(&self) -> Array1<usize> {
        self.matrix
            .map(|x| usize::from(*x))
            .sum_axis(Axis(1))
    }

    /// The number of sites mapped onto each site.
    pub fn column_sums(&self) -> Array1<usize> {
        self.matrix
            .map(|x| usize::from(*x))
            .sum_axis(Axis(0))
    }

    /// Returns `true` if every row and every column of the matrix contain exactly one entry.
    pub fn is_bijective(&self) -> bool {
        self.row_sums().iter().all(|s| *s == 1) && self.column_sums().iter().all(|s| *s == 1)
    }

    /// The site permutation represented by this operator, or `None` if the operator is not
    /// bijective.
    pub fn to_permutation(&self) -> Option<Permutation> {
        if !self.is_bijective() {
            return None;
        }
        let image = self
            .matrix
            .rows()
            .into_iter()
            .map(|row| row.iter().position(|x| *x == 1))
            .collect::<Option<Vec<_>>>()?;
        Permutation::from_image(&image)
    }
}

// =========
// Functions
// =========

/// The distance between a fractional displacement and its nearest lattice point.
fn distance_to_lattice(displacement: &[f64; 3]) -> f64 {
    displacement
        .iter()
        .map(|d| (d - d.round()).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Determines whether site `k` is the image of site `j` under translation `t`.
fn is_mapped(pos_j: ArrayView1<f64>, pos_k: ArrayView1<f64>, t: &[f64; 3], eps: f64) -> bool {
    let displacement = [0usize, 1, 2].map(|d| pos_k[d] - pos_j[d] - t[d]);
    distance_to_lattice(&displacement) < eps
}

/// Builds the site-permutation operators of a set of translations.
///
/// # Arguments
///
/// * `positions` - The fractional coordinates of the sites, one site per row.
/// * `translations` - The translations, in group order.
/// * `distance_threshold` - Sites closer than this to a lattice-translated image are identified.
/// * `check_mapping` - If `true`, every operator must map the sites one-to-one.
///
/// # Returns
///
/// One operator per translation. If `check_mapping` is set, a structural mismatch error naming
/// the first offending translation is returned when a site has zero or several images.
pub fn build_operators(
    positions: &Array2<f64>,
    translations: &[FractionalTranslation],
    distance_threshold: f64,
    check_mapping: bool,
) -> Result<Vec<PermutationOperator>, UnfoldingError> {
    if positions.ncols() != 3 {
        return Err(UnfoldingError::StructuralMismatch(format!(
            "atomic positions must have three fractional coordinates, but {} were found",
            positions.ncols()
        )));
    }
    let natoms = positions.nrows();
    translations
        .iter()
        .enumerate()
        .map(|(ti, translation)| {
            let t = translation.to_f64();
            let matrix = Array2::from_shape_fn((natoms, natoms), |(j, k)| {
                u8::from(is_mapped(
                    positions.row(j),
                    positions.row(k),
                    &t,
                    distance_threshold,
                ))
            });
            let operator = PermutationOperator {
                translation_index: ti,
                matrix,
            };
            if check_mapping && !operator.is_bijective() {
                return Err(UnfoldingError::StructuralMismatch(format!(
                    "the translation {translation:?} does not map the atomic sites one-to-one \
                    (row sums {}, column sums {})",
                    operator.row_sums(),
                    operator.column_sums()
                )));
            }
            log::debug!(
                "Translation {translation:?} maps {} of {natoms} sites.",
                operator.row_sums().iter().filter(|s| **s > 0).count()
            );
            Ok(operator)
        })
        .collect()
}
