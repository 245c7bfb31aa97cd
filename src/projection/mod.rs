//! Projection operators onto the irreducible representations of a translation group.

use std::fmt;

use ndarray::Array2;
use num::Complex;

use crate::chartab::CharacterTable;
use crate::error::UnfoldingError;
use crate::permutation::PermutationOperator;


/// Trait to facilitate the application of a translation projection operator.
pub trait Projectable {
    /// The type of the result of the projection.
    type Projected;

    /// Projects onto the symmetry subspace of the irrep of `projector`.
    ///
    /// # Arguments
    ///
    /// * `projector` - The projector of the target irrep.
    /// * `regulariser` - A small positive number guarding magnitude ratios against division by
    /// zero.
    fn project_onto(
        &self,
        projector: &TranslationProjector,
        regulariser: f64,
    ) -> Result<Self::Projected, UnfoldingError>;
}

/// The projection matrix onto one irrep of a translation group, acting on the space of atomic
/// orbitals.
///
/// Rows and columns are indexed by $`a \cdot n_{\mathrm{orb}} + l`$ for atom $`a`$ and orbital
/// $`l`$.
#[derive(Clone, Debug)]
pub struct TranslationProjector {
    irrep: usize,
    matrix: Array2<Complex<f64>>,
}

impl TranslationProjector {
    /// The index of the irrep onto which this operator projects.
    pub fn irrep(&self) -> usize {
        self.irrep
    }

    pub fn matrix(&self) -> &Array2<Complex<f64>> {
        &self.matrix
    }

    /// The dimension of the atomic-orbital space.
    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    /// The trace of the projector, *i.e.* the number of atomic-orbital functions that the irrep
    /// accounts for.
    pub fn trace(&self) -> Complex<f64> {
        self.matrix.diag().sum()
    }
}

impl fmt::Display for TranslationProjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tr = self.trace();
        write!(
            f,
            "Projector {} ({}×{}): trace = {:+.6}{:+.6}i",
            self.irrep,
            self.dim(),
            self.dim(),
            tr.re,
            tr.im
        )
    }
}

/// Builds one projector per irrep from the characters of a translation group and the
/// site-permutation operators of its elements.
///
/// The projector of irrep $`i`$ is
/// ```math
///   \hat{P}_i = \frac{1}{N} \sum_t \chi_i(t)\, O_t \otimes I_{n_{\mathrm{orb}}},
/// ```
/// where the characters are used without complex conjugation.
///
/// # Arguments
///
/// * `chartab` - The character table of the translation group.
/// * `operators` - The permutation operators, one per group element in group order.
/// * `norbitals` - The number of orbitals on each atomic site.
///
/// # Returns
///
/// The projectors in irrep order, or a structural mismatch error if the operators do not match
/// the group or one another.
pub fn build_projectors(
    chartab: &CharacterTable,
    operators: &[PermutationOperator],
    norbitals: usize,
) -> Result<Vec<TranslationProjector>, UnfoldingError> {
    let order = chartab.order();
    if operators.len() != order {
        return Err(UnfoldingError::StructuralMismatch(format!(
            "{} permutation operators were given for a translation group of order {order}",
            operators.len()
        )));
    }
    let natoms = operators.first().map(PermutationOperator::natoms).unwrap_or(0);
    if let Some(op) = operators.iter().find(|op| op.natoms() != natoms) {
        return Err(UnfoldingError::StructuralMismatch(format!(
            "the permutation operator of translation {} acts on {} sites instead of {natoms}",
            op.translation_index(),
            op.natoms()
        )));
    }
    if let Some(op) = operators.iter().find(|op| op.translation_index() >= order) {
        return Err(UnfoldingError::StructuralMismatch(format!(
            "the permutation operator of translation {} lies outside a group of order {order}",
            op.translation_index()
        )));
    }
    if norbitals == 0 {
        return Err(UnfoldingError::StructuralMismatch(
            "there must be at least one orbital per atomic site".to_string(),
        ));
    }

    let chars = chartab.complex_matrix();
    let scale = 1.0 / order as f64;
    let dim = natoms * norbitals;
    let projectors = (0..order)
        .map(|irrep| {
            let mut atom_proj = Array2::<Complex<f64>>::zeros((natoms, natoms));
            for op in operators {
                let chr = chars[(irrep, op.translation_index())];
                atom_proj.zip_mut_with(op.matrix(), |p, o| {
                    if *o != 0 {
                        *p += chr * f64::from(*o);
                    }
                });
            }
            atom_proj.mapv_inplace(|p| p * scale);

            // Kronecker product with the identity on the orbitals of each site.
            let matrix = Array2::from_shape_fn((dim, dim), |(r, c)| {
                if r % norbitals == c % norbitals {
                    atom_proj[(r / norbitals, c / norbitals)]
                } else {
                    Complex::new(0.0, 0.0)
                }
            });
            TranslationProjector { irrep, matrix }
        })
        .collect();
    Ok(projectors)
}
