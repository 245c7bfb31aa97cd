//! Implementation of translation projection for band structures.

use ndarray::{s, Array4, Axis, Zip};
use num::Complex;

use crate::error::UnfoldingError;
use crate::projection::{Projectable, TranslationProjector};

use super::BandStructure;

impl Projectable for BandStructure {
    type Projected = BandStructure;

    /// Unfolds this band structure onto the irrep of `projector`.
    ///
    /// The projector acts on the site-orbital axis of the orbital phases at every k-point, band
    /// and spin channel. Every component of the absolute orbital weights is then rescaled by
    /// $`|\tilde{c}| / (|c| + \delta)`$, where $`c`$ and $`\tilde{c}`$ are the
    /// original and projected phases and $`\delta`$ is `regulariser`.
    ///
    /// # Errors
    ///
    /// Errors if this band structure has no orbital phases, if the dimension of the projector
    /// differs from the site-orbital dimension of the phases, or if `regulariser` is not
    /// positive.
    fn project_onto(
        &self,
        projector: &TranslationProjector,
        regulariser: f64,
    ) -> Result<Self::Projected, UnfoldingError> {
        let phases = self.phases.as_ref().ok_or_else(|| {
            UnfoldingError::MissingData(
                "orbital phases are required for unfolding, but the band structure has none"
                    .to_string(),
            )
        })?;
        if !(regulariser > 0.0) {
            return Err(UnfoldingError::Configuration(format!(
                "the phase regulariser must be positive, but {regulariser} was given"
            )));
        }
        let (npoints, nsiteorbs, _, nspin) = phases.dim();
        if projector.dim() != nsiteorbs {
            return Err(UnfoldingError::StructuralMismatch(format!(
                "projector {} acts on {} site orbitals, but the band structure has {nsiteorbs} \
                ({} sites × {} orbitals); the structure and the band data do not describe the \
                same system",
                projector.irrep(),
                projector.dim(),
                self.nions(),
                self.norbitals()
            )));
        }

        let mut unfolded = Array4::<Complex<f64>>::zeros(phases.raw_dim());
        for ispin in 0..nspin {
            for ipoint in 0..npoints {
                let folded = phases.slice(s![ipoint, .., .., ispin]);
                unfolded
                    .slice_mut(s![ipoint, .., .., ispin])
                    .assign(&projector.matrix().dot(&folded));
            }
        }

        let ratio = Zip::from(&unfolded)
            .and(phases)
            .map_collect(|u, c| u.norm() / (c.norm() + regulariser));
        let mut weights = self.weights.clone();
        for mut component in weights.axis_iter_mut(Axis(3)) {
            component *= &ratio;
        }

        Ok(BandStructure {
            orbitals: self.orbitals.clone(),
            kpoints: self.kpoints.clone(),
            kweights: self.kweights.clone(),
            energies: self.energies.clone(),
            occupancies: self.occupancies.clone(),
            weights,
            phases: Some(unfolded),
        })
    }
}
