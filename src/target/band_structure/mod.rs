//! Orbital-resolved electronic band structures.

use std::fmt;

use derive_builder::Builder;
use itertools::Itertools;
use ndarray::{Array1, Array2, Array3, Array4, Array5};
use num::Complex;


mod band_structure_projection;

// ==================
// Struct definitions
// ==================

/// A structure to manage an orbital-resolved band structure sampled over a set of k-points.
///
/// Orbital contributions are indexed along a combined site-orbital axis of length
/// $`n_{\mathrm{ions}} \times n_{\mathrm{orb}}`$, running over orbitals fastest.
#[derive(Builder, Clone, Debug)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct BandStructure {
    /// The labels of the orbitals on every site (`s`, `py`, `pz`, `px`, ...).
    orbitals: Vec<String>,

    /// The k-point coordinates, one k-point per row.
    kpoints: Array2<f64>,

    /// The k-point weights.
    kweights: Array1<f64>,

    /// The band energies, indexed by `[k-point, band, spin]`.
    energies: Array3<f64>,

    /// The band occupancies, indexed by `[k-point, band, spin]`.
    occupancies: Array3<f64>,

    /// The absolute orbital weights, indexed by `[k-point, site-orbital, band, component, spin]`.
    /// There is one component for collinear calculations and four (total, $`m_x`$, $`m_y`$,
    /// $`m_z`$) for non-collinear ones.
    weights: Array5<f64>,

    /// The complex orbital phases, indexed by `[k-point, site-orbital, band, spin]`, if
    /// available.
    #[builder(default = "None")]
    phases: Option<Array4<Complex<f64>>>,
}

impl BandStructureBuilder {
    fn validate(&self) -> Result<(), String> {
        let orbitals = self
            .orbitals
            .as_ref()
            .ok_or("No orbital labels found.".to_string())?;
        let kpoints = self
            .kpoints
            .as_ref()
            .ok_or("No k-points found.".to_string())?;
        let kweights = self
            .kweights
            .as_ref()
            .ok_or("No k-point weights found.".to_string())?;
        let energies = self
            .energies
            .as_ref()
            .ok_or("No band energies found.".to_string())?;
        let occupancies = self
            .occupancies
            .as_ref()
            .ok_or("No band occupancies found.".to_string())?;
        let weights = self
            .weights
            .as_ref()
            .ok_or("No orbital weights found.".to_string())?;

        let norb = orbitals.len();
        if norb == 0 {
            return Err("There must be at least one orbital label.".to_string());
        }
        let npoints = kpoints.nrows();
        if kpoints.ncols() != 3 {
            return Err(format!(
                "K-points must have three coordinates, but {} were found.",
                kpoints.ncols()
            ));
        }
        if kweights.len() != npoints {
            return Err(format!(
                "Mismatched numbers of k-points ({npoints}) and k-point weights ({}).",
                kweights.len()
            ));
        }
        let (e_npoints, nbands, nspin) = energies.dim();
        if e_npoints != npoints {
            return Err(format!(
                "Band energies are given for {e_npoints} k-points instead of {npoints}."
            ));
        }
        if !(1..=2).contains(&nspin) {
            return Err(format!("Unsupported number of spin channels: {nspin}."));
        }
        if occupancies.dim() != energies.dim() {
            return Err(format!(
                "Band occupancies have shape {:?}, but band energies have shape {:?}.",
                occupancies.shape(),
                energies.shape()
            ));
        }
        let (w_npoints, nsiteorbs, w_nbands, ndim, w_nspin) = weights.dim();
        if (w_npoints, w_nbands, w_nspin) != (npoints, nbands, nspin) {
            return Err(format!(
                "Orbital weights have shape {:?}, inconsistent with {npoints} k-points, {nbands} \
                bands and {nspin} spin channels.",
                weights.shape()
            ));
        }
        if nsiteorbs % norb != 0 {
            return Err(format!(
                "The site-orbital dimension {nsiteorbs} is not a multiple of the number of \
                orbitals {norb}."
            ));
        }
        if ndim != 1 && ndim != 4 {
            return Err(format!(
                "Orbital weights must have one or four components, but {ndim} were found."
            ));
        }
        if let Some(Some(phases)) = self.phases.as_ref() {
            if phases.dim() != (npoints, nsiteorbs, nbands, nspin) {
                return Err(format!(
                    "Orbital phases have shape {:?}, but orbital weights have shape {:?}.",
                    phases.shape(),
                    weights.shape()
                ));
            }
        }
        Ok(())
    }
}

impl BandStructure {
    /// Returns a builder to construct a new [`BandStructure`].
    pub fn builder() -> BandStructureBuilder {
        BandStructureBuilder::default()
    }

    pub fn orbitals(&self) -> &[String] {
        &self.orbitals
    }

    pub fn kpoints(&self) -> &Array2<f64> {
        &self.kpoints
    }

    pub fn kweights(&self) -> &Array1<f64> {
        &self.kweights
    }

    pub fn energies(&self) -> &Array3<f64> {
        &self.energies
    }

    pub fn occupancies(&self) -> &Array3<f64> {
        &self.occupancies
    }

    pub fn weights(&self) -> &Array5<f64> {
        &self.weights
    }

    pub fn phases(&self) -> Option<&Array4<Complex<f64>>> {
        self.phases.as_ref()
    }

    pub fn has_phases(&self) -> bool {
        self.phases.is_some()
    }

    /// The number of k-points.
    pub fn npoints(&self) -> usize {
        self.kpoints.nrows()
    }

    /// The number of bands.
    pub fn nbands(&self) -> usize {
        self.energies.dim().1
    }

    /// The number of spin channels.
    pub fn nspin(&self) -> usize {
        self.energies.dim().2
    }

    /// The number of orbitals on each site.
    pub fn norbitals(&self) -> usize {
        self.orbitals.len()
    }

    /// The number of sites.
    pub fn nions(&self) -> usize {
        self.weights.dim().1 / self.norbitals()
    }

    /// The number of components of the absolute orbital weights.
    pub fn ndim(&self) -> usize {
        self.weights.dim().3
    }
}

impl fmt::Display for BandStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Band structure: {} k-point{}, {} band{}, {} spin channel{}",
            self.npoints(),
            if self.npoints() == 1 { "" } else { "s" },
            self.nbands(),
            if self.nbands() == 1 { "" } else { "s" },
            self.nspin(),
            if self.nspin() == 1 { "" } else { "s" },
        )?;
        writeln!(
            f,
            "  {} site{} × {} orbital{} ({})",
            self.nions(),
            if self.nions() == 1 { "" } else { "s" },
            self.norbitals(),
            if self.norbitals() == 1 { "" } else { "s" },
            self.orbitals.iter().join(", ")
        )?;
        writeln!(
            f,
            "  Orbital weights: {}",
            if self.ndim() == 1 {
                "collinear"
            } else {
                "non-collinear"
            }
        )?;
        writeln!(
            f,
            "  Orbital phases: {}",
            if self.has_phases() {
                "present"
            } else {
                "absent"
            }
        )
    }
}
