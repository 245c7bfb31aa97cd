//! Driver for band-structure unfolding by translation projection.

use std::fmt;

use anyhow::{self, format_err};
use derive_builder::Builder;
use itertools::Itertools;
use log;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::auxiliary::crystal::Crystal;
use crate::drivers::UnfoldDriver;
use crate::error::UnfoldingError;
use crate::group::{FractionalTranslation, TranslationGroup, MAX_GENERATORS};
use crate::io::format::{
    log_macsec_begin, log_macsec_end, log_subtitle, log_title, nice_bool, unfold_output,
    unfold_warn, UnfoldOutput,
};
use crate::permutation::build_operators;
use crate::projection::{build_projectors, Projectable};
use crate::target::band_structure::BandStructure;

#[cfg(test)]
#[path = "unfolding_tests.rs"]
mod unfolding_tests;

// ==================
// Struct definitions
// ==================

// ----------
// Parameters
// ----------

/// A structure containing control parameters for band-structure unfolding.
#[derive(Clone, Builder, Debug, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct UnfoldingParams {
    /// The generators of the translation group, at most three. Each is written as `SX,SY,SZ`
    /// with every component either `0` or `1/n`. No generators give the trivial group.
    #[builder(setter(custom), default = "Vec::new()")]
    pub translation_generators: Vec<FractionalTranslation>,

    /// Threshold for identifying an atomic site with a translated image of another.
    #[builder(default = "1e-6")]
    pub distance_threshold: f64,

    /// Boolean indicating if every translation must permute the atomic sites one-to-one.
    #[builder(default = "false")]
    pub check_mapping: bool,

    /// Boolean indicating if all irreps are to be unfolded. Otherwise only the totally
    /// symmetric irrep is.
    #[builder(default = "false")]
    pub all_irreps: bool,

    /// Small positive number added to phase magnitudes when rescaling orbital weights.
    #[builder(default = "1e-4")]
    pub phase_regulariser: f64,
}

impl UnfoldingParamsBuilder {
    pub fn translation_generators(&mut self, generators: &[FractionalTranslation]) -> &mut Self {
        self.translation_generators = Some(generators.to_vec());
        self
    }

    fn validate(&self) -> Result<(), String> {
        if let Some(generators) = self.translation_generators.as_ref() {
            if generators.len() > MAX_GENERATORS {
                return Err(format!(
                    "At most {MAX_GENERATORS} translation generators can be specified, but {} \
                    were given.",
                    generators.len()
                ));
            }
        }
        if let Some(thresh) = self.distance_threshold {
            if !(thresh > 0.0) {
                return Err(format!("Invalid distance threshold: {thresh:.3e}."));
            }
        }
        if let Some(reg) = self.phase_regulariser {
            if !(reg > 0.0) {
                return Err(format!("Invalid phase regulariser: {reg:.3e}."));
            }
        }
        Ok(())
    }
}

impl UnfoldingParams {
    /// Returns a builder to construct a [`UnfoldingParams`] structure.
    pub fn builder() -> UnfoldingParamsBuilder {
        UnfoldingParamsBuilder::default()
    }
}

impl Default for UnfoldingParams {
    fn default() -> Self {
        Self::builder()
            .build()
            .expect("Unable to construct a default `UnfoldingParams`.")
    }
}

impl fmt::Display for UnfoldingParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Translation generators: {}",
            if self.translation_generators.is_empty() {
                "none (trivial group)".to_string()
            } else {
                self.translation_generators
                    .iter()
                    .map(|g| format!("{g:?}"))
                    .join(", ")
            }
        )?;
        writeln!(f, "Distance threshold: {:.3e}", self.distance_threshold)?;
        writeln!(f, "Phase regulariser: {:.3e}", self.phase_regulariser)?;
        writeln!(
            f,
            "Require one-to-one site mappings: {}",
            nice_bool(self.check_mapping)
        )?;
        writeln!(f, "Unfold all irreps: {}", nice_bool(self.all_irreps))?;
        writeln!(f)?;
        Ok(())
    }
}

// ------
// Result
// ------

/// A structure to contain band-structure unfolding results.
#[derive(Clone, Builder)]
pub struct UnfoldingResult<'a> {
    /// The control parameters used to obtain this set of results.
    pub parameters: &'a UnfoldingParams,

    /// The translation group used for the unfolding.
    pub group: TranslationGroup,

    /// The unfolded band structures, each tagged with the index of its irrep, in irrep order.
    pub unfolded: Vec<(usize, BandStructure)>,
}

impl<'a> UnfoldingResult<'a> {
    /// Returns a builder to construct a [`UnfoldingResult`] structure.
    fn builder() -> UnfoldingResultBuilder<'a> {
        UnfoldingResultBuilder::default()
    }

    /// Returns the band structure unfolded onto irrep `irrep`, if it has been computed.
    pub fn irrep(&self, irrep: usize) -> Option<&BandStructure> {
        self.unfolded
            .iter()
            .find_map(|(i, bs)| if *i == irrep { Some(bs) } else { None })
    }
}

impl fmt::Display for UnfoldingResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chartab = self.group.character_table();
        let symbols = self
            .unfolded
            .iter()
            .map(|(irrep, _)| chartab.irrep_symbol(*irrep))
            .collect_vec();
        let width = symbols
            .iter()
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(5)
            .max(5);
        writeln!(f, "{:>width$}  {:>16}", "Irrep", "Total weight")?;
        writeln!(f, "{}", "┈".repeat(width + 18))?;
        for (symbol, (_, bs)) in symbols.iter().zip(self.unfolded.iter()) {
            writeln!(f, "{symbol:>width$}  {:>16.6}", bs.weights().sum())?;
        }
        writeln!(f, "{}", "┈".repeat(width + 18))?;
        Ok(())
    }
}

// ------
// Driver
// ------

/// A driver for band-structure unfolding.
#[derive(Clone, Builder)]
pub struct UnfoldingDriver<'a> {
    /// The control parameters for unfolding.
    parameters: &'a UnfoldingParams,

    /// The supercell structure whose sites are permuted by the translations.
    crystal: &'a Crystal,

    /// The folded band structure, which must carry orbital phases.
    band_structure: &'a BandStructure,

    /// The result of the unfolding.
    #[builder(setter(skip), default = "None")]
    result: Option<UnfoldingResult<'a>>,
}

impl<'a> UnfoldingDriver<'a> {
    /// Returns a builder to construct a [`UnfoldingDriver`] structure.
    pub fn builder() -> UnfoldingDriverBuilder<'a> {
        UnfoldingDriverBuilder::default()
    }

    /// Executes band-structure unfolding.
    fn unfold(&mut self) -> Result<(), anyhow::Error> {
        log_title("Band-Structure Unfolding");
        unfold_output!("");
        let params = self.parameters;
        params.log_output_display();

        let crystal = self.crystal;
        let bs = self.band_structure;
        log_subtitle("Supercell");
        unfold_output!("");
        crystal.log_output_display();
        unfold_output!("");
        bs.log_output_display();
        unfold_output!("");

        if crystal.natoms() != bs.nions() {
            return Err(UnfoldingError::StructuralMismatch(format!(
                "the structure has {} atomic sites but the band data describe {} ions; are the \
                structure and band files for the same crystal?",
                crystal.natoms(),
                bs.nions()
            ))
            .into());
        }
        if !bs.has_phases() {
            return Err(UnfoldingError::MissingData(
                "orbital phases are required for unfolding; rerun VASP with `LORBIT = 12` to \
                write them"
                    .to_string(),
            )
            .into());
        }

        let group = TranslationGroup::from_generators(&params.translation_generators)?;
        log_subtitle("Translation group");
        unfold_output!("");
        group.log_output_display();
        unfold_output!("Character table:");
        group.character_table().log_output_display();
        unfold_output!("");

        let operators = build_operators(
            crystal.fractional_positions(),
            group.translations(),
            params.distance_threshold,
            params.check_mapping,
        )?;
        log_subtitle("Site permutations");
        unfold_output!("");
        let width = group.order().to_string().chars().count();
        for (operator, translation) in operators.iter().zip(group.translations().iter()) {
            let ti = operator.translation_index();
            match operator.to_permutation() {
                Some(perm) => {
                    unfold_output!(
                        "T{ti:<width$} = {translation:?}: {perm} [{}]",
                        perm.cycle_pattern().iter().join(", ")
                    );
                }
                None => {
                    unfold_warn!(
                        "T{ti:<width$} = {translation:?} does not map the atomic sites \
                        one-to-one (row sums: {}). Unfolded weights may be unreliable.",
                        operator.row_sums().iter().join(", ")
                    );
                }
            }
        }
        unfold_output!("");

        let projectors = build_projectors(group.character_table(), &operators, bs.norbitals())?;
        log_subtitle("Projectors");
        unfold_output!("");
        for projector in projectors.iter() {
            unfold_output!(
                "{} [{}]",
                projector,
                group.character_table().irrep_symbol(projector.irrep())
            );
        }
        unfold_output!("");

        let nirreps = if params.all_irreps {
            projectors.len()
        } else {
            1
        };
        log_macsec_begin("Projection");
        unfold_output!("");
        log::debug!("Projecting the band structure onto {nirreps} irrep(s).");
        let unfolded = projectors[..nirreps]
            .par_iter()
            .map(|projector| {
                bs.project_onto(projector, params.phase_regulariser)
                    .map(|projected| (projector.irrep(), projected))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let result = UnfoldingResult::builder()
            .parameters(params)
            .group(group)
            .unfolded(unfolded)
            .build()?;
        result.log_output_display();
        unfold_output!("");
        log_macsec_end("Projection");
        unfold_output!("");

        self.result = Some(result);
        Ok(())
    }
}

impl<'a> UnfoldDriver for UnfoldingDriver<'a> {
    type Params = UnfoldingParams;

    type Outcome = UnfoldingResult<'a>;

    fn result(&self) -> Result<&Self::Outcome, anyhow::Error> {
        self.result
            .as_ref()
            .ok_or_else(|| format_err!("No unfolding results found."))
    }

    fn run(&mut self) -> Result<(), anyhow::Error> {
        self.unfold()
    }
}
