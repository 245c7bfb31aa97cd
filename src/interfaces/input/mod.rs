//! Unfolding inputs from the command line or from YAML input files.

use std::path::{Path, PathBuf};

use anyhow::{self, format_err, Context};
use serde::{Deserialize, Serialize};

use crate::drivers::unfolding::{UnfoldingDriver, UnfoldingParams};
use crate::drivers::UnfoldDriver;
use crate::interfaces::cli::Cli;
use crate::interfaces::vasp::{irrep_output_path, read_poscar, read_procar, write_procar};
use crate::interfaces::InputHandle;
use crate::io::format::{log_subtitle, unfold_error, unfold_output};
use crate::io::read_unfold_yaml;

#[cfg(test)]
#[path = "input_tests.rs"]
mod input_tests;

/// A structure containing unfolding inputs which can be serialised into and deserialised from a
/// YAML input file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Input {
    /// Path to the `POSCAR` file of the supercell.
    pub poscar: PathBuf,

    /// Path to the `PROCAR` file of the supercell. This must contain orbital phases.
    pub procar: PathBuf,

    /// Prefix of the output files. The band structure unfolded onto irrep `n` is written to
    /// `<output>.irrep.<n>`.
    ///
    /// If not specified, the path of the `PROCAR` file is used.
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Parameters for the unfolding.
    ///
    /// If not specified, the default parameters, which unfold onto the trivial group, are used.
    #[serde(default)]
    pub parameters: UnfoldingParams,
}

impl Default for Input {
    fn default() -> Self {
        Input {
            poscar: PathBuf::from("POSCAR"),
            procar: PathBuf::from("PROCAR"),
            output: None,
            parameters: UnfoldingParams::default(),
        }
    }
}

impl Input {
    /// Constructs the input from parsed command-line arguments. If a configuration file is
    /// given, the input is read from it instead.
    pub fn from_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        if let Some(config) = cli.config.as_ref() {
            return read_unfold_yaml::<Input, _>(config).with_context(|| {
                format!("Unable to read the input file `{}`", config.display())
            });
        }

        let poscar = cli
            .poscar
            .clone()
            .ok_or_else(|| format_err!("No POSCAR file specified."))?;
        let procar = cli
            .procar
            .clone()
            .ok_or_else(|| format_err!("No PROCAR file specified."))?;
        let parameters = UnfoldingParams::builder()
            .translation_generators(&cli.tgen)
            .distance_threshold(cli.eps)
            .all_irreps(cli.all_irreps)
            .check_mapping(cli.check_mapping)
            .build()
            .with_context(|| "Invalid unfolding options")?;
        Ok(Input {
            poscar,
            procar,
            output: cli.out.clone(),
            parameters,
        })
    }

    /// The prefix of the output files.
    pub fn output_prefix(&self) -> &Path {
        self.output.as_deref().unwrap_or(&self.procar)
    }

    /// Reads the structure and band files, unfolds the band structure, and writes one `PROCAR`
    /// file per unfolded irrep.
    fn unfold(&self) -> Result<Vec<PathBuf>, anyhow::Error> {
        let crystal = read_poscar(&self.poscar).with_context(|| {
            "Unable to parse the input POSCAR file. Please check if the file exists and is \
            formatted properly"
        })?;
        let band_structure = read_procar(&self.procar).with_context(|| {
            "Unable to parse the input PROCAR file. Please check if it is formatted properly: \
            adjacent k-point coordinates may have merged into one another, and fields filled \
            with asterisks indicate values too large for their columns"
        })?;

        let mut unfolding_driver = UnfoldingDriver::builder()
            .parameters(&self.parameters)
            .crystal(&crystal)
            .band_structure(&band_structure)
            .build()
            .with_context(|| "Unable to construct an unfolding driver")?;
        unfolding_driver
            .run()
            .with_context(|| "Unable to run the unfolding driver successfully")?;
        let result = unfolding_driver
            .result()
            .with_context(|| "Unable to retrieve the unfolding result")?;

        log_subtitle("Output files");
        unfold_output!("");
        let paths = result
            .unfolded
            .iter()
            .map(|(irrep, unfolded)| {
                let path = irrep_output_path(self.output_prefix(), *irrep);
                write_procar(&path, unfolded).with_context(|| {
                    format!(
                        "Unable to write the band structure of irrep {irrep} to `{}`",
                        path.display()
                    )
                })?;
                unfold_output!("Irrep {irrep} written to `{}`.", path.display());
                Ok(path)
            })
            .collect::<Result<Vec<_>, anyhow::Error>>()?;
        unfold_output!("");
        Ok(paths)
    }
}

impl InputHandle for Input {
    fn handle(&self) -> Result<(), anyhow::Error> {
        self.unfold().map(|_| ()).map_err(|err| {
            unfold_error!("{err:#}");
            err
        })
    }
}
