//! Command-line interface of the unfolding program.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::group::FractionalTranslation;
use crate::io::format::unfold_output;

const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

const ABOUT: &str = "Unfold bands calculated by VASP onto the irreps of a translation subgroup \
of the supercell. Phase information must be present in the PROCAR file, which requires the \
bands to have been calculated with LORBIT = 12. Only the generators of the translation group \
need to be given; all distinct translations and all irreps are generated from them.";

/// Logs a nicely formatted heading to the `bandunfold-output` logger.
pub fn log_heading() {
    let version = if let Some(ver) = VERSION {
        format!("v{ver}")
    } else {
        "v unknown".to_string()
    };
    let bar = "─".repeat(101);
    unfold_output!("╭{bar}╮");
    unfold_output!("│{:^101}│", "");
    unfold_output!("│{:^101}│", "b a n d u n f o l d");
    unfold_output!("│{:^101}│", "");
    unfold_output!(
        "│{:^101}│",
        "Band-structure unfolding with translation projection operators"
    );
    unfold_output!("│{:^101}│", version);
    unfold_output!("│{:^101}│", "");
    unfold_output!("╰{bar}╯");
    unfold_output!("");
}

#[derive(Parser, Debug)]
#[command(author, version, about = ABOUT)]
pub struct Cli {
    /// POSCAR file of the supercell.
    #[arg(required_unless_present = "config")]
    pub poscar: Option<PathBuf>,

    /// PROCAR file of the supercell.
    #[arg(required_unless_present = "config")]
    pub procar: Option<PathBuf>,

    /// Fractional translation generator. No whitespaces are allowed between the components. SX,
    /// SY and SZ can each be either 0 or 1/n, where n is an integer. Up to three linearly
    /// independent generators can be specified.
    #[arg(long = "tgen", value_name = "SX,SY,SZ", action = ArgAction::Append)]
    pub tgen: Vec<FractionalTranslation>,

    /// Output prefix. Output is written to OUT.irrep.n, or to PROCAR.irrep.n if this is left
    /// unspecified.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Threshold for identifying two fractional positions when building the site permutations
    /// of the translations. It may need to be increased for irregular structures.
    #[arg(long, default_value_t = 1e-6)]
    pub eps: f64,

    /// Write out all irreps instead of only irrep 0 (the unit irrep).
    #[arg(long)]
    pub all_irreps: bool,

    /// Require every translation to map every atom onto exactly one other atom. This must not be
    /// enabled when vacancies or excess atoms are present.
    #[arg(long)]
    pub check_mapping: bool,

    /// YAML input file specifying the inputs and unfolding parameters. This replaces the
    /// positional inputs and the unfolding options.
    #[arg(
        short,
        long,
        conflicts_with_all = [
            "poscar",
            "procar",
            "tgen",
            "out",
            "eps",
            "all_irreps",
            "check_mapping"
        ]
    )]
    pub config: Option<PathBuf>,

    /// File to which the output is also written.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Increase the verbosity of diagnostic messages. May be repeated.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
