//! Reader for VASP `POSCAR` structure files.

use std::fs;
use std::path::Path;

use anyhow::{self, bail, ensure, format_err, Context};
use log;
use nalgebra::Matrix3;
use ndarray::Array2;

use crate::auxiliary::crystal::Crystal;

#[cfg(test)]
#[path = "poscar_tests.rs"]
mod poscar_tests;

/// Reads a crystal structure from a `POSCAR` file.
///
/// # Arguments
///
/// * `path` - The path to the `POSCAR` file.
///
/// # Returns
///
/// The crystal structure with fractional site positions.
pub fn read_poscar<P: AsRef<Path>>(path: P) -> Result<Crystal, anyhow::Error> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Unable to open `{}` for reading.", path.display()))?;
    parse_poscar(&contents).with_context(|| {
        format!(
            "Unable to parse the POSCAR file `{}`. Please check that it is formatted properly.",
            path.display()
        )
    })
}

/// Parses the contents of a `POSCAR` file.
///
/// The scaling factor multiplies the lattice vectors and any Cartesian coordinates. A negative
/// scaling factor is interpreted as the target cell volume. Blank lines are ignored, so species
/// names must be present on the sixth non-blank line. An optional `Selective dynamics` line before
/// the coordinate-mode line is skipped.
pub fn parse_poscar(contents: &str) -> Result<Crystal, anyhow::Error> {
    let mut lines = contents.lines().filter(|line| !line.trim().is_empty());
    let mut next_line = |what: &str| {
        lines
            .next()
            .ok_or_else(|| format_err!("Unexpected end of file while reading the {what}."))
    };

    next_line("comment line")?;
    let scale = next_line("scaling factor")?
        .split_whitespace()
        .next()
        .ok_or_else(|| format_err!("The scaling factor is missing."))?
        .parse::<f64>()
        .map_err(|err| format_err!("Unable to parse the scaling factor: {err}."))?;

    let mut cell = Matrix3::<f64>::zeros();
    for i in 0..3 {
        let row = parse_floats(next_line("lattice vectors")?, 3)
            .with_context(|| format!("Unable to parse lattice vector {}.", i + 1))?;
        cell.row_mut(i).copy_from_slice(&row);
    }
    let scale = if scale < 0.0 {
        let volume = cell.determinant().abs();
        ensure!(volume > 0.0, "The unit-cell vectors are linearly dependent.");
        (-scale / volume).cbrt()
    } else {
        scale
    };
    cell *= scale;

    let species = next_line("species names")?
        .split_whitespace()
        .map(str::to_string)
        .collect::<Vec<_>>();
    if species.iter().all(|s| s.parse::<usize>().is_ok()) {
        bail!(
            "The species-name line is missing; only POSCAR files with species names are \
            supported."
        );
    }
    let counts = next_line("species counts")?
        .split_whitespace()
        .map(|c| {
            c.parse::<usize>()
                .map_err(|err| format_err!("Unable to parse the species count `{c}`: {err}."))
        })
        .collect::<Result<Vec<_>, _>>()?;
    ensure!(
        counts.len() == species.len(),
        "{} species names but {} species counts were found.",
        species.len(),
        counts.len()
    );
    let symbols = species
        .iter()
        .zip(counts.iter())
        .flat_map(|(s, c)| std::iter::repeat(s.clone()).take(*c))
        .collect::<Vec<_>>();
    let natoms = symbols.len();

    let mut mode = next_line("coordinate mode")?.trim();
    if mode.starts_with(['s', 'S']) {
        log::debug!("Skipping the selective-dynamics line.");
        mode = next_line("coordinate mode")?.trim();
    }
    let cartesian = match mode.chars().next() {
        Some('c' | 'C' | 'k' | 'K') => true,
        Some('d' | 'D') => false,
        _ => bail!("`{mode}` is an unknown POSCAR coordinate mode."),
    };

    let mut positions = Array2::<f64>::zeros((natoms, 3));
    for (i, mut row) in positions.rows_mut().into_iter().enumerate() {
        let coords = parse_floats(next_line("site coordinates")?, 3)
            .with_context(|| format!("Unable to parse the coordinates of site {}.", i + 1))?;
        row.iter_mut().zip(coords.iter()).for_each(|(r, c)| *r = *c);
    }

    if cartesian {
        positions *= scale;
        Crystal::from_cartesian(cell, &positions, symbols)
    } else {
        Crystal::builder()
            .cell(cell)
            .fractional_positions(positions)
            .symbols(symbols)
            .build()
            .map_err(|err| format_err!(err))
    }
}

/// Parses the first `n` whitespace-separated floats on a line, ignoring anything after them.
fn parse_floats(line: &str, n: usize) -> Result<Vec<f64>, anyhow::Error> {
    let values = line
        .split_whitespace()
        .take(n)
        .map(|x| {
            x.parse::<f64>()
                .map_err(|err| format_err!("Unable to parse `{x}` as a number: {err}."))
        })
        .collect::<Result<Vec<_>, _>>()?;
    ensure!(
        values.len() == n,
        "Expected {n} numbers but found {} in `{}`.",
        values.len(),
        line.trim()
    );
    Ok(values)
}
