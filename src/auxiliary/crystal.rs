//! Periodic crystal structures described in fractional coordinates.

use std::fmt;

use anyhow::format_err;
use derive_builder::Builder;
use nalgebra::{Matrix3, RowVector3};
use ndarray::{Array2, ArrayView1};

#[cfg(test)]
#[path = "crystal_tests.rs"]
mod crystal_tests;

/// A structure to manage a crystal structure: its unit cell and the fractional positions of its
/// atomic sites.
#[derive(Builder, Clone, Debug)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Crystal {
    /// The unit-cell vectors, stored as rows.
    cell: Matrix3<f64>,

    /// The fractional coordinates of the atomic sites, one site per row.
    fractional_positions: Array2<f64>,

    /// The chemical symbol of every site. These are carried through for output fidelity only.
    symbols: Vec<String>,
}

impl CrystalBuilder {
    fn validate(&self) -> Result<(), String> {
        let cell = self.cell.as_ref().ok_or("No unit cell found.".to_string())?;
        let positions = self
            .fractional_positions
            .as_ref()
            .ok_or("No fractional positions found.".to_string())?;
        let symbols = self
            .symbols
            .as_ref()
            .ok_or("No chemical symbols found.".to_string())?;
        if approx::abs_diff_eq!(cell.determinant(), 0.0, epsilon = 1e-12) {
            return Err("The unit-cell vectors are linearly dependent.".to_string());
        }
        if positions.ncols() != 3 {
            return Err(format!(
                "Fractional positions must have three columns, but {} were found.",
                positions.ncols()
            ));
        }
        if positions.nrows() != symbols.len() {
            return Err(format!(
                "Mismatched numbers of positions ({}) and chemical symbols ({}).",
                positions.nrows(),
                symbols.len()
            ));
        }
        Ok(())
    }
}

impl Crystal {
    /// Returns a builder to construct a new [`Crystal`].
    pub fn builder() -> CrystalBuilder {
        CrystalBuilder::default()
    }

    /// Constructs a crystal from Cartesian site coordinates.
    ///
    /// # Arguments
    ///
    /// * `cell` - The unit-cell vectors as rows.
    /// * `cartesian_positions` - The Cartesian coordinates of the sites, one site per row, in the
    /// same length unit as `cell`.
    /// * `symbols` - The chemical symbols of the sites.
    ///
    /// # Returns
    ///
    /// The crystal with its positions converted to fractional coordinates.
    pub fn from_cartesian(
        cell: Matrix3<f64>,
        cartesian_positions: &Array2<f64>,
        symbols: Vec<String>,
    ) -> Result<Self, anyhow::Error> {
        let cell_inv = cell
            .try_inverse()
            .ok_or_else(|| format_err!("The unit cell is singular and cannot be inverted."))?;
        let mut fractional_positions = Array2::<f64>::zeros(cartesian_positions.raw_dim());
        for (cart, mut frac) in cartesian_positions
            .rows()
            .into_iter()
            .zip(fractional_positions.rows_mut())
        {
            let r = RowVector3::new(cart[0], cart[1], cart[2]) * cell_inv;
            frac.iter_mut().zip(r.iter()).for_each(|(f, x)| *f = *x);
        }
        Self::builder()
            .cell(cell)
            .fractional_positions(fractional_positions)
            .symbols(symbols)
            .build()
            .map_err(|err| format_err!(err))
    }

    /// The unit-cell vectors as rows.
    pub fn cell(&self) -> &Matrix3<f64> {
        &self.cell
    }

    /// The fractional positions of all sites, one site per row.
    pub fn fractional_positions(&self) -> &Array2<f64> {
        &self.fractional_positions
    }

    /// The fractional position of the `i`th site.
    pub fn fractional_position(&self, i: usize) -> ArrayView1<'_, f64> {
        self.fractional_positions.row(i)
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// The number of atomic sites in the unit cell.
    pub fn natoms(&self) -> usize {
        self.fractional_positions.nrows()
    }
}

impl fmt::Display for Crystal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Unit cell:")?;
        for row in self.cell.row_iter() {
            writeln!(f, "  {:>12.6} {:>12.6} {:>12.6}", row[0], row[1], row[2])?;
        }
        writeln!(f, "Sites ({} in total):", self.natoms())?;
        let width = self.natoms().to_string().chars().count();
        for (i, (sym, pos)) in self
            .symbols
            .iter()
            .zip(self.fractional_positions.rows())
            .enumerate()
        {
            writeln!(
                f,
                "  {:>width$} {sym:>3} {:>+10.6} {:>+10.6} {:>+10.6}",
                i + 1,
                pos[0],
                pos[1],
                pos[2],
            )?;
        }
        Ok(())
    }
}
