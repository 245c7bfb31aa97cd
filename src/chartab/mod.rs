//! Character tables of finite abelian translation groups.

use std::fmt;

use itertools::Itertools;
use ndarray::{Array2, ArrayView1};
use num::Complex;
use num_traits::Pow;

use crate::auxiliary::arithmetic::mixed_radix_digits;
use crate::error::UnfoldingError;

pub mod unityroot;

use unityroot::UnityRoot;


/// A struct to manage the character table of a direct product of three cyclic groups
/// $`\mathbb{Z}_{n_1} \times \mathbb{Z}_{n_2} \times \mathbb{Z}_{n_3}`$.
///
/// Both irreducible representations and group elements are indexed by the mixed-radix encoding
/// of their three integer labels. The character of irrep $`(a, b, c)`$ at element $`(i, j, k)`$ is
/// $`\omega_1^{ai}\,\omega_2^{bj}\,\omega_3^{ck}`$ with $`\omega_d = e^{-2\pi i/n_d}`$.
#[derive(Clone)]
pub struct CharacterTable {
    /// The orders $`(n_1, n_2, n_3)`$ of the cyclic factors.
    generator_orders: [u32; 3],

    /// The exact characters, indexed by `[irrep, element]`.
    characters: Array2<UnityRoot>,
}

impl CharacterTable {
    /// Constructs the character table from the orders of the three generators.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any order is zero or if the powers involved cannot be
    /// represented.
    pub fn from_generator_orders(generator_orders: &[u32; 3]) -> Result<Self, UnfoldingError> {
        if generator_orders.iter().any(|n| *n == 0) {
            return Err(UnfoldingError::Configuration(format!(
                "generator orders {generator_orders:?} must all be positive"
            )));
        }
        let order = generator_orders
            .iter()
            .map(|n| *n as usize)
            .product::<usize>();
        let omegas = generator_orders.map(UnityRoot::conjugate_primitive);

        let mut characters = Array2::<UnityRoot>::from_elem((order, order), UnityRoot::unity());
        for irrep in 0..order {
            let labels = mixed_radix_digits(irrep, generator_orders);
            for element in 0..order {
                let powers = mixed_radix_digits(element, generator_orders);
                let mut chr = UnityRoot::unity();
                for d in 0..3 {
                    let exponent = (u64::from(labels[d]) * u64::from(powers[d]))
                        % u64::from(generator_orders[d]);
                    let exponent = i32::try_from(exponent).map_err(|_| {
                        UnfoldingError::Configuration(format!(
                            "the exponent {exponent} of the generator root {} is too large",
                            omegas[d]
                        ))
                    })?;
                    chr = chr * (&omegas[d]).pow(exponent);
                }
                characters[(irrep, element)] = chr;
            }
        }
        Ok(Self {
            generator_orders: *generator_orders,
            characters,
        })
    }

    /// The order of the group, which is also the number of irreducible representations.
    pub fn order(&self) -> usize {
        self.characters.nrows()
    }

    /// The labels $`(a, b, c)`$ of the irrep with index `irrep`.
    pub fn irrep_labels(&self, irrep: usize) -> [u32; 3] {
        mixed_radix_digits(irrep, &self.generator_orders)
    }

    /// A symbol for the irrep with index `irrep`.
    pub fn irrep_symbol(&self, irrep: usize) -> String {
        format!("Γ({})", self.irrep_labels(irrep).iter().join(","))
    }

    /// The character of irrep `irrep` at the element with index `element`.
    pub fn character(&self, irrep: usize, element: usize) -> &UnityRoot {
        &self.characters[(irrep, element)]
    }

    /// The characters of irrep `irrep` across all elements.
    pub fn row(&self, irrep: usize) -> ArrayView1<'_, UnityRoot> {
        self.characters.row(irrep)
    }

    /// The character table as a complex matrix indexed by `[irrep, element]`.
    pub fn complex_matrix(&self) -> Array2<Complex<f64>> {
        self.characters.map(UnityRoot::complex_value)
    }
}

impl fmt::Display for CharacterTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols = (0..self.order())
            .map(|irrep| self.irrep_symbol(irrep))
            .collect_vec();
        let symbol_width = symbols
            .iter()
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(1)
            .max(5);
        let col_width = self
            .characters
            .iter()
            .map(|chr| chr.to_string().chars().count())
            .max()
            .unwrap_or(1)
            .max(self.order().to_string().chars().count() + 1);
        let header = (0..self.order())
            .map(|element| format!("{:>col_width$}", format!("T{element}")))
            .join(" ");
        let bar = "┈".repeat(symbol_width + 3 + header.chars().count());
        writeln!(f, "{bar}")?;
        writeln!(f, "{:>symbol_width$} │ {header}", "irrep")?;
        writeln!(f, "{bar}")?;
        for (symbol, row) in symbols.iter().zip(self.characters.rows()) {
            writeln!(
                f,
                "{symbol:>symbol_width$} │ {}",
                row.iter()
                    .map(|chr| format!("{:>col_width$}", chr.to_string()))
                    .join(" ")
            )?;
        }
        writeln!(f, "{bar}")?;
        Ok(())
    }
}
