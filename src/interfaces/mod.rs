//! Interfaces between the unfolding core and other software.

use anyhow;

pub mod cli;
pub mod input;
pub mod vasp;

/// Trait for handling an input specification.
pub trait InputHandle {
    /// Handles the input and runs appropriate calculations.
    fn handle(&self) -> Result<(), anyhow::Error>;
}
