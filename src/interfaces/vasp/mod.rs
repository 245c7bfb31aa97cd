//! Interfaces with the structure and projected band files written by VASP.

pub mod poscar;
pub mod procar;

pub use poscar::read_poscar;
pub use procar::{irrep_output_path, read_procar, write_procar, ProcarLayout, WeightBlockKind};
