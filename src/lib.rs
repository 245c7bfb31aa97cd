//! # bandunfold: band-structure unfolding with translation projection operators
//!
//! `bandunfold` unfolds electronic band structures computed in a supercell onto the irreducible
//! representations of a translation subgroup of that supercell, following the projection-operator
//! method of Tomić *et al.*, [Phys. Rev. B **90**, 195121 (2014)](https://doi.org/10.1103/PhysRevB.90.195121).
//!
//! The unfolding pipeline runs in one direction:
//! 1. up to three fractional-translation generators span a finite abelian translation group,
//! whose one-dimensional irreps are labelled by the same mixed-radix indices as its elements
//! ([`group`], [`chartab`]);
//! 2. every translation permutes the atomic sites of the supercell ([`permutation`]);
//! 3. the characters and the site permutations give one projection operator per irrep on the
//! space of atomic orbitals ([`projection`]);
//! 4. the projectors act on the orbital phases of every band at every k-point, and the orbital
//! weights are rescaled accordingly ([`target::band_structure`]).
//!
//! Band structures are read from and written to VASP `PROCAR` files, and crystal structures are
//! read from VASP `POSCAR` files ([`interfaces::vasp`]). Phases are only written by VASP when
//! `LORBIT = 12` is set.
//!
//! ## Example
//!
//! ```no_run
//! use bandunfold::drivers::unfolding::{UnfoldingDriver, UnfoldingParams};
//! use bandunfold::drivers::UnfoldDriver;
//! use bandunfold::interfaces::vasp::{read_poscar, read_procar};
//!
//! let crystal = read_poscar("POSCAR").unwrap();
//! let band_structure = read_procar("PROCAR").unwrap();
//! let params = UnfoldingParams::builder()
//!     .translation_generators(&["1/2,0,0".parse().unwrap()])
//!     .build()
//!     .unwrap();
//! let mut driver = UnfoldingDriver::builder()
//!     .parameters(&params)
//!     .crystal(&crystal)
//!     .band_structure(&band_structure)
//!     .build()
//!     .unwrap();
//! driver.run().unwrap();
//! let unfolded = &driver.result().unwrap().unfolded;
//! ```

pub mod auxiliary;
pub mod chartab;
pub mod drivers;
pub mod error;
pub mod group;
pub mod interfaces;
pub mod io;
pub mod permutation;
pub mod projection;
pub mod target;
