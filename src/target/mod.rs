//! Band data that can be unfolded onto the irreducible representations of a translation group.

pub mod band_structure;
