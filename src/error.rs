//! Errors raised by the unfolding core.

use std::error::Error;
use std::fmt;

/// An enumerated type for the fatal conditions that the unfolding core can encounter.
///
/// All variants carry a message identifying the invariant that failed and, where applicable, the
/// generator, translation, or projector that triggered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnfoldingError {
    /// Variant for invalid translation generators (too many, malformed, or linearly dependent).
    Configuration(String),

    /// Variant for inputs that do not describe the same system, or for translations that do not
    /// map the atomic sites one-to-one when this is required.
    StructuralMismatch(String),

    /// Variant for band data lacking the information needed for unfolding.
    MissingData(String),
}

impl fmt::Display for UnfoldingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "Configuration error: {msg}"),
            Self::StructuralMismatch(msg) => write!(f, "Structural mismatch error: {msg}"),
            Self::MissingData(msg) => write!(f, "Missing data error: {msg}"),
        }
    }
}

impl Error for UnfoldingError {}
