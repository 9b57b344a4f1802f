//! Error types for Trestle operations.

use thiserror::Error;

use trestle_parser::ParseError;

/// Configuration failures raised while converting components into shapes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// A choice's normal branch index does not select one of its branches.
    #[error("normal branch index {normal} is out of range for {branches} branches")]
    NormalOutOfRange { normal: usize, branches: usize },

    /// An alternating sequence needs exactly two children to alternate.
    #[error("alternating sequence requires exactly two children, found {found}")]
    AlternatingArity { found: usize },
}

/// The main error type for Trestle operations.
#[derive(Debug, Error)]
pub enum TrestleError {
    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Layout(#[from] LayoutError),
}
