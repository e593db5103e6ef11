use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlignmentError {
    #[error(
        "Motif structures differ in size: reference has {reference} atoms, mobile has {mobile}"
    )]
    AtomCountMismatch { reference: usize, mobile: usize },

    #[error(
        "Coordinate sets differ in size: reference has {reference} points, mobile has {mobile}"
    )]
    CoordinateCountMismatch { reference: usize, mobile: usize },

    #[error("Cannot superimpose an empty selection")]
    EmptySelection,

    #[error("Superposition failed: {0}")]
    Superposition(String),
}
