use std::result;

/// Errors reported by the tree.
///
/// Every variant is a caller contract violation (an invalid argument);
/// it is always reported before the tree is mutated or read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KdTreeError {
    #[error("invalid argument: a tree needs at least one dimension")]
    ZeroDimensions,

    #[error("invalid argument: bucket capacity must be positive")]
    ZeroBucketCapacity,

    #[error("invalid argument: expected {expected} coordinates, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("invalid argument: coordinates must be finite")]
    NonFiniteCoordinate,

    #[error("invalid argument: min bound exceeds max bound on axis {axis}")]
    InvertedBounds { axis: usize },

    #[error("invalid argument: number of neighbors must be positive")]
    ZeroNeighbors,
}

impl KdTreeError {
    /// All errors produced by this crate are invalid-argument errors.
    pub fn is_invalid_argument(&self) -> bool {
        match *self {
            KdTreeError::ZeroDimensions
            | KdTreeError::ZeroBucketCapacity
            | KdTreeError::DimensionMismatch { .. }
            | KdTreeError::NonFiniteCoordinate
            | KdTreeError::InvertedBounds { .. }
            | KdTreeError::ZeroNeighbors => true,
        }
    }
}

pub type Result<T> = result::Result<T, KdTreeError>;
