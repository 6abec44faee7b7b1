//! Error types for the sadec-linalg crate.

/// Error type for all fallible operations in the sadec-linalg crate.
///
/// The three variants form the whole failure surface of the linear system
/// solver: two input-contract violations and one numerical failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LinalgError {
    /// Returned when a square matrix is required but a rectangular one was given.
    #[error("square matrix required, got {rows}x{cols}")]
    SquareRequired {
        /// Number of rows of the offending matrix.
        rows: usize,
        /// Number of columns of the offending matrix.
        cols: usize,
    },

    /// Returned when the right-hand side does not match the system dimension.
    #[error("dimension mismatch: expected {expected} rows, got {found}")]
    DimensionMismatch {
        /// Dimension implied by the matrix.
        expected: usize,
        /// Dimension actually provided.
        found: usize,
    },

    /// Returned when the decomposition reports rank deficiency.
    #[error("singular matrix: rank {rank} < {dim}")]
    Singular {
        /// Numerical rank found by the decomposition.
        rank: usize,
        /// Full rank expected for a regular system.
        dim: usize,
    },
}
