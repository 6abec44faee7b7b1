//! Error types for the sadec-arima crate.

/// Error type for all fallible operations in the sadec-arima crate.
///
/// This enum covers invalid polynomial and model definitions as well as
/// parameter vectors that fall outside the domain of a mapping.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArimaError {
    /// Returned when a backshift polynomial does not start with a unit constant.
    #[error("polynomial constant term must be 1, got {0}")]
    NonUnitConstant(f64),

    /// Returned when a coefficient or variance is NaN or infinite.
    #[error("model contains non-finite values")]
    NonFinite,

    /// Returned when an innovation variance is negative.
    #[error("innovation variance must be non-negative, got {0}")]
    NegativeVariance(f64),

    /// Returned when a seasonal period cannot carry the requested orders.
    #[error("invalid seasonal period {period} for seasonal orders")]
    InvalidPeriod {
        /// Offending period.
        period: usize,
    },

    /// Returned when a parameter vector has the wrong length.
    #[error("wrong number of parameters: expected {expected}, got {found}")]
    ParameterCount {
        /// Number of parameters the model carries.
        expected: usize,
        /// Number of parameters provided.
        found: usize,
    },

    /// Returned when an autoregressive polynomial has a root on or inside the
    /// unit circle.
    #[error("autoregressive polynomial is not stationary")]
    NonStationary,

    /// Returned when a moving-average polynomial has a root on or inside the
    /// unit circle.
    #[error("moving-average polynomial is not invertible")]
    NonInvertible,

    /// Returned when a UCARIMA model has no non-null component.
    #[error("UCARIMA model has no non-null component")]
    EmptyUcarima,
}
