//! Error types for the sadec-regarima crate.

use sadec_arima::ArimaError;
use sadec_linalg::LinalgError;
use sadec_ssf::SsfError;

/// Error type for all fallible operations in the sadec-regarima crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegArimaError {
    /// The GLS normal equations could not be solved.
    #[error(transparent)]
    Linalg(#[from] LinalgError),

    /// Invalid ARIMA specification or parameters.
    #[error(transparent)]
    Arima(#[from] ArimaError),

    /// The ARMA filter failed.
    #[error(transparent)]
    Ssf(#[from] SsfError),

    /// A regressor does not have the length of the series.
    #[error("regressor {index} has length {found}, expected {expected}")]
    RegressorLength {
        /// Position of the regressor.
        index: usize,
        /// Length of the series.
        expected: usize,
        /// Length of the regressor.
        found: usize,
    },

    /// The series contains NaN or infinite values.
    #[error("series contains non-finite values")]
    NonFiniteData,

    /// Not enough differenced observations for the number of parameters.
    #[error("insufficient data: {observations} differenced observations for {parameters} parameters")]
    InsufficientData {
        /// Observations left after differencing.
        observations: usize,
        /// Regression and ARMA parameters to estimate.
        parameters: usize,
    },

    /// The optimizer could not be set up or did not return a point.
    #[error("optimization failed: {reason}")]
    OptimizationFailed {
        /// Reason reported by the optimizer.
        reason: String,
    },

    /// An estimation setting is out of range.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Offending setting.
        reason: String,
    },
}
