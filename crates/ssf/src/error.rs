//! Error types for the sadec-ssf crate.

use sadec_arima::ArimaError;
use sadec_linalg::LinalgError;

/// Error type for all fallible operations in the sadec-ssf crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SsfError {
    /// A linear algebra step failed (e.g. singular diffuse information matrix).
    #[error(transparent)]
    Linalg(#[from] LinalgError),

    /// The model handed to the builder is invalid.
    #[error(transparent)]
    Arima(#[from] ArimaError),

    /// The doubling algorithm for the stationary covariance did not converge.
    #[error("stationary covariance did not converge after {iterations} doublings")]
    NonConvergence {
        /// Number of doublings performed.
        iterations: usize,
    },

    /// The prediction error variance vanished at an observed position.
    #[error("singular innovation variance at position {position}")]
    SingularInnovation {
        /// Position in the (extended) data window.
        position: usize,
    },

    /// NaN or infinity appeared in the recursions.
    #[error("non-finite value in the recursions at position {position}")]
    NonFinite {
        /// Position in the (extended) data window.
        position: usize,
    },

    /// Fewer observations than diffuse initial values.
    #[error("insufficient data: {observations} observations for {diffuse} diffuse elements")]
    InsufficientData {
        /// Number of non-missing observations.
        observations: usize,
        /// Diffuse dimension of the model.
        diffuse: usize,
    },

    /// A data matrix does not match the model.
    #[error("dimension mismatch: expected {expected}, got {found}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Dimension provided.
        found: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_wraps_linalg() {
        let err: SsfError = LinalgError::Singular { rank: 1, dim: 2 }.into();
        assert_eq!(err.to_string(), "singular matrix: rank 1 < 2");
    }

    #[test]
    fn error_wraps_arima() {
        let err: SsfError = ArimaError::EmptyUcarima.into();
        assert_eq!(err.to_string(), "UCARIMA model has no non-null component");
    }

    #[test]
    fn error_non_convergence() {
        let err = SsfError::NonConvergence { iterations: 64 };
        assert_eq!(
            err.to_string(),
            "stationary covariance did not converge after 64 doublings"
        );
    }

    #[test]
    fn error_singular_innovation() {
        let err = SsfError::SingularInnovation { position: 7 };
        assert_eq!(err.to_string(), "singular innovation variance at position 7");
    }

    #[test]
    fn error_non_finite() {
        let err = SsfError::NonFinite { position: 3 };
        assert_eq!(
            err.to_string(),
            "non-finite value in the recursions at position 3"
        );
    }

    #[test]
    fn error_insufficient_data() {
        let err = SsfError::InsufficientData {
            observations: 2,
            diffuse: 3,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data: 2 observations for 3 diffuse elements"
        );
    }

    #[test]
    fn error_dimension_mismatch() {
        let err = SsfError::DimensionMismatch {
            expected: 10,
            found: 9,
        };
        assert_eq!(err.to_string(), "dimension mismatch: expected 10, got 9");
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<SsfError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<SsfError>();
    }
}
