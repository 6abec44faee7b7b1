//! Error types for the sadec-seats crate.

use sadec_ssf::SsfError;

use crate::component::{ComponentType, Measure, Segment};

/// Fatal error of a decomposition request. The display string is the
/// diagnostic message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecompositionError {
    /// The smoother failed on the composite model.
    #[error("decomposition failed: {0}")]
    Smoothing(#[from] SsfError),

    /// Component types do not line up with the UCARIMA components.
    #[error("{found} component types given for {expected} components")]
    TypeCount {
        /// Number of UCARIMA components.
        expected: usize,
        /// Number of types provided.
        found: usize,
    },

    /// Innovation variance is not strictly positive and finite.
    #[error("innovation variance must be positive and finite, got {0}")]
    InvalidVariance(f64),

    /// The series holds no observation.
    #[error("series is empty")]
    EmptySeries,

    /// An entry was added twice to the same decomposition.
    #[error("duplicate {measure} entry for {component} ({segment})")]
    DuplicateEntry {
        component: ComponentType,
        segment: Segment,
        measure: Measure,
    },
}
