//! # sadec-seats
//!
//! Decomposition of a series into unobserved components (trend, seasonal,
//! transitory, irregular) given a UCARIMA model, with backcasts, forecasts
//! and standard deviations.
//!
//! ## Pipeline
//!
//! ```mermaid
//! graph LR
//!     A["SeatsModel::new(series, ucm, types)"] -->|".with_forecasts(nf)\n.with_innovation_variance(v)"| B["SeatsModel"]
//!     B -->|"KalmanEstimator.decompose(&model)?"| C["SeriesDecomposition"]
//!     C -->|".get(type, segment, measure)"| D["&[f64]"]
//! ```
//!
//! ## Output layout
//!
//! | Segment | Window positions | Emitted when |
//! |---------|------------------|--------------|
//! | [`Segment::Backcast`] | `[0, nb)` | `nb > 0` |
//! | [`Segment::Historical`] | `[nb, nb + n)` | always |
//! | [`Segment::Forecast`] | `[nb + n, nb + n + nf)` | `nf > 0` |
//!
//! Each segment carries a [`Measure::Value`] and a [`Measure::Stdev`]
//! sequence per non-null component.

mod component;
mod decomposition;
mod error;
mod estimator;
mod model;

pub use component::{ComponentType, Measure, Segment};
pub use decomposition::{DecompositionEntry, SeriesDecomposition, SeriesDecompositionBuilder};
pub use error::DecompositionError;
pub use estimator::{ComponentsEstimator, KalmanEstimator};
pub use model::SeatsModel;
