//! # sadec-ssf
//!
//! State-space machinery for ARIMA-based models: the state-space form of a
//! single ARIMA model, the composite (sum-of-components) form of a UCARIMA
//! model, an exact ARMA filter for GLS whitening and the augmented
//! square-root diffuse Kalman smoother.
//!
//! ## Pipeline
//!
//! ```mermaid
//! graph LR
//!     U["UcarimaModel"] -->|"CompositeSsf::from_ucarima(&ucm)?"| C["CompositeSsf"]
//!     D["ExtendedData::new(&y, nb, nf)"] --> S
//!     C --> S["sqrt_smooth(&ssf, &data)?"]
//!     S --> R["SmoothingResults"]
//!     R -->|".signal(loading)"| V["component estimates"]
//!     R -->|".signal_variance(loading)"| W["component variances"]
//!     A["ArmaFilter::new(&ar, &ma)?"] -->|".filter(y)?"| F["FilteredData"]
//! ```
//!
//! ## State of one component
//!
//! For `φ(B)·δ(B)·x_t = θ(B)·e_t` with `δ` of degree `d`, the state is
//! `(x_{t-1}, …, x_{t-d}, u_t)` where `u_t` is the Harvey state of the
//! stationary part `φ(B)·w_t = θ(B)·e_t`. The `d` lagged values are diffuse.
//!
//! ## Failure surface
//!
//! | Error | When |
//! |-------|------|
//! | [`SsfError::InsufficientData`] | no more observations than diffuse elements |
//! | [`SsfError::SingularInnovation`] | a prediction variance vanishes |
//! | [`SsfError::NonFinite`] | NaN or infinity in the recursions |
//! | [`SsfError::NonConvergence`] | stationary covariance doubling fails |
//! | [`SsfError::Linalg`] | diffuse information matrix singular |

mod composite;
mod data;
mod error;
mod filter;
mod results;
mod smoother;
mod state_space;

pub use composite::CompositeSsf;
pub use data::ExtendedData;
pub use error::SsfError;
pub use filter::{ArmaFilter, FilteredData};
pub use results::{DiffuseLikelihood, SmoothingResults};
pub use smoother::{diffuse_likelihood, sqrt_smooth};
pub use state_space::{ArimaSsf, compress, stationary_factor};
