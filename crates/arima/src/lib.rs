//! # sadec-arima
//!
//! ARIMA model algebra shared by the estimation and decomposition crates.
//!
//! ## Model hierarchy
//!
//! ```mermaid
//! graph LR
//!     A["SarimaSpec::airline(12)"] -->|"SarimaModel::new(spec)"| B["SarimaModel"]
//!     M["SarimaMapping"] -->|".to_model(&x)?"| B
//!     B -->|".to_arima(var)?"| C["ArimaModel"]
//!     C -->|"Vec of components"| D["UcarimaModel::new(..)?"]
//!     C --> E[".simulate(n, n_sim, &mut rng)"]
//! ```
//!
//! ## Conventions
//!
//! | Object | Form |
//! |--------|------|
//! | [`Polynomial`] | `1 + c1·B + … + cn·B^n` |
//! | [`ArimaModel`] | `φ(B)·δ(B)·x_t = θ(B)·e_t`, `e_t ~ N(0, σ²)` |
//! | [`SarimaModel`] | `φ(B)Φ(B^s)(1-B)^d(1-B^s)^D y_t = θ(B)Θ(B^s) e_t` |
//! | [`SarimaMapping`] | each AR/MA block mapped through its partial autocorrelations |
//! | [`ParameterSpec`] | `(value, stde, type)` as reported by estimators |

mod error;
mod model;
mod parameter;
mod params;
mod polynomial;
mod sarima;
mod ucarima;

pub use error::ArimaError;
pub use model::ArimaModel;
pub use parameter::{ParameterSpec, ParameterType};
pub use params::{SarimaMapping, coeffs_to_unconstrained, unconstrained_to_coeffs};
pub use polynomial::Polynomial;
pub use sarima::{SarimaModel, SarimaSpec};
pub use ucarima::UcarimaModel;
