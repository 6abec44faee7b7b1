//! # sadec-regarima
//!
//! Regression with seasonal ARIMA errors. The regression coefficients and the
//! innovation variance are profiled out of the Gaussian likelihood by GLS,
//! leaving an objective of the ARMA parameters alone.
//!
//! ## Pipeline
//!
//! ```mermaid
//! graph LR
//!     A["RegArimaModel::new(y, sarima)"] -->|".with_mean(true)\n.with_regressor(x)"| B["RegArimaModel"]
//!     B -->|".differenced()"| C["DifferencedData"]
//!     C -->|"ArmaFilter + LinearSystemSolver"| D["ConcentratedLikelihood"]
//!     B -->|"RegArimaEstimator::robust_estimation(&model)?"| E["RegArimaEstimation"]
//!     D -.->|"RegArmaSsqFunction"| E
//! ```
//!
//! ## Objective
//!
//! | Mode | Objective | Residuals |
//! |------|-----------|-----------|
//! | [`EstimationMode::MaximumLikelihood`] | `ssq·|Ω|^(1/n)` | `e·|Ω|^(1/2n)` |
//! | [`EstimationMode::LeastSquares`] | `ssq` | `e` |
//!
//! Independent evaluations (the initial simplex and the Hessian stencil) run
//! on the thread pool of [`EstimationConfig`] when one is given.
//!
//! NaN observations are missing values: each enters the regression as a
//! leading dummy and comes back interpolated in
//! [`RegArimaEstimation::missing`].

mod error;
mod estimation;
mod likelihood;
mod model;
mod ssq;

pub use error::RegArimaError;
pub use estimation::{EstimationConfig, RegArimaEstimation, RegArimaEstimator};
pub use likelihood::{ConcentratedLikelihood, ConcentratedLikelihoodComputer};
pub use model::{DifferencedData, RegArimaModel, RegArmaModel};
pub use ssq::{EstimationMode, RegArmaSsqFunction, SsqEvaluation};
