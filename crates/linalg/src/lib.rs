//! # sadec-linalg
//!
//! Dense linear algebra for the estimation core: a square linear system
//! solver built on a QR factorisation, with optional row normalisation and
//! one step of compensated iterative refinement.
//!
//! ## Pipeline
//!
//! ```mermaid
//! graph LR
//!     A["SolverConfig::new()"] -->|".with_normalize(true)\n.with_improve(true)"| B["LinearSystemSolver::new(config)"]
//!     B -->|".solve(a, b)?"| C["b ← x"]
//!     B -->|".solve_matrix(a, B)?"| D["B ← X"]
//!     E["HouseholderQr"] -.->|"QrDecomposition"| B
//!     F["NeumaierAccumulator"] -.->|"refinement residual"| B
//! ```
//!
//! ## Failure surface
//!
//! | Error | When |
//! |-------|------|
//! | [`LinalgError::SquareRequired`] | `A` is not square |
//! | [`LinalgError::DimensionMismatch`] | right-hand side has the wrong number of rows |
//! | [`LinalgError::Singular`] | numerical rank below `n` (matrix overload always, vector overload per [`SolverConfig::enforce_full_rank`]) |

mod accumulator;
mod error;
mod qr;
mod solver;

pub use accumulator::{NeumaierAccumulator, robust_dot, robust_residual};
pub use error::LinalgError;
pub use qr::{HouseholderQr, QrDecomposition, RANK_TOLERANCE};
pub use solver::{LinearSystemSolver, SolverConfig};
