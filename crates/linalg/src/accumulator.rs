//! Compensated summation.
//!
//! [`NeumaierAccumulator`] tracks the rounding error lost at each addition
//! and folds it back into the final sum. The residual of the refinement step
//! in [`crate::LinearSystemSolver`] is computed with it, since that residual
//! is the difference of nearly equal quantities. Row norms used for
//! normalisation go through [`robust_dot`].

use ndarray::{Array1, ArrayView1, ArrayView2};

/// Neumaier's variant of Kahan summation.
///
/// # Example
///
/// ```
/// use sadec_linalg::NeumaierAccumulator;
///
/// let acc: NeumaierAccumulator = [1.0, 1e100, 1.0, -1e100].into_iter().collect();
/// assert_eq!(acc.sum(), 2.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NeumaierAccumulator {
    sum: f64,
    compensation: f64,
}

impl NeumaierAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `x` to the running sum.
    #[inline]
    pub fn add(&mut self, x: f64) {
        let t = self.sum + x;
        if self.sum.abs() >= x.abs() {
            self.compensation += (self.sum - t) + x;
        } else {
            self.compensation += (x - t) + self.sum;
        }
        self.sum = t;
    }

    /// Returns the compensated sum.
    #[inline]
    pub fn sum(&self) -> f64 {
        self.sum + self.compensation
    }
}

impl Extend<f64> for NeumaierAccumulator {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for x in iter {
            self.add(x);
        }
    }
}

impl FromIterator<f64> for NeumaierAccumulator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = Self::new();
        acc.extend(iter);
        acc
    }
}

/// Compensated inner product of two vectors of equal length.
pub fn robust_dot(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| x * y)
        .collect::<NeumaierAccumulator>()
        .sum()
}

/// Computes `A·x - b` with a single accumulator per row, so the subtraction
/// of `b` is compensated as well.
pub fn robust_residual(
    a: ArrayView2<'_, f64>,
    x: ArrayView1<'_, f64>,
    b: ArrayView1<'_, f64>,
) -> Array1<f64> {
    a.rows()
        .into_iter()
        .zip(b.iter())
        .map(|(row, &bi)| {
            let mut acc: NeumaierAccumulator =
                row.iter().zip(x.iter()).map(|(aij, xj)| aij * xj).collect();
            acc.add(-bi);
            acc.sum()
        })
        .collect()
}
