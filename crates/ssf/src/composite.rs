//! Sum-of-components state-space model.

use std::ops::Range;

use ndarray::{Array1, Array2, s};
use sadec_arima::UcarimaModel;
use tracing::debug;

use crate::error::SsfError;
use crate::state_space::ArimaSsf;

/// State-space form of a [`UcarimaModel`]: the state is the concatenation of
/// the component states, the transition is block diagonal and the
/// observation is the sum of the component signals (no measurement noise).
///
/// Null components own no state; their position is `None`.
#[derive(Clone, Debug)]
pub struct CompositeSsf {
    t: Array2<f64>,
    z: Array1<f64>,
    noise: Array2<f64>,
    initial_factor: Array2<f64>,
    diffuse: Array2<f64>,
    positions: Vec<Option<Range<usize>>>,
}

impl CompositeSsf {
    /// Assembles the composite model of `ucm`.
    ///
    /// # Errors
    ///
    /// Propagates [`ArimaSsf::new`] failures.
    pub fn from_ucarima(ucm: &UcarimaModel) -> Result<Self, SsfError> {
        let blocks = ucm
            .components()
            .iter()
            .map(|c| (!c.is_null()).then(|| ArimaSsf::new(c)).transpose())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_blocks(&blocks))
    }

    fn from_blocks(blocks: &[Option<ArimaSsf>]) -> Self {
        let present = || blocks.iter().flatten();
        let n: usize = present().map(ArimaSsf::dim).sum();
        let d: usize = present().map(ArimaSsf::diffuse_dim).sum();
        let k: usize = present().map(|b| b.stationary_factor().ncols()).sum();
        let m = present().count();

        let mut t = Array2::zeros((n, n));
        let mut z = Array1::zeros(n);
        let mut noise = Array2::zeros((n, m));
        let mut initial_factor = Array2::zeros((n, k));
        let mut diffuse = Array2::zeros((n, d));
        let mut positions = Vec::with_capacity(blocks.len());

        let (mut pos, mut dpos, mut kpos, mut col) = (0, 0, 0, 0);
        for block in blocks {
            let Some(b) = block else {
                positions.push(None);
                continue;
            };
            let (bn, bd, bk) = (b.dim(), b.diffuse_dim(), b.stationary_factor().ncols());
            let range = pos..pos + bn;
            t.slice_mut(s![range.clone(), range.clone()]).assign(b.t());
            z.slice_mut(s![range.clone()]).assign(b.z());
            noise
                .slice_mut(s![range.clone(), col])
                .assign(b.noise());
            initial_factor
                .slice_mut(s![range.clone(), kpos..kpos + bk])
                .assign(b.stationary_factor());
            diffuse
                .slice_mut(s![range.clone(), dpos..dpos + bd])
                .assign(&b.diffuse());
            positions.push(Some(range));
            pos += bn;
            dpos += bd;
            kpos += bk;
            col += 1;
        }
        debug!(dim = n, diffuse = d, components = m, "composite model assembled");

        Self {
            t,
            z,
            noise,
            initial_factor,
            diffuse,
            positions,
        }
    }

    /// State dimension.
    pub fn dim(&self) -> usize {
        self.z.len()
    }

    /// Number of diffuse initial elements.
    pub fn diffuse_dim(&self) -> usize {
        self.diffuse.ncols()
    }

    /// Transition matrix (block diagonal).
    pub fn t(&self) -> &Array2<f64> {
        &self.t
    }

    /// Observation loading: `y_t = z·s_t`.
    pub fn z(&self) -> &Array1<f64> {
        &self.z
    }

    /// Factor of the state noise covariance, one column per component.
    pub fn noise(&self) -> &Array2<f64> {
        &self.noise
    }

    /// Factor of the covariance of the non-diffuse initial state.
    pub fn initial_factor(&self) -> &Array2<f64> {
        &self.initial_factor
    }

    /// Loadings of the diffuse initial values.
    pub fn diffuse(&self) -> &Array2<f64> {
        &self.diffuse
    }

    /// State index range owned by each component, `None` for null ones.
    pub fn components_position(&self) -> &[Option<Range<usize>>] {
        &self.positions
    }

    /// Loading that extracts the signal of component `i` from the state.
    pub fn component_loading(&self, i: usize) -> Option<Array1<f64>> {
        let range = self.positions.get(i)?.clone()?;
        let mut loading = Array1::zeros(self.dim());
        loading
            .slice_mut(s![range.clone()])
            .assign(&self.z.slice(s![range]));
        Some(loading)
    }
}
