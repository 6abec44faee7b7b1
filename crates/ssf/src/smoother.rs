//! Augmented square-root diffuse Kalman smoother.
//!
//! The initial state is `s_0 = A_0·δ + L_0·ξ` with `δ` diffuse (flat prior)
//! and `ξ ~ N(0, I)`. The forward pass carries
//!
//! - the predicted mean `a_t` and diffuse loadings `A_t` (the conditional
//!   mean given `δ` is `a_t + A_t·δ`),
//! - a factor `L_t` of the predicted covariance `P_t = L_t·L_tᵀ`, downdated
//!   by a Householder reflection at each observation and re-triangularised
//!   by QR at each prediction,
//!
//! and accumulates `S = Σ X_tᵀX_t / F_t`, `s = Σ X_tᵀv_t / F_t` so that
//! `δ̂ = S⁻¹·s`. The backward pass produces the smoothed state conditional on
//! `δ`, `â_t + G_t·δ`, and its variance `V_t`; the final moments are
//! `â_t + G_t·δ̂` and `V_t + G_t·S⁻¹·G_tᵀ`.

use ndarray::{Array1, Array2, ArrayView1, Axis, s};
use sadec_linalg::{HouseholderQr, LinearSystemSolver, QrDecomposition, SolverConfig};
use tracing::{debug, trace};

use crate::composite::CompositeSsf;
use crate::data::ExtendedData;
use crate::error::SsfError;
use crate::results::{DiffuseLikelihood, SmoothingResults};
use crate::state_space::{compress, hstack};

/// Relative size of `F_t` below which the innovation is considered singular.
const INNOVATION_TOLERANCE: f64 = 1e-13;

struct Observation {
    v: f64,
    x: Array1<f64>,
    f: f64,
    m: Array1<f64>,
}

/// Predicted quantities at one position of the window.
struct Step {
    a: Array1<f64>,
    diffuse: Array2<f64>,
    p: Array2<f64>,
    obs: Option<Observation>,
}

struct ForwardPass {
    steps: Vec<Step>,
    information: Array2<f64>,
    score: Array1<f64>,
    ssq: f64,
    log_det: f64,
    observations: usize,
}

/// Diffuse likelihood of `data` under `ssf` (forward pass only).
///
/// # Errors
///
/// See [`sqrt_smooth`].
pub fn diffuse_likelihood(
    ssf: &CompositeSsf,
    data: &ExtendedData<'_>,
) -> Result<DiffuseLikelihood, SsfError> {
    let forward = forward(ssf, data)?;
    let resolved = resolve_diffuse(&forward)?;
    Ok(resolved.likelihood(&forward))
}

/// Smooths `data` with the composite model `ssf`.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`SsfError::InsufficientData`] | not more observations than diffuse elements |
/// | [`SsfError::SingularInnovation`] | `F_t` vanishes at an observed position |
/// | [`SsfError::NonFinite`] | NaN or infinity in the recursions |
/// | [`SsfError::Linalg`] | the diffuse information matrix is singular |
pub fn sqrt_smooth(
    ssf: &CompositeSsf,
    data: &ExtendedData<'_>,
) -> Result<SmoothingResults, SsfError> {
    let forward = forward(ssf, data)?;
    let resolved = resolve_diffuse(&forward)?;
    let likelihood = resolved.likelihood(&forward);

    let t = ssf.t();
    let z = ssf.z();
    let n = ssf.dim();
    let d = ssf.diffuse_dim();
    let len = forward.steps.len();

    let mut r = Array1::<f64>::zeros(n);
    let mut rr = Array2::<f64>::zeros((n, d));
    let mut nn = Array2::<f64>::zeros((n, n));
    let mut states = Array2::zeros((len, n));
    let mut variances = Vec::with_capacity(len);

    for (pos, step) in forward.steps.iter().enumerate().rev() {
        match &step.obs {
            Some(o) => {
                // L = T - T·K·z, K = M / F
                let tk = t.dot(&o.m) / o.f;
                let lt = t - &outer(tk.view(), z.view());
                r = z * (o.v / o.f) + lt.t().dot(&r);
                rr = outer(z.view(), o.x.view()) / o.f + lt.t().dot(&rr);
                nn = outer(z.view(), z.view()) / o.f + lt.t().dot(&nn).dot(&lt);
            }
            None => {
                r = t.t().dot(&r);
                rr = t.t().dot(&rr);
                nn = t.t().dot(&nn).dot(t);
            }
        }

        let p = &step.p;
        let g = &step.diffuse - &p.dot(&rr);
        let mean = &step.a + &p.dot(&r) + g.dot(&resolved.delta);
        let variance = p - &p.dot(&nn).dot(p) + g.dot(&resolved.inverse).dot(&g.t());
        if mean.iter().any(|v| !v.is_finite()) {
            return Err(SsfError::NonFinite { position: pos });
        }
        states.row_mut(pos).assign(&mean);
        variances.push(variance);
    }
    variances.reverse();

    debug!(
        len,
        dim = n,
        diffuse = d,
        observations = forward.observations,
        sigma2 = likelihood.sigma2(),
        "diffuse smoothing done"
    );
    Ok(SmoothingResults::new(states, variances, likelihood))
}

fn forward(ssf: &CompositeSsf, data: &ExtendedData<'_>) -> Result<ForwardPass, SsfError> {
    let d = ssf.diffuse_dim();
    let observations = data.observations_count();
    if observations <= d {
        return Err(SsfError::InsufficientData {
            observations,
            diffuse: d,
        });
    }

    let t = ssf.t();
    let z = ssf.z();
    let mut a = Array1::<f64>::zeros(ssf.dim());
    let mut diffuse = ssf.diffuse().clone();
    let mut l = ssf.initial_factor().clone();

    let mut information = Array2::<f64>::zeros((d, d));
    let mut score = Array1::<f64>::zeros(d);
    let mut ssq = 0.0;
    let mut log_det = 0.0;
    let mut steps = Vec::with_capacity(data.len());

    for pos in 0..data.len() {
        let p = l.dot(&l.t());
        let mut step = Step {
            a: a.clone(),
            diffuse: diffuse.clone(),
            p,
            obs: None,
        };

        if let Some(y) = data.get(pos) {
            let zl = l.t().dot(z);
            let f = zl.dot(&zl);
            let scale: f64 = l
                .axis_iter(Axis(1))
                .map(|c| {
                    let s: f64 = c.iter().zip(z.iter()).map(|(li, zi)| (li * zi).abs()).sum();
                    s * s
                })
                .sum();
            let v = y - z.dot(&a);
            if !f.is_finite() || !v.is_finite() {
                return Err(SsfError::NonFinite { position: pos });
            }
            if f <= INNOVATION_TOLERANCE * scale || f == 0.0 {
                return Err(SsfError::SingularInnovation { position: pos });
            }
            let m = l.dot(&zl);
            let x = diffuse.t().dot(z);

            a.scaled_add(v / f, &m);
            for (mut col, &xj) in diffuse.axis_iter_mut(Axis(1)).zip(x.iter()) {
                col.scaled_add(-xj / f, &m);
            }
            information += &(outer(x.view(), x.view()) / f);
            score.scaled_add(v / f, &x);
            ssq += v * v / f;
            log_det += f.ln();
            l = downdate(&l, &zl);
            trace!(pos, v, f, "observation");

            step.obs = Some(Observation { v, x, f, m });
        }
        steps.push(step);

        a = t.dot(&a);
        diffuse = t.dot(&diffuse);
        l = compress(hstack(t.dot(&l).view(), ssf.noise().view()))?;
    }

    Ok(ForwardPass {
        steps,
        information,
        score,
        ssq,
        log_det,
        observations,
    })
}

/// GLS resolution of the diffuse initial values.
struct Resolved {
    delta: Array1<f64>,
    inverse: Array2<f64>,
    log_det: f64,
}

impl Resolved {
    fn likelihood(&self, forward: &ForwardPass) -> DiffuseLikelihood {
        let ssq = forward.ssq - forward.score.dot(&self.delta);
        DiffuseLikelihood::new(
            ssq,
            forward.log_det,
            self.log_det,
            forward.observations,
            self.delta.len(),
        )
    }
}

fn resolve_diffuse(forward: &ForwardPass) -> Result<Resolved, SsfError> {
    let d = forward.score.len();
    if d == 0 {
        return Ok(Resolved {
            delta: Array1::zeros(0),
            inverse: Array2::zeros((0, 0)),
            log_det: 0.0,
        });
    }

    // [S⁻¹ | δ̂] in a single solve
    let mut rhs = Array2::<f64>::zeros((d, d + 1));
    for i in 0..d {
        rhs[[i, i]] = 1.0;
    }
    rhs.column_mut(d).assign(&forward.score);
    LinearSystemSolver::new(SolverConfig::new().with_normalize(true).with_improve(true))
        .solve_matrix(forward.information.view(), rhs.view_mut())?;

    let qr = HouseholderQr::decompose(forward.information.view())?;
    let log_det = qr.rdiag().iter().map(|v| v.abs().ln()).sum();

    Ok(Resolved {
        delta: rhs.column(d).to_owned(),
        inverse: rhs.slice(s![.., ..d]).to_owned(),
        log_det,
    })
}

/// Removes the direction `u = z·L` from the factor `L`: returns `L'` with
/// `L'·L'ᵀ = L·(I - uᵀu / u·uᵀ)·Lᵀ` and one column less.
fn downdate(l: &Array2<f64>, u: &Array1<f64>) -> Array2<f64> {
    let norm = u.dot(u).sqrt();
    let sigma = if u[0] < 0.0 { -norm } else { norm };
    let mut v = u.clone();
    v[0] += sigma;
    let beta = v.dot(&v);
    let lv = l.dot(&v);
    let mut lh = l.clone();
    for (mut col, &vj) in lh.axis_iter_mut(Axis(1)).zip(v.iter()) {
        col.scaled_add(-2.0 * vj / beta, &lv);
    }
    lh.slice(s![.., 1..]).to_owned()
}

fn outer(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> Array2<f64> {
    a.insert_axis(Axis(1)).dot(&b.insert_axis(Axis(0)))
}
