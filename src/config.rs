use serde::Deserialize;

/// Top-level sadec configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SadecConfig {
    /// Observed series.
    pub series: SeriesToml,

    /// RegARIMA model settings.
    #[serde(default)]
    pub model: ModelToml,

    /// Estimation settings.
    #[serde(default)]
    pub estimation: EstimationToml,

    /// Decomposition settings, required by `sadec decompose`.
    #[serde(default)]
    pub decomposition: Option<DecompositionToml>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeriesToml {
    /// Observations; `nan` marks a missing value, interpolated by `estimate`
    /// and smoothed over by `decompose`.
    pub values: Vec<f64>,
    #[serde(default = "default_period")]
    pub period: usize,
}

fn default_period() -> usize {
    12
}

/// SARIMA orders `(p, d, q)(bp, bd, bq)` plus regression variables.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelToml {
    #[serde(default = "default_regular")]
    pub regular: [usize; 3],
    #[serde(default = "default_seasonal")]
    pub seasonal: [usize; 3],
    #[serde(default)]
    pub mean: bool,
    /// Initial ARMA coefficients in the order phi, bphi, theta, btheta.
    #[serde(default)]
    pub parameters: Option<Vec<f64>>,
    /// Extra regressors, each as long as the series.
    #[serde(default)]
    pub regressors: Vec<Vec<f64>>,
}

impl Default for ModelToml {
    fn default() -> Self {
        Self {
            regular: default_regular(),
            seasonal: default_seasonal(),
            mean: false,
            parameters: None,
            regressors: Vec::new(),
        }
    }
}

fn default_regular() -> [usize; 3] {
    [0, 1, 1]
}
fn default_seasonal() -> [usize; 3] {
    [0, 1, 1]
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EstimationToml {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_max_iter")]
    pub max_iter: u64,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default)]
    pub parallel: bool,
}

impl Default for EstimationToml {
    fn default() -> Self {
        Self {
            method: default_method(),
            mode: default_mode(),
            max_iter: default_max_iter(),
            tolerance: default_tolerance(),
            parallel: false,
        }
    }
}

fn default_method() -> String {
    "robust".to_string()
}
fn default_mode() -> String {
    "ml".to_string()
}
fn default_max_iter() -> u64 {
    1000
}
fn default_tolerance() -> f64 {
    1e-8
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecompositionToml {
    #[serde(default)]
    pub backcasts: usize,
    #[serde(default)]
    pub forecasts: usize,
    #[serde(default = "default_innovation_variance")]
    pub innovation_variance: f64,
    pub components: Vec<ComponentToml>,
}

fn default_innovation_variance() -> f64 {
    1.0
}

/// One UCARIMA component. Polynomials are full coefficient lists in the
/// backshift operator, constant term first.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentToml {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "default_polynomial")]
    pub ar: Vec<f64>,
    #[serde(default = "default_polynomial")]
    pub differencing: Vec<f64>,
    #[serde(default = "default_polynomial")]
    pub ma: Vec<f64>,
    pub variance: f64,
}

fn default_polynomial() -> Vec<f64> {
    vec![1.0]
}
