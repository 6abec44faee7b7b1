//! Reported parameter values.

use serde::{Deserialize, Serialize};

/// How a parameter value was obtained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    /// No value.
    #[default]
    Undefined,
    /// Set by the user or kept constant during estimation.
    Fixed,
    /// Produced by an estimation, with a standard error.
    Estimated,
}

/// An immutable `(value, standard error, kind)` triple.
///
/// # Example
///
/// ```
/// use sadec_arima::{ParameterSpec, ParameterType};
///
/// let p = ParameterSpec::estimated(-0.6, 0.05);
/// assert_eq!(p.kind(), ParameterType::Estimated);
/// assert_eq!(ParameterSpec::undefined(), ParameterSpec::default());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    value: f64,
    #[serde(rename = "stde")]
    standard_error: f64,
    #[serde(rename = "type")]
    kind: ParameterType,
}

impl ParameterSpec {
    /// The undefined parameter: value 0, standard error 0.
    pub const fn undefined() -> Self {
        Self {
            value: 0.0,
            standard_error: 0.0,
            kind: ParameterType::Undefined,
        }
    }

    /// A fixed value (standard error 0).
    pub const fn fixed(value: f64) -> Self {
        Self {
            value,
            standard_error: 0.0,
            kind: ParameterType::Fixed,
        }
    }

    /// An estimated value with its standard error.
    pub const fn estimated(value: f64, standard_error: f64) -> Self {
        Self {
            value,
            standard_error,
            kind: ParameterType::Estimated,
        }
    }

    /// The value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The standard error (0 unless estimated).
    pub fn standard_error(&self) -> f64 {
        self.standard_error
    }

    /// How the value was obtained.
    pub fn kind(&self) -> ParameterType {
        self.kind
    }

    /// `true` for [`ParameterType::Fixed`].
    pub fn is_fixed(&self) -> bool {
        self.kind == ParameterType::Fixed
    }

    /// `true` for [`ParameterType::Estimated`].
    pub fn is_estimated(&self) -> bool {
        self.kind == ParameterType::Estimated
    }

    /// `true` for [`ParameterType::Undefined`].
    pub fn is_undefined(&self) -> bool {
        self.kind == ParameterType::Undefined
    }

    /// t-statistic `value / standard_error`; `None` unless estimated with a
    /// positive standard error.
    pub fn t_stat(&self) -> Option<f64> {
        (self.is_estimated() && self.standard_error > 0.0).then(|| self.value / self.standard_error)
    }
}
