//! Tags identifying the entries of a decomposition.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of unobserved component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Trend,
    Seasonal,
    Transitory,
    Irregular,
}

impl ComponentType {
    /// Lowercase name, as used in serialized output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trend => "trend",
            Self::Seasonal => "seasonal",
            Self::Transitory => "transitory",
            Self::Irregular => "irregular",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Part of the extended window an estimate belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    /// Before the first observation.
    Backcast,
    /// Over the observed span.
    Historical,
    /// After the last observation.
    Forecast,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Backcast => "backcast",
            Self::Historical => "historical",
            Self::Forecast => "forecast",
        })
    }
}

/// What an entry holds: point estimates or their standard deviations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    Value,
    Stdev,
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Value => "value",
            Self::Stdev => "stdev",
        })
    }
}
