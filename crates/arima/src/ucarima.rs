//! Unobserved-components ARIMA models.

use serde::{Deserialize, Serialize};

use crate::error::ArimaError;
use crate::model::ArimaModel;

/// A series model written as a sum of independent ARIMA components.
///
/// Components keep their position (so that they can be paired with
/// component tags by the caller); null components are allowed and carry no
/// information.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UcarimaModel {
    components: Vec<ArimaModel>,
}

impl UcarimaModel {
    /// Creates a UCARIMA model from its components.
    ///
    /// # Errors
    ///
    /// [`ArimaError::EmptyUcarima`] when every component is null.
    pub fn new(components: Vec<ArimaModel>) -> Result<Self, ArimaError> {
        if components.iter().all(ArimaModel::is_null) {
            return Err(ArimaError::EmptyUcarima);
        }
        Ok(Self { components })
    }

    /// All components, null ones included.
    pub fn components(&self) -> &[ArimaModel] {
        &self.components
    }

    /// Component `i`.
    pub fn component(&self, i: usize) -> Option<&ArimaModel> {
        self.components.get(i)
    }

    /// Number of components, null ones included.
    pub fn components_count(&self) -> usize {
        self.components.len()
    }

    /// `true` when component `i` is missing or null.
    pub fn is_null(&self, i: usize) -> bool {
        self.components.get(i).is_none_or(ArimaModel::is_null)
    }
}
