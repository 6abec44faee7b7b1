//! Container of component estimates.

use serde::{Deserialize, Serialize};

use crate::component::{ComponentType, Measure, Segment};
use crate::error::DecompositionError;

/// One sequence of a decomposition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecompositionEntry {
    /// Component the sequence belongs to.
    pub component: ComponentType,
    /// Part of the extended window it covers.
    pub segment: Segment,
    /// Whether it holds estimates or their standard deviations.
    pub measure: Measure,
    /// One value per position of the segment.
    pub values: Vec<f64>,
}

/// Estimates keyed by `(component, segment, measure)`. Components are
/// additive: their historical values sum to the series.
///
/// Built once through [`SeriesDecompositionBuilder`], immutable afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesDecomposition {
    entries: Vec<DecompositionEntry>,
}

impl SeriesDecomposition {
    /// Starts an empty decomposition.
    pub fn builder() -> SeriesDecompositionBuilder {
        SeriesDecompositionBuilder {
            inner: Self {
                entries: Vec::new(),
            },
        }
    }

    /// All entries, in insertion order.
    pub fn entries(&self) -> &[DecompositionEntry] {
        &self.entries
    }

    /// Sequence stored under the given key, if any.
    pub fn get(
        &self,
        component: ComponentType,
        segment: Segment,
        measure: Measure,
    ) -> Option<&[f64]> {
        self.entries
            .iter()
            .find(|e| e.component == component && e.segment == segment && e.measure == measure)
            .map(|e| e.values.as_slice())
    }

    /// Historical estimates of `component`.
    pub fn series(&self, component: ComponentType) -> Option<&[f64]> {
        self.get(component, Segment::Historical, Measure::Value)
    }

    /// Standard deviations of the historical estimates of `component`.
    pub fn stdev(&self, component: ComponentType) -> Option<&[f64]> {
        self.get(component, Segment::Historical, Measure::Stdev)
    }

    /// Component types present, in order of first appearance.
    pub fn components(&self) -> Vec<ComponentType> {
        let mut out = Vec::new();
        for e in &self.entries {
            if !out.contains(&e.component) {
                out.push(e.component);
            }
        }
        out
    }

    /// Number of entries carrying `segment`.
    pub fn count(&self, segment: Segment) -> usize {
        self.entries.iter().filter(|e| e.segment == segment).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Append-only builder of a [`SeriesDecomposition`].
#[derive(Debug)]
pub struct SeriesDecompositionBuilder {
    inner: SeriesDecomposition,
}

impl SeriesDecompositionBuilder {
    /// Appends a sequence.
    ///
    /// # Errors
    ///
    /// [`DecompositionError::DuplicateEntry`] when the key is already present.
    pub fn add(
        &mut self,
        component: ComponentType,
        segment: Segment,
        measure: Measure,
        values: Vec<f64>,
    ) -> Result<&mut Self, DecompositionError> {
        if self.inner.get(component, segment, measure).is_some() {
            return Err(DecompositionError::DuplicateEntry {
                component,
                segment,
                measure,
            });
        }
        self.inner.entries.push(DecompositionEntry {
            component,
            segment,
            measure,
            values,
        });
        Ok(self)
    }

    pub fn build(self) -> SeriesDecomposition {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyed_lookup() {
        let mut builder = SeriesDecomposition::builder();
        builder
            .add(ComponentType::Trend, Segment::Historical, Measure::Value, vec![1.0, 2.0])
            .unwrap()
            .add(ComponentType::Trend, Segment::Historical, Measure::Stdev, vec![0.1, 0.2])
            .unwrap()
            .add(ComponentType::Irregular, Segment::Forecast, Measure::Value, vec![0.0])
            .unwrap();
        let d = builder.build();

        assert_eq!(d.series(ComponentType::Trend), Some(&[1.0, 2.0][..]));
        assert_eq!(d.stdev(ComponentType::Trend), Some(&[0.1, 0.2][..]));
        assert_eq!(d.series(ComponentType::Irregular), None);
        assert_eq!(
            d.get(ComponentType::Irregular, Segment::Forecast, Measure::Value),
            Some(&[0.0][..])
        );
        assert_eq!(
            d.components(),
            vec![ComponentType::Trend, ComponentType::Irregular]
        );
        assert_eq!(d.count(Segment::Historical), 2);
        assert_eq!(d.count(Segment::Backcast), 0);
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut builder = SeriesDecomposition::builder();
        builder
            .add(ComponentType::Seasonal, Segment::Backcast, Measure::Value, vec![1.0])
            .unwrap();
        let err = builder
            .add(ComponentType::Seasonal, Segment::Backcast, Measure::Value, vec![2.0])
            .unwrap_err();
        assert!(matches!(err, DecompositionError::DuplicateEntry { .. }));
        assert_eq!(builder.build().entries().len(), 1);
    }

    #[test]
    fn json_layout() {
        let mut builder = SeriesDecomposition::builder();
        builder
            .add(ComponentType::Trend, Segment::Historical, Measure::Value, vec![1.5])
            .unwrap();
        let json = serde_json::to_value(builder.build()).unwrap();
        assert!(json.get("mode").is_none());
        assert_eq!(json["entries"][0]["component"], "trend");
        assert_eq!(json["entries"][0]["segment"], "historical");
        assert_eq!(json["entries"][0]["values"][0], 1.5);
    }
}
