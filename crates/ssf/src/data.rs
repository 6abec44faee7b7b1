//! Observation windows for the filters.

/// A series extended with `nb` leading and `nf` trailing missing values.
///
/// NaN entries of the series itself are treated as missing as well.
///
/// ```text
/// | backcasts [0, nb) | series [nb, nb + n) | forecasts [nb + n, nb + n + nf) |
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ExtendedData<'a> {
    series: &'a [f64],
    backcasts: usize,
    forecasts: usize,
}

impl<'a> ExtendedData<'a> {
    /// Wraps `series` with `backcasts` and `forecasts` missing positions.
    pub fn new(series: &'a [f64], backcasts: usize, forecasts: usize) -> Self {
        Self {
            series,
            backcasts,
            forecasts,
        }
    }

    /// Total length of the window.
    pub fn len(&self) -> usize {
        self.backcasts + self.series.len() + self.forecasts
    }

    /// `true` when the window is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of leading missing positions.
    pub fn backcasts(&self) -> usize {
        self.backcasts
    }

    /// Number of trailing missing positions.
    pub fn forecasts(&self) -> usize {
        self.forecasts
    }

    /// Length of the wrapped series.
    pub fn series_len(&self) -> usize {
        self.series.len()
    }

    /// Observation at position `t`, `None` when missing.
    pub fn get(&self, t: usize) -> Option<f64> {
        let i = t.checked_sub(self.backcasts)?;
        self.series.get(i).copied().filter(|y| !y.is_nan())
    }

    /// Number of non-missing observations.
    pub fn observations_count(&self) -> usize {
        self.series.iter().filter(|y| !y.is_nan()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_layout() {
        let y = [1.0, 2.0, 3.0];
        let data = ExtendedData::new(&y, 2, 1);
        assert_eq!(data.len(), 6);
        let values: Vec<Option<f64>> = (0..data.len()).map(|t| data.get(t)).collect();
        assert_eq!(
            values,
            vec![None, None, Some(1.0), Some(2.0), Some(3.0), None]
        );
        assert_eq!(data.get(100), None);
    }

    #[test]
    fn nan_is_missing() {
        let y = [1.0, f64::NAN, 3.0];
        let data = ExtendedData::new(&y, 0, 0);
        assert_eq!(data.get(1), None);
        assert_eq!(data.observations_count(), 2);
        assert!(!data.is_empty());
    }
}
