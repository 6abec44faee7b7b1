//! Component estimation by Kalman smoothing.

use std::ops::Range;

use ndarray::s;
use sadec_ssf::{CompositeSsf, ExtendedData, sqrt_smooth};
use tracing::{debug, instrument};

use crate::component::{Measure, Segment};
use crate::decomposition::SeriesDecomposition;
use crate::error::DecompositionError;
use crate::model::SeatsModel;

/// Turns a [`SeatsModel`] into component estimates.
pub trait ComponentsEstimator {
    /// Decomposes the series of `model`.
    ///
    /// # Errors
    ///
    /// Any failure is fatal and reported as a [`DecompositionError`].
    fn decompose(&self, model: &SeatsModel) -> Result<SeriesDecomposition, DecompositionError>;
}

/// Estimator based on the square-root diffuse smoother of the composite
/// state-space form of the UCARIMA model.
///
/// For each non-null component the smoothed signal and its standard
/// deviation are emitted for the historical span, and for the backcast and
/// forecast spans when they are not empty. Variances are multiplied by the
/// model's innovation variance before taking square roots.
#[derive(Clone, Copy, Debug, Default)]
pub struct KalmanEstimator;

impl KalmanEstimator {
    pub fn new() -> Self {
        Self
    }
}

impl ComponentsEstimator for KalmanEstimator {
    #[instrument(
        skip_all,
        fields(
            n = model.series().len(),
            nb = model.backcasts_count(),
            nf = model.forecasts_count()
        )
    )]
    fn decompose(&self, model: &SeatsModel) -> Result<SeriesDecomposition, DecompositionError> {
        model.validate()?;
        let n = model.series().len();
        let nb = model.backcasts_count();
        let nf = model.forecasts_count();

        let ssf = CompositeSsf::from_ucarima(model.ucarima())?;
        let data = ExtendedData::new(model.series(), nb, nf);
        let mut results = sqrt_smooth(&ssf, &data)?;
        results.rescale_variances(model.innovation_variance());

        let mut builder = SeriesDecomposition::builder();
        for (i, &kind) in model.types().iter().enumerate() {
            let Some(loading) = ssf.component_loading(i) else {
                debug!(component = %kind, "null component skipped");
                continue;
            };
            let values = results.signal(loading.view());
            let stdevs = results
                .signal_variance(loading.view())
                .mapv(|v| v.max(0.0).sqrt());
            for (segment, range) in segments(nb, n, nf) {
                builder.add(
                    kind,
                    segment,
                    Measure::Value,
                    values.slice(s![range.clone()]).to_vec(),
                )?;
                builder.add(
                    kind,
                    segment,
                    Measure::Stdev,
                    stdevs.slice(s![range]).to_vec(),
                )?;
            }
        }

        debug!(
            sigma2 = results.likelihood().sigma2(),
            "decomposition done"
        );
        Ok(builder.build())
    }
}

/// Non-empty segments of the extended window.
fn segments(nb: usize, n: usize, nf: usize) -> Vec<(Segment, Range<usize>)> {
    let mut out = Vec::with_capacity(3);
    if nb > 0 {
        out.push((Segment::Backcast, 0..nb));
    }
    out.push((Segment::Historical, nb..nb + n));
    if nf > 0 {
        out.push((Segment::Forecast, nb + n..nb + n + nf));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentType;
    use sadec_arima::{ArimaModel, Polynomial, UcarimaModel};

    #[test]
    fn segment_layout() {
        assert_eq!(
            segments(2, 5, 3),
            vec![
                (Segment::Backcast, 0..2),
                (Segment::Historical, 2..7),
                (Segment::Forecast, 7..10)
            ]
        );
        assert_eq!(segments(0, 4, 0), vec![(Segment::Historical, 0..4)]);
    }

    #[test]
    fn null_component_is_absent() {
        let level = ArimaModel::new(
            Polynomial::one(),
            Polynomial::differencing(1),
            Polynomial::one(),
            0.5,
        )
        .unwrap();
        let ucm = UcarimaModel::new(vec![
            level,
            ArimaModel::null(),
            ArimaModel::white_noise(1.0).unwrap(),
        ])
        .unwrap();
        let model = SeatsModel::new(
            vec![1.0, 2.0, 1.5, 2.5, 3.0],
            ucm,
            vec![
                ComponentType::Trend,
                ComponentType::Seasonal,
                ComponentType::Irregular,
            ],
        )
        .with_forecasts(2);
        let d = KalmanEstimator::new().decompose(&model).unwrap();
        assert_eq!(
            d.components(),
            vec![ComponentType::Trend, ComponentType::Irregular]
        );
        assert!(d.series(ComponentType::Seasonal).is_none());
        assert_eq!(d.entries().len(), 8);
    }

    #[test]
    fn smoother_failures_are_fatal() {
        let level = ArimaModel::new(
            Polynomial::one(),
            Polynomial::differencing(1),
            Polynomial::one(),
            0.5,
        )
        .unwrap();
        let ucm = UcarimaModel::new(vec![level]).unwrap();
        let model = SeatsModel::new(vec![f64::NAN], ucm, vec![ComponentType::Trend]);
        let err = KalmanEstimator::new().decompose(&model).unwrap_err();
        assert!(matches!(err, DecompositionError::Smoothing(_)));
    }
}
