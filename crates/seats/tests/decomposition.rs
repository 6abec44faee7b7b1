//! Integration tests for the Kalman decomposition.

use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use sadec_arima::{ArimaModel, Polynomial, UcarimaModel};
use sadec_seats::{
    ComponentType, ComponentsEstimator, KalmanEstimator, Measure, SeatsModel, Segment,
};

fn trend() -> ArimaModel {
    ArimaModel::new(
        Polynomial::one(),
        Polynomial::differencing(2),
        Polynomial::from_lags(&[1.0]),
        0.05,
    )
    .unwrap()
}

fn seasonal(period: usize) -> ArimaModel {
    ArimaModel::new(
        Polynomial::one(),
        Polynomial::seasonal_sum(period),
        Polynomial::one(),
        0.2,
    )
    .unwrap()
}

fn simulate(ucm: &UcarimaModel, n: usize, seed: u64) -> Vec<f64> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut y = vec![0.0; n];
    for c in ucm.components() {
        let x = c.simulate(n, 1, &mut rng);
        for (yi, xi) in y.iter_mut().zip(x.column(0)) {
            *yi += xi;
        }
    }
    y
}

#[test]
fn trend_and_irregular_add_up_to_series() {
    let ucm = UcarimaModel::new(vec![trend(), ArimaModel::white_noise(1.0).unwrap()]).unwrap();
    let y = simulate(&ucm, 60, 5);
    let model = SeatsModel::new(
        y.clone(),
        ucm,
        vec![ComponentType::Trend, ComponentType::Irregular],
    )
    .with_backcasts(4)
    .with_forecasts(4);
    let d = KalmanEstimator::new().decompose(&model).unwrap();

    let t = d.series(ComponentType::Trend).unwrap();
    let i = d.series(ComponentType::Irregular).unwrap();
    assert_eq!(t.len(), 60);
    for k in 0..60 {
        assert_abs_diff_eq!(t[k] + i[k], y[k], epsilon = 1e-6);
    }
    assert_eq!(
        d.get(ComponentType::Trend, Segment::Backcast, Measure::Value)
            .unwrap()
            .len(),
        4
    );
}

#[test]
fn no_backcasts_means_no_backcast_entries() {
    let ucm = UcarimaModel::new(vec![trend(), ArimaModel::white_noise(1.0).unwrap()]).unwrap();
    let y = simulate(&ucm, 30, 8);
    let model = SeatsModel::new(y, ucm, vec![ComponentType::Trend, ComponentType::Irregular])
        .with_forecasts(5);
    let d = KalmanEstimator::new().decompose(&model).unwrap();

    assert_eq!(d.count(Segment::Backcast), 0);
    for c in [ComponentType::Trend, ComponentType::Irregular] {
        for m in [Measure::Value, Measure::Stdev] {
            assert_eq!(d.get(c, Segment::Forecast, m).unwrap().len(), 5);
            assert!(d.get(c, Segment::Backcast, m).is_none());
        }
    }
}

#[test]
fn monthly_three_component_scenario() {
    let ucm = UcarimaModel::new(vec![
        trend(),
        seasonal(12),
        ArimaModel::white_noise(0.5).unwrap(),
    ])
    .unwrap();
    let y = simulate(&ucm, 48, 21);
    let types = vec![
        ComponentType::Trend,
        ComponentType::Seasonal,
        ComponentType::Irregular,
    ];
    let model = SeatsModel::new(y, ucm, types.clone()).with_forecasts(12);
    let d = KalmanEstimator::new().decompose(&model).unwrap();

    assert_eq!(d.components(), types);
    for &c in &types {
        assert_eq!(d.series(c).unwrap().len(), 48);
        assert_eq!(d.stdev(c).unwrap().len(), 48);
        for m in [Measure::Value, Measure::Stdev] {
            assert_eq!(d.get(c, Segment::Forecast, m).unwrap().len(), 12);
        }
    }

    let fstdev = d
        .get(ComponentType::Trend, Segment::Forecast, Measure::Stdev)
        .unwrap();
    for w in fstdev.windows(2) {
        assert!(w[1] >= w[0] - 1e-12, "{fstdev:?}");
    }
    // in-sample uncertainty is below the forecast one
    let hstdev = d.stdev(ComponentType::Trend).unwrap();
    assert!(hstdev[24] < fstdev[11]);
}

#[test]
fn stdevs_scale_with_innovation_variance() {
    let ucm = UcarimaModel::new(vec![trend(), ArimaModel::white_noise(1.0).unwrap()]).unwrap();
    let y = simulate(&ucm, 40, 3);
    let types = vec![ComponentType::Trend, ComponentType::Irregular];
    let base = KalmanEstimator::new()
        .decompose(&SeatsModel::new(y.clone(), ucm.clone(), types.clone()).with_forecasts(3))
        .unwrap();
    let scaled = KalmanEstimator::new()
        .decompose(
            &SeatsModel::new(y, ucm, types)
                .with_forecasts(3)
                .with_innovation_variance(4.0),
        )
        .unwrap();

    for (a, b) in base.entries().iter().zip(scaled.entries()) {
        assert_eq!((a.component, a.segment, a.measure), (b.component, b.segment, b.measure));
        let factor = match a.measure {
            Measure::Value => 1.0,
            Measure::Stdev => 2.0,
        };
        for (x, z) in a.values.iter().zip(&b.values) {
            assert_abs_diff_eq!(x * factor, *z, epsilon = 1e-9);
        }
    }
}
