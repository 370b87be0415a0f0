use approx::assert_relative_eq;
use decline_curves::data::{SampleConfig, generate_wells};
use decline_curves::fit::{fit_kind, fit_wells};
use decline_curves::math::SolverConfig;
use decline_curves::models::predict;
use decline_curves::{FitError, ModelKind, TimeSeries, fit};

fn series_from(kind: ModelKind, params: &[f64], time: &[f64]) -> TimeSeries {
    let production = time.iter().map(|&t| predict(kind, t, params)).collect();
    TimeSeries::new(time.to_vec(), production)
}

fn monthly_grid(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64 * 30.0).collect()
}

#[test]
fn exponential_scenario_recovers_parameters() {
    let time = [0.0, 30.0, 60.0, 90.0, 120.0];
    let series = series_from(ModelKind::Exponential, &[1000.0, 0.05], &time);

    let expected = [1000.0, 223.13, 49.79, 11.11, 2.48];
    for (&q, &e) in series.production.iter().zip(expected.iter()) {
        assert_relative_eq!(q, e, max_relative = 1e-3);
    }

    let result = fit(&series, "exponential").unwrap();
    let params = result.params();
    assert_relative_eq!(params[0], 1000.0, max_relative = 0.01);
    assert_relative_eq!(params[1], 0.05, max_relative = 0.01);
    assert!(result.mse() < 1e-6, "mse = {}", result.mse());
    assert_eq!(result.fitted().len(), time.len());
}

#[test]
fn hyperbolic_scenario_recovers_parameters() {
    let time = [0.0, 30.0, 60.0, 90.0];
    let series = series_from(ModelKind::Hyperbolic, &[500.0, 0.02, 0.5], &time);

    let result = fit(&series, "hyperbolic").unwrap();
    let params = result.params();
    assert_relative_eq!(params[0], 500.0, max_relative = 0.02);
    assert_relative_eq!(params[1], 0.02, max_relative = 0.02);
    assert_relative_eq!(params[2], 0.5, max_relative = 0.02);
    assert!(result.mse() < 1e-4 * 500.0 * 500.0);
}

#[test]
fn empty_production_is_a_data_error() {
    let series = TimeSeries::new(vec![], vec![]);
    for kind in ModelKind::ALL {
        assert!(matches!(fit(&series, kind.tag()), Err(FitError::Data { .. })));
    }
}

#[test]
fn unknown_model_tag_is_reported() {
    let series = series_from(ModelKind::Exponential, &[1000.0, 0.05], &monthly_grid(6));
    assert_eq!(
        fit(&series, "Exponential"),
        Err(FitError::UnknownModel {
            tag: "Exponential".to_string()
        })
    );
}

#[test]
fn noise_free_data_is_recovered_for_every_model() {
    let cases: [(ModelKind, &[f64]); 4] = [
        (ModelKind::Exponential, &[1000.0, 0.05]),
        (ModelKind::Harmonic, &[800.0, 0.02]),
        (ModelKind::Hyperbolic, &[650.0, 0.03, 0.8]),
        (ModelKind::StretchedExponential, &[900.0, 0.03, 0.6]),
    ];
    let time = monthly_grid(13);

    for (kind, truth) in cases {
        let series = series_from(kind, truth, &time);
        let result = fit(&series, kind.tag()).unwrap_or_else(|e| panic!("{kind}: {e}"));
        for (got, want) in result.params().iter().zip(truth.iter()) {
            assert_relative_eq!(*got, *want, max_relative = 1e-3);
        }
        let scale = truth[0] * truth[0];
        assert!(result.mse() < 1e-8 * scale, "{kind}: mse = {}", result.mse());
    }
}

#[test]
fn recovery_holds_at_bounds_and_on_short_grids() {
    let cases: [(ModelKind, &[f64], usize); 6] = [
        (ModelKind::Exponential, &[1200.0, 0.002], 4),
        (ModelKind::Harmonic, &[400.0, 0.001], 13),
        (ModelKind::Hyperbolic, &[650.0, 0.03, 0.01], 5),
        (ModelKind::Hyperbolic, &[650.0, 0.03, 10.0], 13),
        (ModelKind::StretchedExponential, &[900.0, 0.03, 1.0], 5),
        (ModelKind::StretchedExponential, &[900.0, 0.01, 0.3], 13),
    ];

    for (kind, truth, points) in cases {
        let series = series_from(kind, truth, &monthly_grid(points));
        let result = fit(&series, kind.tag()).unwrap_or_else(|e| panic!("{kind} {truth:?}: {e}"));
        assert!(result.model().within_bounds());
        for (got, want) in result.params().iter().zip(truth.iter()) {
            assert_relative_eq!(*got, *want, max_relative = 1e-3);
        }
        assert!(result.mse() < 1e-8 * truth[0] * truth[0], "{kind}: mse = {}", result.mse());
    }
}

#[test]
fn fast_decline_to_round_off_is_a_successful_fit() {
    // Rates after t = 0 are below 1e-10, so only qi is identifiable.
    for points in [5, 13] {
        let series = series_from(ModelKind::StretchedExponential, &[1000.0, 1.0, 1.0], &monthly_grid(points));
        let result = fit(&series, "stretched_exponential").unwrap_or_else(|e| panic!("{points} points: {e}"));
        assert_relative_eq!(result.params()[0], 1000.0, max_relative = 1e-6);
        assert!(result.model().within_bounds());
        assert!(result.mse() < 1e-10, "mse = {}", result.mse());
    }
}

#[test]
fn repeated_fits_are_identical() {
    let series = series_from(ModelKind::Hyperbolic, &[700.0, 0.01, 1.2], &monthly_grid(10));
    let a = fit(&series, "hyperbolic").unwrap();
    let b = fit(&series, "hyperbolic").unwrap();
    assert_eq!(a, b);
}

#[test]
fn fitted_parameters_stay_in_bounds_on_noisy_wells() {
    let wells = generate_wells(&SampleConfig {
        wells: 12,
        seed: 2024,
        noise_sigma: 0.1,
        ..SampleConfig::default()
    })
    .unwrap();

    let mut successes = 0;
    for kind in ModelKind::ALL {
        for synthetic in &wells {
            if let Ok(result) = fit_kind(&synthetic.well.series, kind) {
                successes += 1;
                assert!(result.model().within_bounds(), "{kind}: {:?}", result.model());
                assert!(result.model().qi() > 0.0);
                assert!(result.model().di() > 0.0);
                assert!(result.fitted().iter().all(|q| q.is_finite()));
            }
        }
    }
    assert!(successes > 0);
}

#[test]
fn too_few_points_is_a_data_error() {
    for kind in ModelKind::ALL {
        let p = kind.param_count();
        let time = monthly_grid(p);
        let production = vec![100.0; p];
        let series = TimeSeries::new(time, production);
        assert!(
            matches!(fit(&series, kind.tag()), Err(FitError::Data { .. })),
            "{kind} accepted {p} points"
        );
    }
}

#[test]
fn parallel_batch_equals_sequential_fits() {
    let wells: Vec<_> = generate_wells(&SampleConfig {
        wells: 6,
        kind: Some(ModelKind::Exponential),
        ..SampleConfig::default()
    })
    .unwrap()
    .into_iter()
    .map(|s| s.well)
    .collect();

    let config = SolverConfig::default();
    let batch = fit_wells(&wells, ModelKind::Exponential, &config);
    for (outcome, well) in batch.iter().zip(wells.iter()) {
        assert_eq!(outcome.name, well.name);
        assert_eq!(outcome.result, fit_kind(&well.series, ModelKind::Exponential));
    }
}

#[test]
fn curve_grid_extends_the_fitted_model() {
    let series = series_from(ModelKind::Harmonic, &[400.0, 0.01], &monthly_grid(8));
    let result = fit(&series, "harmonic").unwrap();
    let grid = result.curve_grid(720.0, 25);
    assert_eq!(grid.time.len(), 25);
    assert_eq!(grid.time[24], 720.0);
    assert_relative_eq!(grid.rate[24], 400.0 / (1.0 + 0.01 * 720.0), max_relative = 1e-3);
    assert!(grid.rate.windows(2).all(|w| w[1] <= w[0]));
}
