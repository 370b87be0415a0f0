//! Starting parameters for the solver.
//!
//! The seeds are deliberately data-light: `qi` is the first observed rate and
//! every other parameter starts from the registry's fixed seed (`di = 0.1`,
//! `b = 1`, `beta = 1`). The decline functions are monotone in `di` near these
//! values, so Levenberg–Marquardt converges from here for typical wells.

use crate::domain::{ModelKind, TimeSeries};
use crate::error::FitError;
use crate::models::project;

/// Build `θ₀` for `kind`, projected onto the model's bounds.
pub fn initial_guess(kind: ModelKind, series: &TimeSeries) -> Result<Vec<f64>, FitError> {
    let Some(&q0) = series.production.first() else {
        return Err(FitError::data("cannot seed qi from an empty series"));
    };
    if !(q0.is_finite() && q0 > 0.0) {
        return Err(FitError::data(format!(
            "first production value must be positive to seed qi, got {q0}"
        )));
    }

    let mut params = Vec::with_capacity(kind.param_count());
    params.push(q0);
    params.extend_from_slice(kind.spec().seeds);
    project(kind, &mut params);
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(production: Vec<f64>) -> TimeSeries {
        let time = (0..production.len()).map(|i| i as f64 * 30.0).collect();
        TimeSeries::new(time, production)
    }

    #[test]
    fn seeds_follow_registry_defaults() {
        let s = series(vec![420.0, 300.0, 200.0, 150.0]);
        assert_eq!(initial_guess(ModelKind::Exponential, &s).unwrap(), vec![420.0, 0.1]);
        assert_eq!(initial_guess(ModelKind::Harmonic, &s).unwrap(), vec![420.0, 0.1]);
        assert_eq!(initial_guess(ModelKind::Hyperbolic, &s).unwrap(), vec![420.0, 0.1, 1.0]);
        assert_eq!(
            initial_guess(ModelKind::StretchedExponential, &s).unwrap(),
            vec![420.0, 0.1, 1.0]
        );
    }

    #[test]
    fn non_positive_first_rate_is_a_data_error() {
        let s = series(vec![0.0, 10.0, 5.0]);
        assert!(matches!(
            initial_guess(ModelKind::Exponential, &s),
            Err(FitError::Data { .. })
        ));
        assert!(matches!(
            initial_guess(ModelKind::Exponential, &series(vec![])),
            Err(FitError::Data { .. })
        ));
    }
}
