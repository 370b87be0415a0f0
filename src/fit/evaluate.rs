//! Goodness-of-fit for a converged model.

use crate::domain::{DeclineModel, FitQuality, TimeSeries};
use crate::error::FitError;

/// Fitted curve at the input times plus its error metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub fitted: Vec<f64>,
    pub quality: FitQuality,
}

/// Evaluate `model` at every input time and compute SSE / MSE / RMSE.
pub fn evaluate_fit(model: &DeclineModel, series: &TimeSeries) -> Result<Evaluation, FitError> {
    let n = series.len();
    if n == 0 || series.time.len() != n {
        return Err(FitError::data("cannot evaluate a fit on an empty or misaligned series"));
    }

    let mut fitted = Vec::with_capacity(n);
    let mut sse = 0.0;
    for (i, (&t, &y)) in series.time.iter().zip(series.production.iter()).enumerate() {
        let q = model.rate(t);
        if !(q.is_finite() && y.is_finite()) {
            return Err(FitError::data(format!("non-finite fitted value at index {i}")));
        }
        let r = q - y;
        sse += r * r;
        fitted.push(q);
    }

    let mse = sse / n as f64;
    Ok(Evaluation {
        fitted,
        quality: FitQuality {
            sse,
            mse,
            rmse: mse.sqrt(),
            n,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mse_is_mean_of_squared_residuals() {
        let model = DeclineModel::Harmonic { qi: 100.0, di: 0.1 };
        // Exact values are [100, 50, 25]; observations are off by +2, -1, 0.
        let series = TimeSeries::new(vec![0.0, 10.0, 30.0], vec![102.0, 49.0, 25.0]);
        let eval = evaluate_fit(&model, &series).unwrap();

        assert_eq!(eval.fitted.len(), 3);
        assert_relative_eq!(eval.fitted[1], 50.0, epsilon = 1e-12);
        assert_relative_eq!(eval.quality.sse, 5.0, epsilon = 1e-12);
        assert_relative_eq!(eval.quality.mse, 5.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(eval.quality.rmse, (5.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn non_finite_observation_is_a_data_error() {
        let model = DeclineModel::Exponential { qi: 100.0, di: 0.1 };
        let series = TimeSeries::new(vec![0.0, 1.0], vec![100.0, f64::NAN]);
        assert!(matches!(evaluate_fit(&model, &series), Err(FitError::Data { .. })));
    }
}
