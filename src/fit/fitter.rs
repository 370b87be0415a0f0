//! Fit dispatch for a single series and model.
//!
//! Given:
//! - a production series `(tᵢ, qᵢ)`
//! - a model tag (or an already resolved `ModelKind`)
//!
//! we:
//! - validate the series against the model's parameter count
//! - seed `θ₀` from the data
//! - run Levenberg–Marquardt to `θ*`
//! - evaluate the fitted curve, MSE and parameter covariance
//!
//! Every call starts from scratch; nothing is cached between requests.

use tracing::info;

use crate::domain::{DeclineModel, FitResult, ModelKind, TimeSeries};
use crate::error::FitError;
use crate::fit::evaluate::evaluate_fit;
use crate::math::{SolverConfig, levenberg_marquardt};
use crate::models::initial_guess;

/// Fit the model named by `model_tag` with default solver settings.
///
/// `model_tag` is one of `exponential`, `hyperbolic`, `harmonic`,
/// `stretched_exponential`.
pub fn fit(series: &TimeSeries, model_tag: &str) -> Result<FitResult, FitError> {
    let kind = ModelKind::from_tag(model_tag)?;
    fit_kind(series, kind)
}

/// Fit an already resolved model kind with default solver settings.
pub fn fit_kind(series: &TimeSeries, kind: ModelKind) -> Result<FitResult, FitError> {
    fit_with(series, kind, &SolverConfig::default())
}

/// Fit with explicit solver settings.
pub fn fit_with(series: &TimeSeries, kind: ModelKind, config: &SolverConfig) -> Result<FitResult, FitError> {
    series.validate(kind.param_count())?;

    let initial = initial_guess(kind, series)?;
    let outcome = levenberg_marquardt(&kind, &series.time, &series.production, &initial, config)?;

    let model = DeclineModel::from_params(kind, &outcome.params)?;
    if !model.within_bounds() {
        return Err(FitError::Convergence {
            iterations: outcome.iterations,
            sse: outcome.sse,
        });
    }

    let evaluation = evaluate_fit(&model, series)?;
    let covariance = outcome.covariance(series.len()).map(|cov| {
        cov.row_iter()
            .map(|row| row.iter().copied().collect::<Vec<f64>>())
            .collect::<Vec<_>>()
    });

    info!(
        model = kind.tag(),
        iterations = outcome.iterations,
        mse = evaluation.quality.mse,
        "fit converged"
    );

    Ok(FitResult::new(
        model,
        evaluation.fitted,
        evaluation.quality,
        covariance,
        outcome.iterations,
    ))
}
