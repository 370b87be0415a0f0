//! Model comparison across the whole registry using BIC with a simplicity guardrail.
//!
//! The tool fits every decline model to one series and computes:
//! - SSE / MSE / RMSE
//! - BIC = n * ln(SSE/n) + k * ln(n)
//!
//! Selection rules:
//! 1. Models that fail to fit are recorded as skipped, not fatal
//! 2. Choose the model with minimum BIC
//! 3. If a simpler model is within 2 BIC of the best, pick the simpler model

use serde::Serialize;

use crate::domain::{FitResult, ModelKind, TimeSeries};
use crate::error::FitError;
use crate::fit::fitter::fit_with;
use crate::math::SolverConfig;

/// BIC margin within which the simpler model wins.
const BIC_TIE_MARGIN: f64 = 2.0;

/// A successful fit plus its information criterion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedFit {
    pub fit: FitResult,
    pub bic: f64,
}

/// Output of fitting + selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitSelection {
    pub best: RankedFit,
    /// Fits for all models that converged, in registry order.
    pub fits: Vec<RankedFit>,
    /// Models that could not be fitted and why.
    pub skipped: Vec<(ModelKind, String)>,
}

/// Fit every registry model and select the best one.
///
/// Fails only when no model could be fitted; the first model's error is
/// returned in that case.
pub fn fit_and_select(series: &TimeSeries, config: &SolverConfig) -> Result<FitSelection, FitError> {
    let mut fits = Vec::new();
    let mut skipped = Vec::new();
    let mut first_error = None;

    for kind in ModelKind::ALL {
        match fit_with(series, kind, config) {
            Ok(fit) => {
                let bic = bic(fit.quality().n, fit.quality().sse, kind.param_count());
                fits.push(RankedFit { fit, bic });
            }
            Err(err) => {
                skipped.push((kind, err.to_string()));
                first_error.get_or_insert(err);
            }
        }
    }

    let Some(best) = select_by_bic(&fits) else {
        return Err(first_error.unwrap_or_else(|| FitError::data("no decline models to fit")));
    };

    Ok(FitSelection { best, fits, skipped })
}

fn bic(n: usize, sse: f64, k: usize) -> f64 {
    let n_f = n as f64;
    let sse_per = (sse / n_f).max(1e-12);
    n_f * sse_per.ln() + (k as f64) * n_f.ln()
}

fn select_by_bic(fits: &[RankedFit]) -> Option<RankedFit> {
    let best = fits
        .iter()
        .min_by(|a, b| a.bic.partial_cmp(&b.bic).unwrap_or(std::cmp::Ordering::Equal))?;
    let best_bic = best.bic;

    // Walk from fewest to most parameters; the first fit close enough wins.
    let mut by_complexity: Vec<&RankedFit> = fits.iter().collect();
    by_complexity.sort_by_key(|f| f.fit.kind().param_count());
    by_complexity
        .into_iter()
        .find(|f| f.bic <= best_bic + BIC_TIE_MARGIN)
        .or(Some(best))
        .cloned()
}
