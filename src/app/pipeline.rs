//! Shared "fit pipeline" logic behind the `fit` and `compare` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! inline series or synthetic wells -> per-well fit (parallel) -> outcomes
//!
//! The CLI can then focus on presentation (text vs JSON).

use crate::data::{SampleConfig, generate_wells};
use crate::domain::{FitConfig, FitResult, Well};
use crate::error::AppError;
use crate::fit::{FitSelection, WellOutcome, compare_wells, fit_wells};

/// Name used for a series passed inline on the command line.
pub const INLINE_WELL_NAME: &str = "inline";

/// Wells and their outcomes, in the same order.
#[derive(Debug, Clone)]
pub struct RunOutput<T> {
    pub wells: Vec<Well>,
    pub outcomes: Vec<WellOutcome<T>>,
}

/// Resolve the wells a run operates on.
pub fn load_wells(config: &FitConfig) -> Result<Vec<Well>, AppError> {
    if let Some(series) = &config.series {
        return Ok(vec![Well {
            name: INLINE_WELL_NAME.to_string(),
            series: series.clone(),
        }]);
    }

    let sample = SampleConfig {
        wells: config.wells,
        seed: config.seed,
        n_points: config.n_points,
        step_days: config.step_days,
        noise_sigma: config.noise_sigma,
        kind: None,
    };
    Ok(generate_wells(&sample)?.into_iter().map(|s| s.well).collect())
}

/// Fit `config.model` to every well.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput<FitResult>, AppError> {
    let wells = load_wells(config)?;
    let outcomes = fit_wells(&wells, config.model, &config.solver);
    ensure_any_success(&outcomes)?;
    Ok(RunOutput { wells, outcomes })
}

/// Compare every model on every well.
pub fn run_compare(config: &FitConfig) -> Result<RunOutput<FitSelection>, AppError> {
    let wells = load_wells(config)?;
    let outcomes = compare_wells(&wells, &config.solver);
    ensure_any_success(&outcomes)?;
    Ok(RunOutput { wells, outcomes })
}

/// A run fails only when no well produced a result; partial failures are reported per well.
fn ensure_any_success<T>(outcomes: &[WellOutcome<T>]) -> Result<(), AppError> {
    if outcomes.iter().any(|o| o.result.is_ok()) {
        return Ok(());
    }
    match outcomes.iter().find_map(|o| o.result.as_ref().err()) {
        Some(err) => Err(err.clone().into()),
        None => Err(AppError::new(3, "No wells to fit.")),
    }
}
