//! Reporting utilities: per-point residuals, terminal text, and JSON output.

use serde::Serialize;

use crate::domain::{FitResult, TimeSeries};
use crate::error::AppError;
use crate::fit::WellOutcome;

pub mod format;

pub use format::*;

/// Observed vs fitted production at one time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointResidual {
    pub time: f64,
    pub observed: f64,
    pub fitted: f64,
    pub residual: f64,
}

/// Pair each observation with its fitted value.
pub fn compute_residuals(series: &TimeSeries, fit: &FitResult) -> Vec<PointResidual> {
    series
        .time
        .iter()
        .zip(series.production.iter())
        .zip(fit.fitted().iter())
        .map(|((&time, &observed), &fitted)| PointResidual {
            time,
            observed,
            fitted,
            residual: observed - fitted,
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct JsonOutcome<'a, T: Serialize> {
    well: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fit: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Render per-well outcomes as a pretty JSON array.
pub fn outcomes_to_json<T: Serialize>(outcomes: &[WellOutcome<T>]) -> Result<String, AppError> {
    let rows: Vec<JsonOutcome<'_, T>> = outcomes
        .iter()
        .map(|o| JsonOutcome {
            well: &o.name,
            fit: o.result.as_ref().ok(),
            error: o.result.as_ref().err().map(|e| e.to_string()),
        })
        .collect();
    serde_json::to_string_pretty(&rows).map_err(|e| AppError::new(4, format!("Failed to encode JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FitError;
    use crate::fit::fit;

    #[test]
    fn residuals_line_up_with_observations() {
        let series = TimeSeries::new(vec![0.0, 10.0, 20.0, 30.0], vec![100.0, 52.0, 33.0, 25.0]);
        let result = fit(&series, "harmonic").unwrap();
        let rows = compute_residuals(&series, &result);
        assert_eq!(rows.len(), 4);
        for (row, &y) in rows.iter().zip(series.production.iter()) {
            assert_eq!(row.observed, y);
            assert!((row.observed - row.fitted - row.residual).abs() < 1e-12);
        }
    }

    #[test]
    fn json_marks_failures_with_an_error() {
        let outcomes: Vec<WellOutcome<FitResult>> = vec![WellOutcome {
            name: "Well-001".to_string(),
            result: Err(FitError::data("series is empty")),
        }];
        let json = outcomes_to_json(&outcomes).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["well"], "Well-001");
        assert!(value[0]["error"].as_str().unwrap().contains("series is empty"));
        assert!(value[0].get("fit").is_none());
    }
}
