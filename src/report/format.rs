//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use crate::domain::{FitResult, TimeSeries};
use crate::fit::{FitSelection, WellOutcome};
use crate::report::compute_residuals;

/// Headline error metric, as shown next to the chart in the dashboard.
pub fn format_mse(mse: f64) -> String {
    format!("Mean Squared Error: {mse:.2}")
}

/// Format one fitted model: parameters (± standard error), diagnostics, and
/// the observed vs fitted table.
pub fn format_fit(name: &str, series: &TimeSeries, fit: &FitResult) -> String {
    let mut out = String::new();
    let kind = fit.kind();

    out.push_str(&format!("=== {name}: {} decline ===\n", kind.display_name()));
    out.push_str(&format_params(fit));
    out.push_str(&format!(
        "Points: n={} | SSE={:.4} | RMSE={:.4} | iterations={}\n",
        fit.quality().n,
        fit.quality().sse,
        fit.quality().rmse,
        fit.iterations()
    ));
    out.push_str(&format_mse(fit.mse()));
    out.push_str("\n\n");
    out.push_str(&format_table(series, fit));
    out
}

/// Format a model comparison for one series.
pub fn format_selection(name: &str, selection: &FitSelection) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {name}: model comparison ===\n"));

    for ranked in &selection.fits {
        let kind = ranked.fit.kind();
        let chosen = if kind == selection.best.fit.kind() { "*" } else { " " };
        out.push_str(&format!(
            "{chosen} {:<22} MSE={:<12.4} RMSE={:<10.4} BIC={:.3}\n",
            kind.display_name(),
            ranked.fit.mse(),
            ranked.fit.quality().rmse,
            ranked.bic
        ));
    }
    for (kind, reason) in &selection.skipped {
        out.push_str(&format!("  (skipped {}) {reason}\n", kind.display_name()));
    }

    out.push_str("\nChosen model:\n");
    out.push_str(&format_params(&selection.best.fit));
    out
}

/// One line per failed well, or nothing when all succeeded.
pub fn format_failures<T>(outcomes: &[WellOutcome<T>]) -> String {
    let mut out = String::new();
    for o in outcomes {
        if let Err(err) = &o.result {
            out.push_str(&format!("{}: could not compute fit ({err})\n", o.name));
        }
    }
    out
}

fn format_params(fit: &FitResult) -> String {
    let names = fit.kind().param_names();
    let params = fit.params();
    let errors = fit.standard_errors();

    let mut out = String::new();
    for (i, (name, value)) in names.iter().zip(params.iter()).enumerate() {
        match errors.as_ref().and_then(|se| se.get(i)) {
            Some(se) => out.push_str(&format!("- {name:<5} = {value:.6} ± {se:.6}\n")),
            None => out.push_str(&format!("- {name:<5} = {value:.6}\n")),
        }
    }
    out
}

fn format_table(series: &TimeSeries, fit: &FitResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>10} {:>14} {:>14} {:>14}\n",
        "time", "observed", "fitted", "residual"
    ));
    out.push_str(&format!(
        "{:->10} {:->14} {:->14} {:->14}\n",
        "", "", "", ""
    ));
    for row in compute_residuals(series, fit) {
        out.push_str(&format!(
            "{:>10.1} {:>14.3} {:>14.3} {:>14.3}\n",
            row.time, row.observed, row.fitted, row.residual
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::fit;
    use crate::fit::fit_and_select;
    use crate::math::SolverConfig;

    fn series() -> TimeSeries {
        let time: Vec<f64> = (0..8).map(|i| i as f64 * 30.0).collect();
        let production = time.iter().map(|&t| 700.0 * (-0.01 * t).exp()).collect();
        TimeSeries::new(time, production)
    }

    #[test]
    fn mse_line_uses_two_decimals() {
        assert_eq!(format_mse(1.23456), "Mean Squared Error: 1.23");
    }

    #[test]
    fn fit_report_lists_parameters_and_rows() {
        let s = series();
        let result = fit(&s, "exponential").unwrap();
        let text = format_fit("Well-001", &s, &result);
        assert!(text.contains("Exponential decline"));
        assert!(text.contains("- qi"));
        assert!(text.contains("- di"));
        assert!(text.contains("Mean Squared Error: 0.00"));
        // Header, rule, and one row per observation.
        assert_eq!(text.lines().filter(|l| l.trim_start().starts_with(|c: char| c.is_ascii_digit())).count(), 8);
    }

    #[test]
    fn selection_report_marks_the_chosen_model() {
        let selection = fit_and_select(&series(), &SolverConfig::default()).unwrap();
        let text = format_selection("Well-001", &selection);
        assert!(text.contains("model comparison"));
        assert!(text.lines().any(|l| l.starts_with('*')));
    }
}
