//! Fitting many wells at once.
//!
//! Each well is an independent request: the engine holds no cross-call state,
//! so wells are fitted in parallel with rayon and collected back in input order.

use rayon::prelude::*;
use tracing::warn;

use crate::domain::{FitResult, ModelKind, Well};
use crate::error::FitError;
use crate::fit::fitter::fit_with;
use crate::fit::selection::{FitSelection, fit_and_select};
use crate::math::SolverConfig;

/// Outcome for one well; a failure never affects the other wells.
#[derive(Debug, Clone, PartialEq)]
pub struct WellOutcome<T> {
    pub name: String,
    pub result: Result<T, FitError>,
}

/// Fit one model kind to every well.
pub fn fit_wells(wells: &[Well], kind: ModelKind, config: &SolverConfig) -> Vec<WellOutcome<FitResult>> {
    wells
        .par_iter()
        .map(|well| {
            let result = fit_with(&well.series, kind, config);
            if let Err(err) = &result {
                warn!(well = %well.name, model = kind.tag(), error = %err, "fit failed");
            }
            WellOutcome {
                name: well.name.clone(),
                result,
            }
        })
        .collect()
}

/// Run model comparison for every well.
pub fn compare_wells(wells: &[Well], config: &SolverConfig) -> Vec<WellOutcome<FitSelection>> {
    wells
        .par_iter()
        .map(|well| {
            let result = fit_and_select(&well.series, config);
            if let Err(err) = &result {
                warn!(well = %well.name, error = %err, "no model could be fitted");
            }
            WellOutcome {
                name: well.name.clone(),
                result,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimeSeries;

    fn well(name: &str, qi: f64, di: f64) -> Well {
        let time: Vec<f64> = (0..10).map(|i| i as f64 * 30.0).collect();
        let production = time.iter().map(|&t| qi / (1.0 + di * t)).collect();
        Well {
            name: name.to_string(),
            series: TimeSeries::new(time, production),
        }
    }

    #[test]
    fn batch_matches_sequential_and_keeps_order() {
        let wells = vec![
            well("A", 500.0, 0.01),
            well("B", 1200.0, 0.03),
            Well {
                name: "broken".to_string(),
                series: TimeSeries::new(vec![0.0], vec![1.0]),
            },
            well("C", 300.0, 0.005),
        ];
        let config = SolverConfig::default();
        let batch = fit_wells(&wells, ModelKind::Harmonic, &config);

        let names: Vec<&str> = batch.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "broken", "C"]);
        assert!(matches!(batch[2].result, Err(FitError::Data { .. })));

        for (outcome, w) in batch.iter().zip(wells.iter()) {
            let sequential = fit_with(&w.series, ModelKind::Harmonic, &config);
            assert_eq!(outcome.result, sequential);
        }
    }
}
