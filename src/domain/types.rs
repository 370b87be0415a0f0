//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - printed as JSON by the CLI
//! - handed back to any caller that wants to plot the fitted curve

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::FitError;
use crate::math::SolverConfig;

/// A single well's production history.
///
/// `time[i]` is elapsed time (days) and `production[i]` the observed rate at
/// that time. The fitting core only reads the series; validation happens in
/// the dispatcher so that malformed input surfaces as `FitError::Data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub time: Vec<f64>,
    pub production: Vec<f64>,
}

impl TimeSeries {
    pub fn new(time: Vec<f64>, production: Vec<f64>) -> Self {
        Self { time, production }
    }

    pub fn len(&self) -> usize {
        self.production.len()
    }

    pub fn is_empty(&self) -> bool {
        self.production.is_empty()
    }

    /// Check the series is usable for a model with `param_count` parameters.
    ///
    /// Requirements: aligned, at least `param_count + 1` samples, finite values,
    /// `time >= 0` and non-decreasing, `production > 0`.
    pub fn validate(&self, param_count: usize) -> Result<(), FitError> {
        if self.production.is_empty() || self.time.is_empty() {
            return Err(FitError::data("series is empty"));
        }
        if self.time.len() != self.production.len() {
            return Err(FitError::data(format!(
                "time has {} samples but production has {}",
                self.time.len(),
                self.production.len()
            )));
        }
        let min_len = param_count + 1;
        if self.len() < min_len {
            return Err(FitError::data(format!(
                "need at least {min_len} samples for {param_count} parameters, got {}",
                self.len()
            )));
        }

        let mut prev = 0.0_f64;
        for (i, (&t, &q)) in self.time.iter().zip(self.production.iter()).enumerate() {
            if !t.is_finite() || !q.is_finite() {
                return Err(FitError::data(format!("non-finite value at index {i}")));
            }
            if t < 0.0 {
                return Err(FitError::data(format!("negative time {t} at index {i}")));
            }
            if t < prev {
                return Err(FitError::data(format!("time decreases at index {i}")));
            }
            if q <= 0.0 {
                return Err(FitError::data(format!(
                    "non-positive production {q} at index {i}"
                )));
            }
            prev = t;
        }
        Ok(())
    }
}

/// A named production series (one column of a multi-well dataset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Well {
    pub name: String,
    pub series: TimeSeries,
}

/// The closed set of decline models the engine can fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Exponential,
    Hyperbolic,
    Harmonic,
    #[value(name = "stretched_exponential")]
    StretchedExponential,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::Exponential,
        ModelKind::Hyperbolic,
        ModelKind::Harmonic,
        ModelKind::StretchedExponential,
    ];

    /// Dispatch tag used by callers and in reports.
    pub fn tag(self) -> &'static str {
        self.spec().tag
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        self.spec().display_name
    }

    pub fn param_count(self) -> usize {
        self.spec().param_names.len()
    }

    pub fn param_names(self) -> &'static [&'static str] {
        self.spec().param_names
    }

    pub fn bounds(self) -> &'static [ParamBounds] {
        self.spec().bounds
    }

    /// Resolve a dispatch tag (e.g. `"stretched_exponential"`).
    pub fn from_tag(tag: &str) -> Result<ModelKind, FitError> {
        crate::models::lookup(tag).map(|spec| spec.kind)
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Closed interval a parameter must stay inside, both at the solution and
/// during solver iterations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamBounds {
    pub lower: f64,
    pub upper: f64,
}

impl ParamBounds {
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.lower && value <= self.upper
    }

    /// Project `value` onto the interval. NaN maps to the lower bound.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.lower
        } else {
            value.clamp(self.lower, self.upper)
        }
    }
}

/// A decline model instance with its own parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum DeclineModel {
    Exponential { qi: f64, di: f64 },
    Hyperbolic { qi: f64, di: f64, b: f64 },
    Harmonic { qi: f64, di: f64 },
    StretchedExponential { qi: f64, di: f64, beta: f64 },
}

impl DeclineModel {
    /// Build a model from a parameter vector ordered as `kind.param_names()`.
    pub fn from_params(kind: ModelKind, params: &[f64]) -> Result<DeclineModel, FitError> {
        if params.len() != kind.param_count() {
            return Err(FitError::data(format!(
                "{} expects {} parameters, got {}",
                kind.tag(),
                kind.param_count(),
                params.len()
            )));
        }
        let model = match kind {
            ModelKind::Exponential => DeclineModel::Exponential {
                qi: params[0],
                di: params[1],
            },
            ModelKind::Hyperbolic => DeclineModel::Hyperbolic {
                qi: params[0],
                di: params[1],
                b: params[2],
            },
            ModelKind::Harmonic => DeclineModel::Harmonic {
                qi: params[0],
                di: params[1],
            },
            ModelKind::StretchedExponential => DeclineModel::StretchedExponential {
                qi: params[0],
                di: params[1],
                beta: params[2],
            },
        };
        Ok(model)
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            DeclineModel::Exponential { .. } => ModelKind::Exponential,
            DeclineModel::Hyperbolic { .. } => ModelKind::Hyperbolic,
            DeclineModel::Harmonic { .. } => ModelKind::Harmonic,
            DeclineModel::StretchedExponential { .. } => ModelKind::StretchedExponential,
        }
    }

    /// Parameters in registry order.
    pub fn params(&self) -> Vec<f64> {
        match *self {
            DeclineModel::Exponential { qi, di } | DeclineModel::Harmonic { qi, di } => {
                vec![qi, di]
            }
            DeclineModel::Hyperbolic { qi, di, b } => vec![qi, di, b],
            DeclineModel::StretchedExponential { qi, di, beta } => vec![qi, di, beta],
        }
    }

    pub fn qi(&self) -> f64 {
        match *self {
            DeclineModel::Exponential { qi, .. }
            | DeclineModel::Hyperbolic { qi, .. }
            | DeclineModel::Harmonic { qi, .. }
            | DeclineModel::StretchedExponential { qi, .. } => qi,
        }
    }

    pub fn di(&self) -> f64 {
        match *self {
            DeclineModel::Exponential { di, .. }
            | DeclineModel::Hyperbolic { di, .. }
            | DeclineModel::Harmonic { di, .. }
            | DeclineModel::StretchedExponential { di, .. } => di,
        }
    }

    /// Production rate at time `t`.
    pub fn rate(&self, t: f64) -> f64 {
        crate::models::predict(self.kind(), t, &self.params())
    }

    /// True when every parameter lies inside its declared bounds.
    pub fn within_bounds(&self) -> bool {
        self.params()
            .iter()
            .zip(self.kind().bounds())
            .all(|(&v, b)| b.contains(v))
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub mse: f64,
    pub rmse: f64,
    pub n: usize,
}

/// Output of a successful fit. Built once per request and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitResult {
    model: DeclineModel,
    fitted: Vec<f64>,
    quality: FitQuality,
    covariance: Option<Vec<Vec<f64>>>,
    iterations: usize,
}

impl FitResult {
    pub(crate) fn new(
        model: DeclineModel,
        fitted: Vec<f64>,
        quality: FitQuality,
        covariance: Option<Vec<Vec<f64>>>,
        iterations: usize,
    ) -> Self {
        Self {
            model,
            fitted,
            quality,
            covariance,
            iterations,
        }
    }

    pub fn model(&self) -> &DeclineModel {
        &self.model
    }

    pub fn kind(&self) -> ModelKind {
        self.model.kind()
    }

    pub fn params(&self) -> Vec<f64> {
        self.model.params()
    }

    /// Fitted production at each input time, same length as the input.
    pub fn fitted(&self) -> &[f64] {
        &self.fitted
    }

    pub fn mse(&self) -> f64 {
        self.quality.mse
    }

    pub fn quality(&self) -> &FitQuality {
        &self.quality
    }

    /// Parameter covariance (`p × p`), omitted when `n <= p` or `JᵗJ` is singular.
    pub fn covariance(&self) -> Option<&[Vec<f64>]> {
        self.covariance.as_deref()
    }

    /// Square roots of the covariance diagonal.
    pub fn standard_errors(&self) -> Option<Vec<f64>> {
        self.covariance.as_ref().map(|cov| {
            cov.iter()
                .enumerate()
                .map(|(i, row)| row[i].max(0.0).sqrt())
                .collect()
        })
    }

    /// Solver iterations spent (accepted and rejected steps).
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Evaluate the fitted model on `n` evenly spaced times in `[0, t_max]`.
    pub fn curve_grid(&self, t_max: f64, n: usize) -> CurveGrid {
        let n = n.max(2);
        let t_max = if t_max.is_finite() && t_max > 0.0 { t_max } else { 1.0 };

        let mut time = Vec::with_capacity(n);
        let mut rate = Vec::with_capacity(n);
        for i in 0..n {
            let t = t_max * i as f64 / (n as f64 - 1.0);
            time.push(t);
            rate.push(self.model.rate(t));
        }
        CurveGrid { time, rate }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveGrid {
    pub time: Vec<f64>,
    pub rate: Vec<f64>,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub model: ModelKind,
    /// Inline series; when absent the run fits synthetic wells.
    pub series: Option<TimeSeries>,

    pub wells: usize,
    pub seed: u64,
    pub n_points: usize,
    pub step_days: f64,
    pub noise_sigma: f64,

    pub json: bool,
    pub solver: SolverConfig,
}
