//! Levenberg–Marquardt solver for nonlinear curve fitting.
//!
//! Minimizes `SSE(θ) = Σ (f(tᵢ, θ) − yᵢ)²` over a small parameter vector:
//!
//! 1. form `J` and `r` at the current `θ`
//! 2. solve `(JᵗJ + λ·diag(JᵗJ)) δ = −Jᵗr`
//! 3. project `θ + δ` onto the model bounds (clamp, so progress continues at a boundary)
//! 4. accept when SSE drops (`λ ÷ 10`), otherwise reject (`λ × 10`)
//!
//! The loop stops on a small projected step, a negligible relative SSE
//! improvement, or an exact fit (`‖r‖ ≤ xtol·‖y‖`, i.e. the data is
//! reproduced to working precision). Running out of iterations is a
//! `FitError::Convergence`; a damped system that stays singular after
//! `max_damping_escalations` consecutive escalations is a
//! `FitError::SingularJacobian`.

use std::str::FromStr;

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::domain::ModelKind;
use crate::error::{AppError, FitError};
use crate::math::linalg::{invert_spd, normal_equations, solve_damped};
use crate::models::{fill_gradient, predict, project};

/// Lower limit for λ after repeated successful steps.
const MIN_LAMBDA: f64 = 1e-12;

/// Solver tuning knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Iteration budget (accepted and rejected steps both count).
    pub max_iterations: usize,
    /// Initial damping factor λ₀.
    pub initial_lambda: f64,
    /// Factor applied to λ after a rejected step.
    pub lambda_up: f64,
    /// Factor applied to λ after an accepted step.
    pub lambda_down: f64,
    /// Relative step tolerance, per parameter.
    pub xtol: f64,
    /// Relative SSE improvement tolerance.
    pub ftol: f64,
    /// Consecutive singular solves tolerated before giving up.
    pub max_damping_escalations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            initial_lambda: 1e-3,
            lambda_up: 10.0,
            lambda_down: 0.1,
            xtol: 1e-8,
            ftol: 1e-10,
            max_damping_escalations: 10,
        }
    }
}

impl SolverConfig {
    /// Defaults overridden by `DCA_*` variables (a `.env` file is honored).
    ///
    /// Recognized keys: `DCA_MAX_ITERATIONS`, `DCA_INITIAL_LAMBDA`, `DCA_XTOL`, `DCA_FTOL`.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        if let Some(v) = env_value("DCA_MAX_ITERATIONS")? {
            config.max_iterations = v;
        }
        if let Some(v) = env_value("DCA_INITIAL_LAMBDA")? {
            config.initial_lambda = v;
        }
        if let Some(v) = env_value("DCA_XTOL")? {
            config.xtol = v;
        }
        if let Some(v) = env_value("DCA_FTOL")? {
            config.ftol = v;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_iterations == 0 {
            return Err(AppError::new(2, "max_iterations must be > 0."));
        }
        let positive = [
            ("initial_lambda", self.initial_lambda),
            ("xtol", self.xtol),
            ("ftol", self.ftol),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(AppError::new(2, format!("{name} must be finite and > 0, got {value}.")));
            }
        }
        if !(self.lambda_up.is_finite() && self.lambda_up > 1.0) {
            return Err(AppError::new(2, "lambda_up must be > 1."));
        }
        if !(self.lambda_down.is_finite() && self.lambda_down > 0.0 && self.lambda_down < 1.0) {
            return Err(AppError::new(2, "lambda_down must be in (0, 1)."));
        }
        Ok(())
    }
}

fn env_value<T>(key: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| AppError::new(2, format!("Invalid {key}='{raw}': {e}"))),
        Err(_) => Ok(None),
    }
}

/// A parametric curve `f(t, θ)` the solver can fit.
pub trait CurveModel {
    fn param_count(&self) -> usize;

    fn evaluate(&self, t: f64, params: &[f64]) -> f64;

    /// Project `params` onto the feasible region in place.
    fn project(&self, params: &mut [f64]);

    /// Fill `out` with `∂f/∂θ` at `t`. Defaults to central finite differences.
    fn fill_jacobian_row(&self, t: f64, params: &[f64], out: &mut [f64]) {
        finite_difference_row(self, t, params, out);
    }
}

impl CurveModel for ModelKind {
    fn param_count(&self) -> usize {
        ModelKind::param_count(*self)
    }

    fn evaluate(&self, t: f64, params: &[f64]) -> f64 {
        predict(*self, t, params)
    }

    fn project(&self, params: &mut [f64]) {
        project(*self, params);
    }

    fn fill_jacobian_row(&self, t: f64, params: &[f64], out: &mut [f64]) {
        fill_gradient(*self, t, params, out);
    }
}

/// Central-difference `∂f/∂θ` at `t`.
pub fn finite_difference_row<M: CurveModel + ?Sized>(model: &M, t: f64, params: &[f64], out: &mut [f64]) {
    let mut work = params.to_vec();
    for j in 0..params.len() {
        let h = f64::EPSILON.cbrt() * params[j].abs().max(1.0);
        work[j] = params[j] + h;
        let up = model.evaluate(t, &work);
        work[j] = params[j] - h;
        let dn = model.evaluate(t, &work);
        work[j] = params[j];
        out[j] = (up - dn) / (2.0 * h);
    }
}

/// Central-difference Jacobian over a whole time grid (`n × p`).
pub fn finite_difference_jacobian<M: CurveModel + ?Sized>(model: &M, time: &[f64], params: &[f64]) -> DMatrix<f64> {
    let mut jac = DMatrix::<f64>::zeros(time.len(), params.len());
    let mut row = vec![0.0; params.len()];
    for (i, &t) in time.iter().enumerate() {
        finite_difference_row(model, t, params, &mut row);
        for (j, &v) in row.iter().enumerate() {
            jac[(i, j)] = v;
        }
    }
    jac
}

/// Converged solver state.
#[derive(Debug, Clone)]
pub struct LmOutcome {
    pub params: Vec<f64>,
    pub sse: f64,
    /// `JᵗJ` at `params`, used for the covariance estimate.
    pub jtj: DMatrix<f64>,
    pub iterations: usize,
    /// SSE at the initial guess followed by every accepted step.
    pub sse_trace: Vec<f64>,
}

impl LmOutcome {
    /// Parameter covariance `σ̂²·(JᵗJ)⁻¹` with `σ̂² = SSE / (n − p)`.
    ///
    /// `None` when `n <= p` or `JᵗJ` cannot be inverted.
    pub fn covariance(&self, n: usize) -> Option<DMatrix<f64>> {
        let p = self.params.len();
        if n <= p {
            return None;
        }
        let sigma2 = self.sse / (n - p) as f64;
        invert_spd(&self.jtj).map(|inv| inv * sigma2)
    }
}

/// Fit `model` to `(time, observed)` starting from `initial`.
pub fn levenberg_marquardt<M: CurveModel + ?Sized>(
    model: &M,
    time: &[f64],
    observed: &[f64],
    initial: &[f64],
    config: &SolverConfig,
) -> Result<LmOutcome, FitError> {
    let n = time.len();
    let p = model.param_count();
    if observed.len() != n || initial.len() != p {
        return Err(FitError::data("solver inputs have inconsistent lengths"));
    }

    let mut params = initial.to_vec();
    model.project(&mut params);

    let mut residuals = DVector::<f64>::zeros(n);
    let mut sse = fill_residuals(model, time, observed, &params, &mut residuals);
    if !sse.is_finite() {
        return Err(FitError::data("initial guess produces non-finite residuals"));
    }

    let mut jac = DMatrix::<f64>::zeros(n, p);
    fill_jacobian(model, time, &params, &mut jac);
    let (mut jtj, mut rhs) = normal_equations(&jac, &residuals);

    let sse_floor = exact_fit_floor(observed, config.xtol);
    let mut sse_trace = vec![sse];
    let mut lambda = config.initial_lambda;
    let mut escalations = 0usize;
    let mut candidate = vec![0.0; p];
    let mut candidate_residuals = DVector::<f64>::zeros(n);

    for iteration in 1..=config.max_iterations {
        if sse <= sse_floor {
            return Ok(finish(params, sse, jtj, iteration - 1, sse_trace));
        }

        let Some(step) = solve_damped(&jtj, &rhs, lambda) else {
            escalations += 1;
            debug!(iteration, lambda, escalations, "singular damped system");
            if escalations > config.max_damping_escalations {
                return Err(FitError::SingularJacobian {
                    iterations: iteration,
                    lambda,
                });
            }
            lambda *= config.lambda_up;
            continue;
        };
        escalations = 0;

        for j in 0..p {
            candidate[j] = params[j] + step[j];
        }
        model.project(&mut candidate);
        let small_step = params
            .iter()
            .zip(candidate.iter())
            .all(|(&old, &new)| (new - old).abs() <= config.xtol * (old.abs() + config.xtol));

        let candidate_sse = fill_residuals(model, time, observed, &candidate, &mut candidate_residuals);

        if candidate_sse.is_finite() && candidate_sse < sse {
            let improvement = sse - candidate_sse;
            let previous = sse;

            params.copy_from_slice(&candidate);
            std::mem::swap(&mut residuals, &mut candidate_residuals);
            sse = candidate_sse;
            sse_trace.push(sse);
            lambda = (lambda * config.lambda_down).max(MIN_LAMBDA);

            fill_jacobian(model, time, &params, &mut jac);
            (jtj, rhs) = normal_equations(&jac, &residuals);

            debug!(iteration, sse, lambda, "accepted step");

            if small_step || improvement <= config.ftol * previous || sse <= sse_floor {
                return Ok(finish(params, sse, jtj, iteration, sse_trace));
            }
        } else {
            lambda *= config.lambda_up;
            debug!(iteration, candidate_sse, lambda, "rejected step");

            // No measurable move is left: the current point is the optimum to working precision.
            if small_step {
                return Ok(finish(params, sse, jtj, iteration, sse_trace));
            }
            if !lambda.is_finite() {
                return Err(FitError::Convergence {
                    iterations: iteration,
                    sse,
                });
            }
        }
    }

    Err(FitError::Convergence {
        iterations: config.max_iterations,
        sse,
    })
}

/// SSE at or below which the residual is round-off relative to the data: `(xtol·‖y‖)²`.
fn exact_fit_floor(observed: &[f64], xtol: f64) -> f64 {
    let y_sq: f64 = observed.iter().map(|y| y * y).sum();
    xtol * xtol * y_sq
}

fn finish(params: Vec<f64>, sse: f64, jtj: DMatrix<f64>, iterations: usize, sse_trace: Vec<f64>) -> LmOutcome {
    LmOutcome {
        params,
        sse,
        jtj,
        iterations,
        sse_trace,
    }
}

/// Fill `r = f(t, θ) − y` and return `Σ r²`.
fn fill_residuals<M: CurveModel + ?Sized>(
    model: &M,
    time: &[f64],
    observed: &[f64],
    params: &[f64],
    out: &mut DVector<f64>,
) -> f64 {
    let mut sse = 0.0;
    for (i, (&t, &y)) in time.iter().zip(observed.iter()).enumerate() {
        let r = model.evaluate(t, params) - y;
        out[i] = r;
        sse += r * r;
    }
    sse
}

fn fill_jacobian<M: CurveModel + ?Sized>(model: &M, time: &[f64], params: &[f64], jac: &mut DMatrix<f64>) {
    let mut row = vec![0.0; params.len()];
    for (i, &t) in time.iter().enumerate() {
        model.fill_jacobian_row(t, params, &mut row);
        for (j, &v) in row.iter().enumerate() {
            jac[(i, j)] = v;
        }
    }
}
