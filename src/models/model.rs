//! Model registry and evaluation for the Arps decline family.
//!
//! The solver relies on two primitive operations per model:
//! - predict `q(t)` given the parameter vector (for residuals/plots)
//! - fill the analytic gradient `∂q/∂θ` at `t` (one Jacobian row)
//!
//! Both are looked up through `REGISTRY`, a static table keyed by `ModelKind`,
//! so adding a model means adding one entry here.
//!
//! Parameter order is always `[qi, di, ...]`.

use crate::domain::{ModelKind, ParamBounds};
use crate::error::FitError;

/// Smallest value a strictly positive parameter is projected onto.
const POSITIVE_FLOOR: f64 = 1e-12;
/// Largest rate or decline the solver may move to.
const POSITIVE_CEILING: f64 = 1e15;

const QI: ParamBounds = ParamBounds::new(POSITIVE_FLOOR, POSITIVE_CEILING);
const DI: ParamBounds = ParamBounds::new(POSITIVE_FLOOR, POSITIVE_CEILING);
const B: ParamBounds = ParamBounds::new(1e-3, 10.0);
const BETA: ParamBounds = ParamBounds::new(1e-3, 1.0);

/// One registry entry: everything the pipeline needs to know about a model.
#[derive(Debug)]
pub struct ModelSpec {
    pub kind: ModelKind,
    pub tag: &'static str,
    pub display_name: &'static str,
    pub param_names: &'static [&'static str],
    pub bounds: &'static [ParamBounds],
    /// Starting values for every parameter after `qi` (which comes from the data).
    pub seeds: &'static [f64],
    pub rate: fn(f64, &[f64]) -> f64,
    pub gradient: fn(f64, &[f64], &mut [f64]),
}

pub static REGISTRY: [ModelSpec; 4] = [
    ModelSpec {
        kind: ModelKind::Exponential,
        tag: "exponential",
        display_name: "Exponential",
        param_names: &["qi", "di"],
        bounds: &[QI, DI],
        seeds: &[DEFAULT_DI_SEED],
        rate: exponential,
        gradient: exponential_gradient,
    },
    ModelSpec {
        kind: ModelKind::Hyperbolic,
        tag: "hyperbolic",
        display_name: "Hyperbolic",
        param_names: &["qi", "di", "b"],
        bounds: &[QI, DI, B],
        seeds: &[DEFAULT_DI_SEED, 1.0],
        rate: hyperbolic,
        gradient: hyperbolic_gradient,
    },
    ModelSpec {
        kind: ModelKind::Harmonic,
        tag: "harmonic",
        display_name: "Harmonic",
        param_names: &["qi", "di"],
        bounds: &[QI, DI],
        seeds: &[DEFAULT_DI_SEED],
        rate: harmonic,
        gradient: harmonic_gradient,
    },
    ModelSpec {
        kind: ModelKind::StretchedExponential,
        tag: "stretched_exponential",
        display_name: "Stretched Exponential",
        param_names: &["qi", "di", "beta"],
        bounds: &[QI, DI, BETA],
        seeds: &[DEFAULT_DI_SEED, 1.0],
        rate: stretched_exponential,
        gradient: stretched_exponential_gradient,
    },
];

/// Default nominal decline-rate seed (per day).
pub const DEFAULT_DI_SEED: f64 = 0.1;

impl ModelKind {
    pub fn spec(self) -> &'static ModelSpec {
        match self {
            ModelKind::Exponential => &REGISTRY[0],
            ModelKind::Hyperbolic => &REGISTRY[1],
            ModelKind::Harmonic => &REGISTRY[2],
            ModelKind::StretchedExponential => &REGISTRY[3],
        }
    }
}

/// Resolve a dispatch tag against the registry.
pub fn lookup(tag: &str) -> Result<&'static ModelSpec, FitError> {
    REGISTRY
        .iter()
        .find(|spec| spec.tag == tag)
        .ok_or_else(|| FitError::UnknownModel {
            tag: tag.to_string(),
        })
}

/// Predict `q(t)` for the given model kind.
///
/// # Panics
/// Panics if `params` is shorter than `kind.param_count()`.
pub fn predict(kind: ModelKind, t: f64, params: &[f64]) -> f64 {
    (kind.spec().rate)(t, params)
}

/// Fill `out` with `∂q/∂θ` at `t`.
///
/// # Panics
/// Panics if `params` or `out` is shorter than `kind.param_count()`.
pub fn fill_gradient(kind: ModelKind, t: f64, params: &[f64], out: &mut [f64]) {
    (kind.spec().gradient)(t, params, out)
}

/// Clamp every parameter onto its bounds in place.
pub fn project(kind: ModelKind, params: &mut [f64]) {
    for (v, b) in params.iter_mut().zip(kind.bounds()) {
        *v = b.clamp(*v);
    }
}

fn exponential(t: f64, p: &[f64]) -> f64 {
    p[0] * (-p[1] * t).exp()
}

fn exponential_gradient(t: f64, p: &[f64], out: &mut [f64]) {
    let e = (-p[1] * t).exp();
    out[0] = e;
    // t·e ≤ 1/(e·di) stays finite; t·qi alone may not.
    out[1] = -(t * e) * p[0];
}

// q = qi * exp(-ln(1 + b*di*t) / b); ln_1p keeps small b*di*t accurate.
fn hyperbolic(t: f64, p: &[f64]) -> f64 {
    let (qi, di, b) = (p[0], p[1], p[2]);
    qi * (-(b * di * t).ln_1p() / b).exp()
}

fn hyperbolic_gradient(t: f64, p: &[f64], out: &mut [f64]) {
    let (qi, di, b) = (p[0], p[1], p[2]);
    let x = b * di * t;
    let z = 1.0 + x;
    let l = x.ln_1p();
    let e = (-l / b).exp();
    let q = qi * e;

    out[0] = e;
    if q == 0.0 {
        out[1] = 0.0;
        out[2] = 0.0;
        return;
    }
    out[1] = -q * (t / z);
    out[2] = q * (l / (b * b) - di * (t / z) / b);
}

fn harmonic(t: f64, p: &[f64]) -> f64 {
    p[0] / (1.0 + p[1] * t)
}

fn harmonic_gradient(t: f64, p: &[f64], out: &mut [f64]) {
    let z = 1.0 + p[1] * t;
    out[0] = 1.0 / z;
    out[1] = -p[0] * (t / z) / z;
}

fn stretched_exponential(t: f64, p: &[f64]) -> f64 {
    let (qi, di, beta) = (p[0], p[1], p[2]);
    qi * (-(di * t).powf(beta)).exp()
}

fn stretched_exponential_gradient(t: f64, p: &[f64], out: &mut [f64]) {
    let (qi, di, beta) = (p[0], p[1], p[2]);
    let x = di * t;
    let u = x.powf(beta);
    let e = (-u).exp();
    let q = qi * e;

    out[0] = e;
    // At t = 0 (or after underflow) every sensitivity except qi vanishes.
    if x <= 0.0 || q == 0.0 {
        out[1] = 0.0;
        out[2] = 0.0;
        return;
    }
    out[1] = -q * beta * u / di;
    out[2] = -q * u * x.ln();
}
