//! Synthetic decline-curve wells.
//!
//! Each well draws a model kind and in-bounds parameters, is sampled on a
//! regular day grid, and gets multiplicative log-normal noise. Generation is
//! fully determined by the seed so runs are reproducible.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{DeclineModel, ModelKind, TimeSeries, Well};
use crate::error::AppError;

/// Knobs for synthetic well generation.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub wells: usize,
    pub seed: u64,
    pub n_points: usize,
    pub step_days: f64,
    /// Standard deviation of the log-noise (0 disables noise).
    pub noise_sigma: f64,
    /// Force every well to this model; otherwise each well picks one at random.
    pub kind: Option<ModelKind>,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            wells: 5,
            seed: 42,
            n_points: 24,
            step_days: 30.0,
            noise_sigma: 0.05,
            kind: None,
        }
    }
}

/// A generated well plus the model it was drawn from.
#[derive(Debug, Clone)]
pub struct SyntheticWell {
    pub well: Well,
    pub truth: DeclineModel,
}

pub fn generate_wells(config: &SampleConfig) -> Result<Vec<SyntheticWell>, AppError> {
    if config.wells == 0 {
        return Err(AppError::new(2, "Well count must be > 0."));
    }
    if config.n_points < 4 {
        return Err(AppError::new(2, "Each well needs at least 4 points."));
    }
    if !(config.step_days.is_finite() && config.step_days > 0.0) {
        return Err(AppError::new(2, "Step must be a positive number of days."));
    }
    if !(config.noise_sigma.is_finite() && config.noise_sigma >= 0.0) {
        return Err(AppError::new(2, "Noise sigma must be finite and >= 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let time: Vec<f64> = (0..config.n_points)
        .map(|i| i as f64 * config.step_days)
        .collect();

    let mut out = Vec::with_capacity(config.wells);
    for i in 0..config.wells {
        let kind = match config.kind {
            Some(kind) => kind,
            None => ModelKind::ALL[rng.gen_range(0..ModelKind::ALL.len())],
        };
        let truth = draw_model(&mut rng, kind);

        // exp(σz − σ²/2) keeps the noisy rate unbiased in expectation.
        let sigma = config.noise_sigma;
        let production = time
            .iter()
            .map(|&t| {
                let z: f64 = normal.sample(&mut rng);
                truth.rate(t) * (sigma * z - 0.5 * sigma * sigma).exp()
            })
            .collect();

        out.push(SyntheticWell {
            well: Well {
                name: format!("Well-{:03}", i + 1),
                series: TimeSeries::new(time.clone(), production),
            },
            truth,
        });
    }

    Ok(out)
}

/// Realistic parameter ranges: rates in the hundreds to low thousands per day,
/// nominal declines of 0.5%–5% per day.
fn draw_model(rng: &mut StdRng, kind: ModelKind) -> DeclineModel {
    let qi = rng.gen_range(200.0..=2000.0);
    let di = rng.gen_range(0.005..=0.05);
    match kind {
        ModelKind::Exponential => DeclineModel::Exponential { qi, di },
        ModelKind::Harmonic => DeclineModel::Harmonic { qi, di },
        ModelKind::Hyperbolic => DeclineModel::Hyperbolic {
            qi,
            di,
            b: rng.gen_range(0.3..=1.5),
        },
        ModelKind::StretchedExponential => DeclineModel::StretchedExponential {
            qi,
            di,
            beta: rng.gen_range(0.4..=0.95),
        },
    }
}
