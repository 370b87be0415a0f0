//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs logging
//! - resolves solver settings (defaults, `.env`/`DCA_*`, flags)
//! - runs the fit pipeline
//! - prints text reports or JSON

use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::cli::{Command, FitArgs};
use crate::domain::{FitConfig, TimeSeries};
use crate::error::AppError;
use crate::math::SolverConfig;

pub mod pipeline;

/// Entry point for the `dca` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Command::Fit(args) => handle_fit(&args),
        Command::Compare(args) => handle_compare(&args),
    }
}

fn setup_logging(verbose: bool) -> Result<(), AppError> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AppError::new(1, format!("Failed to install logger: {e}")))
}

fn handle_fit(args: &FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(args)?;
    let run = pipeline::run_fit(&config)?;

    if config.json {
        println!("{}", crate::report::outcomes_to_json(&run.outcomes)?);
        return Ok(());
    }

    for (well, outcome) in run.wells.iter().zip(run.outcomes.iter()) {
        if let Ok(fit) = &outcome.result {
            println!("{}", crate::report::format_fit(&well.name, &well.series, fit));
        }
    }
    print!("{}", crate::report::format_failures(&run.outcomes));
    Ok(())
}

fn handle_compare(args: &FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(args)?;
    let run = pipeline::run_compare(&config)?;

    if config.json {
        println!("{}", crate::report::outcomes_to_json(&run.outcomes)?);
        return Ok(());
    }

    for outcome in &run.outcomes {
        if let Ok(selection) = &outcome.result {
            println!("{}", crate::report::format_selection(&outcome.name, selection));
        }
    }
    print!("{}", crate::report::format_failures(&run.outcomes));
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> Result<FitConfig, AppError> {
    let mut solver = SolverConfig::from_env()?;
    if let Some(max_iterations) = args.max_iterations {
        solver.max_iterations = max_iterations;
        solver.validate()?;
    }

    let series = if args.time.is_empty() && args.production.is_empty() {
        None
    } else {
        Some(TimeSeries::new(args.time.clone(), args.production.clone()))
    };

    Ok(FitConfig {
        model: args.model,
        series,
        wells: args.wells,
        seed: args.seed,
        n_points: args.points,
        step_days: args.step_days,
        noise_sigma: args.noise,
        json: args.json,
        solver,
    })
}
