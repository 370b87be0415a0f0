//! Command-line parsing for the decline curve fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use clap::{Parser, Subcommand};

use crate::domain::ModelKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "dca", version, about = "Decline curve analysis: fit Arps-family models to production data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log solver iterations (debug level) to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit one decline model and print parameters, MSE, and the fitted curve.
    Fit(FitArgs),
    /// Fit every decline model and rank them by BIC.
    Compare(FitArgs),
}

/// Common options for fitting and comparing.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Decline model to fit (ignored by `compare`).
    #[arg(short, long, value_enum, default_value_t = ModelKind::Exponential)]
    pub model: ModelKind,

    /// Inline time values in days, comma separated (requires --production).
    #[arg(long, value_delimiter = ',', requires = "production", allow_hyphen_values = true)]
    pub time: Vec<f64>,

    /// Inline production rates, comma separated (requires --time).
    #[arg(long, value_delimiter = ',', requires = "time", allow_hyphen_values = true)]
    pub production: Vec<f64>,

    /// Number of synthetic wells to generate when no inline series is given.
    #[arg(short = 'n', long, default_value_t = 5)]
    pub wells: usize,

    /// Random seed for synthetic wells.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Samples per synthetic well.
    #[arg(long, default_value_t = 24)]
    pub points: usize,

    /// Days between synthetic samples.
    #[arg(long, default_value_t = 30.0)]
    pub step_days: f64,

    /// Log-normal noise sigma for synthetic wells.
    #[arg(long, default_value_t = 0.05)]
    pub noise: f64,

    /// Override the solver iteration budget.
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Print results as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_inline_series() {
        let cli = Cli::parse_from([
            "dca",
            "fit",
            "--model",
            "stretched_exponential",
            "--time",
            "0,30,60,90",
            "--production",
            "500,300,200,150",
        ]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.model, ModelKind::StretchedExponential);
        assert_eq!(args.time, vec![0.0, 30.0, 60.0, 90.0]);
        assert_eq!(args.production.len(), 4);
    }

    #[test]
    fn time_without_production_is_rejected() {
        assert!(Cli::try_parse_from(["dca", "fit", "--time", "0,1"]).is_err());
    }

    #[test]
    fn defaults_to_synthetic_wells() {
        let cli = Cli::parse_from(["dca", "compare", "--json", "-v"]);
        assert!(cli.verbose);
        let Command::Compare(args) = cli.command else {
            panic!("expected compare");
        };
        assert!(args.time.is_empty());
        assert_eq!(args.wells, 5);
        assert!(args.json);
    }
}
