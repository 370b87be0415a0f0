//! `decline-curves` library crate.
//!
//! The binary (`dca`) is a thin wrapper around this library so that:
//!
//! - the fitting engine is testable without spawning processes
//! - the engine is reusable by any front-end (dashboards, batch jobs, notebooks)
//! - code stays easy to navigate as the project grows
//!
//! The engine's public entry point is [`fit::fit`]: a production series plus a
//! model tag in, a [`domain::FitResult`] or a typed [`error::FitError`] out.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod math;
pub mod models;
pub mod report;

pub use domain::{DeclineModel, FitResult, ModelKind, TimeSeries};
pub use error::FitError;
pub use fit::fit;
