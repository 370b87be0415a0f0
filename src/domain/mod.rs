//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the production series handed in by callers (`TimeSeries`)
//! - the closed set of decline models (`ModelKind`, `DeclineModel`)
//! - fit outputs (`FitResult`, `FitQuality`)
//! - the run configuration derived from CLI flags (`FitConfig`)

pub mod types;

pub use types::*;
