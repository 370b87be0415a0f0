//! Input data sources for the CLI.
//!
//! The fitting core never loads data itself; callers hand it a `TimeSeries`.
//! This module only provides the synthetic multi-well dataset used by `dca`
//! when no inline series is given.

pub mod sample;

pub use sample::*;
