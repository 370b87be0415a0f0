//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - dispatch a model tag to guess → solve → evaluate (`fitter`)
//! - compute fitted values and error metrics (`evaluate`)
//! - compare every model on one series using BIC + guardrails (`selection`)
//! - fit many wells in parallel (`batch`)

pub mod batch;
pub mod evaluate;
pub mod fitter;
pub mod selection;

pub use batch::*;
pub use evaluate::*;
pub use fitter::*;
pub use selection::*;
