//! Arps-family decline model implementations.
//!
//! Models are implemented as small, pure functions behind a static registry so
//! that guess/solve/evaluate code can stay generic over the model kind.

pub mod guess;
pub mod model;

pub use guess::*;
pub use model::*;
