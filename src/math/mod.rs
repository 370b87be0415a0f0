//! Numerical core: the Levenberg–Marquardt solver and its dense linear algebra.

pub mod linalg;
pub mod lm;

pub use linalg::*;
pub use lm::*;
