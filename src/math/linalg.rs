//! Small dense linear algebra for the solver.
//!
//! Each Levenberg–Marquardt iteration solves a tiny (2–3 column) system:
//!
//! ```text
//! (JᵗJ + λ·diag(JᵗJ)) δ = −Jᵗr
//! ```
//!
//! Implementation choices:
//! - Columns of `J` have wildly different scales (`qi` in rate units, `di` per
//!   day), so we Jacobi-scale the system first. With `S = diag(JᵗJ)^(-1/2)`
//!   the damped matrix becomes `S·JᵗJ·S + λI`, which is the same step as the
//!   Marquardt form above but much better conditioned.
//! - We solve with Cholesky: the damped matrix is symmetric positive definite
//!   unless `J` is rank deficient, in which case we report failure and let the
//!   solver escalate damping.

use nalgebra::{DMatrix, DVector};

/// Form the normal equations `(JᵗJ, −Jᵗr)`.
pub fn normal_equations(jac: &DMatrix<f64>, residuals: &DVector<f64>) -> (DMatrix<f64>, DVector<f64>) {
    let jt = jac.transpose();
    let jtj = &jt * jac;
    let rhs = -(&jt * residuals);
    (jtj, rhs)
}

/// Solve the Marquardt-damped normal equations.
///
/// Returns `None` if the system is singular to working precision (a zero or
/// non-finite diagonal, a failed factorization, or a non-finite step).
pub fn solve_damped(jtj: &DMatrix<f64>, rhs: &DVector<f64>, lambda: f64) -> Option<DVector<f64>> {
    let p = jtj.nrows();
    if p == 0 || jtj.ncols() != p || rhs.len() != p {
        return None;
    }

    let mut scale = DVector::<f64>::zeros(p);
    for i in 0..p {
        let d = jtj[(i, i)];
        if !(d.is_finite() && d > 0.0) {
            return None;
        }
        scale[i] = 1.0 / d.sqrt();
    }

    let mut a = DMatrix::<f64>::zeros(p, p);
    for i in 0..p {
        for j in 0..p {
            a[(i, j)] = jtj[(i, j)] * scale[i] * scale[j];
        }
        a[(i, i)] += lambda;
    }
    let b = rhs.component_mul(&scale);

    let z = a.cholesky()?.solve(&b);
    let step = z.component_mul(&scale);
    if step.iter().all(|v| v.is_finite()) {
        Some(step)
    } else {
        None
    }
}

/// Invert a symmetric positive definite matrix (e.g. `JᵗJ` at the optimum).
///
/// Returns `None` when the matrix is singular or the inverse is non-finite.
pub fn invert_spd(m: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let inv = m.clone().cholesky()?.inverse();
    if inv.iter().all(|v| v.is_finite()) {
        Some(inv)
    } else {
        None
    }
}
