use thiserror::Error;

/// Why a fit request produced no result.
///
/// Every variant is recoverable: callers are expected to show a neutral
/// "could not fit" state and keep whatever they displayed before.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// The series is empty, misaligned, too short, or contains invalid values.
    #[error("invalid production data: {reason}")]
    Data { reason: String },

    /// The model tag is not one of the registry entries.
    #[error("unknown decline model '{tag}' (expected exponential, hyperbolic, harmonic or stretched_exponential)")]
    UnknownModel { tag: String },

    /// The iteration budget ran out before the solver met its tolerances.
    #[error("solver did not converge within {iterations} iterations (sse={sse:.6e})")]
    Convergence { iterations: usize, sse: f64 },

    /// The damped normal equations stayed unsolvable after bounded damping escalation.
    #[error("normal equations are singular after {iterations} iterations (lambda={lambda:.3e})")]
    SingularJacobian { iterations: usize, lambda: f64 },
}

impl FitError {
    pub fn data(reason: impl Into<String>) -> Self {
        FitError::Data {
            reason: reason.into(),
        }
    }

    /// Process exit code used when this error terminates the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            FitError::Data { .. } | FitError::UnknownModel { .. } => 3,
            FitError::Convergence { .. } | FitError::SingularJacobian { .. } => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        AppError::new(err.exit_code(), format!("Could not compute fit: {err}"))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_errors_map_to_exit_codes() {
        let data: AppError = FitError::data("empty series").into();
        assert_eq!(data.exit_code(), 3);
        assert!(data.to_string().contains("empty series"));

        let conv: AppError = FitError::Convergence {
            iterations: 200,
            sse: 1.0,
        }
        .into();
        assert_eq!(conv.exit_code(), 4);
    }
}
