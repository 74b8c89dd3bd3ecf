//! Error types for solver operations.

use lf_core::error::LfError;
use thiserror::Error;

/// Errors that can occur while solving a nonlinear system.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Residual has {equations} equations for {unknowns} unknowns")]
    DimensionMismatch { unknowns: usize, equations: usize },

    #[error("Non-finite residual: {what}")]
    NonFinite { what: String },

    #[error("Residual evaluation failed: {what}")]
    ResidualFailed { what: String },

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for LfError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::DimensionMismatch { .. } => LfError::InvalidArg {
                what: "residual dimension",
            },
            SolverError::NonFinite { .. } => LfError::InvalidArg { what: "non-finite" },
            SolverError::ResidualFailed { .. } => LfError::InvalidArg { what: "residual" },
            SolverError::Numeric { .. } => LfError::InvalidArg { what: "numeric" },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SolverError::DimensionMismatch {
            unknowns: 3,
            equations: 2,
        };
        assert_eq!(err.to_string(), "Residual has 2 equations for 3 unknowns");
    }

    #[test]
    fn error_conversion() {
        let lf: LfError = SolverError::Numeric { what: "lu".into() }.into();
        assert!(matches!(lf, LfError::InvalidArg { what: "numeric" }));
    }
}
