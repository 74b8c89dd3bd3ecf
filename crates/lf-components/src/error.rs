//! Error types for block operations.

use lf_core::error::LfError;
use thiserror::Error;

/// Errors that can occur while a block is fed values or evaluated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("Dimension mismatch in block '{block}': {what} has width {actual}, expected {expected}")]
    DimensionMismatch {
        block: String,
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Block '{block}' is missing input: {what}")]
    MissingInput { block: String, what: &'static str },

    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Unknown variable: {name}")]
    UnknownVariable { name: String },
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl From<ComponentError> for LfError {
    fn from(e: ComponentError) -> Self {
        match e {
            ComponentError::DimensionMismatch { .. } => LfError::Invariant {
                what: "block table width",
            },
            ComponentError::MissingInput { what, .. } => LfError::InvalidArg { what },
            ComponentError::NonPhysical { what } => LfError::InvalidArg { what },
            ComponentError::InvalidArg { what } => LfError::InvalidArg { what },
            ComponentError::UnknownVariable { .. } => LfError::InvalidArg {
                what: "unknown variable",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ComponentError::DimensionMismatch {
            block: "tank".into(),
            what: "residual",
            expected: 2,
            actual: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("tank"));
        assert!(msg.contains("residual"));
    }

    #[test]
    fn error_conversion() {
        let comp_err = ComponentError::InvalidArg { what: "test" };
        let lf_err: LfError = comp_err.into();
        assert!(matches!(lf_err, LfError::InvalidArg { .. }));
    }
}
