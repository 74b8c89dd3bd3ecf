//! Error types for simulation operations.

use lf_components::ComponentError;
use lf_core::error::LfError;
use lf_graph::GraphError;
use lf_solver::SolverError;
use thiserror::Error;

/// Errors encountered while building or stepping a flowsheet.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Unsupported collocation order {n}: expected 2..=6 nodes")]
    UnsupportedOrder { n: usize },

    #[error("Duplicate variable name '{name}'")]
    DuplicateName { name: String },

    #[error("Dimension mismatch in block '{block}': {what} has width {actual}, expected {expected}")]
    DimensionMismatch {
        block: String,
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("Flowsheet is not initialized")]
    NotInitialized,

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Root-finder did not converge at t = {time} (residual norm {residual_norm:e})")]
    NotConverged { time: f64, residual_norm: f64 },

    #[error("Graph error: {0}")]
    Graph(GraphError),

    #[error("Block error: {0}")]
    Component(ComponentError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Core(#[from] LfError),
}

pub type SimResult<T> = Result<T, SimError>;

impl From<GraphError> for SimError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::DuplicateName { name, .. } => SimError::DuplicateName { name },
            other => SimError::Graph(other),
        }
    }
}

impl From<ComponentError> for SimError {
    fn from(e: ComponentError) -> Self {
        match e {
            ComponentError::DimensionMismatch {
                block,
                what,
                expected,
                actual,
            } => SimError::DimensionMismatch {
                block,
                what: what.to_string(),
                expected,
                actual,
            },
            other => SimError::Component(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_core::BlockId;

    #[test]
    fn duplicate_name_is_lifted() {
        let e: SimError = GraphError::DuplicateName {
            name: "h1".into(),
            first: BlockId::from_index(0),
            second: BlockId::from_index(2),
        }
        .into();
        assert_eq!(e, SimError::DuplicateName { name: "h1".into() });
    }

    #[test]
    fn dimension_mismatch_is_lifted() {
        let e: SimError = ComponentError::DimensionMismatch {
            block: "tank".into(),
            what: "outputs",
            expected: 1,
            actual: 2,
        }
        .into();
        assert!(matches!(e, SimError::DimensionMismatch { expected: 1, actual: 2, .. }));
        assert!(e.to_string().contains("tank"));
    }

    #[test]
    fn other_block_errors_are_wrapped() {
        let e: SimError = ComponentError::InvalidArg { what: "x" }.into();
        assert!(matches!(e, SimError::Component(_)));
    }
}
