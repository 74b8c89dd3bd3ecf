//! Graph-specific error types.

use lf_core::{BlockId, LfError};

pub type GraphResult<T> = Result<T, GraphError>;

/// Topology and index construction errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Two declarations share a state/output name.
    DuplicateName {
        name: String,
        first: BlockId,
        second: BlockId,
    },

    /// A connection refers to a block that is not part of the network.
    UnknownBlock { block: BlockId, block_count: usize },

    /// Name not found in the index.
    NameNotFound { name: String },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::DuplicateName {
                name,
                first,
                second,
            } => {
                if first == second {
                    write!(f, "Name '{}' is declared twice by block {}", name, first)
                } else {
                    write!(
                        f,
                        "Name '{}' is declared by block {} and again by block {}",
                        name, first, second
                    )
                }
            }
            GraphError::UnknownBlock { block, block_count } => {
                write!(
                    f,
                    "Block {} is not part of the network ({} blocks)",
                    block, block_count
                )
            }
            GraphError::NameNotFound { name } => {
                write!(f, "'{}' not found in network index", name)
            }
        }
    }
}

impl std::error::Error for GraphError {}

impl From<GraphError> for LfError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::DuplicateName { .. } => LfError::Invariant {
                what: "state/output names must be unique",
            },
            GraphError::UnknownBlock { .. } => LfError::InvalidArg {
                what: "unknown block id",
            },
            GraphError::NameNotFound { .. } => LfError::InvalidArg {
                what: "unknown variable name",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_name_display() {
        let err = GraphError::DuplicateName {
            name: "h1".into(),
            first: BlockId::from_index(0),
            second: BlockId::from_index(2),
        };
        let msg = err.to_string();
        assert!(msg.contains("h1"));
        assert!(msg.contains("#0"));
        assert!(msg.contains("#2"));
    }

    #[test]
    fn error_conversion() {
        let err = GraphError::NameNotFound { name: "x".into() };
        let lf: LfError = err.into();
        assert!(matches!(lf, LfError::InvalidArg { .. }));
    }
}
