//! lf-graph: network topology layer for lumpflow.
//!
//! Provides:
//! - Directed producer -> consumer connectivity between blocks
//! - Block layouts (ordered state and output names)
//! - The network index: disjoint global offsets for every state and output
//!
//! # Example
//!
//! ```
//! use lf_graph::{BlockLayout, Connections, NetworkIndex};
//! use lf_core::BlockId;
//!
//! let layouts = [
//!     BlockLayout::new(Vec::<String>::new(), ["Qin"]),
//!     BlockLayout::new(["V1"], ["h1"]),
//! ];
//! let index = NetworkIndex::from_layouts(&layouts).unwrap();
//! assert_eq!(index.num_states(), 1);
//! assert_eq!(index.num_outputs(), 2);
//!
//! let mut connections = Connections::new(2);
//! connections.connect(BlockId::from_index(0), BlockId::from_index(1)).unwrap();
//! assert_eq!(connections.inlets(BlockId::from_index(1)), &[BlockId::from_index(0)]);
//! ```

pub mod connections;
pub mod error;
pub mod indexing;
pub(crate) mod validate;

pub use connections::Connections;
pub use error::{GraphError, GraphResult};
pub use indexing::{BlockLayout, BlockSlots, NetworkIndex, VarKind};
