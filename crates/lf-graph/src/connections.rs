//! Directed connectivity between blocks.

use lf_core::BlockId;

use crate::error::{GraphError, GraphResult};

/// Producer -> consumer edges between the blocks of one network.
///
/// Blocks are addressed by their position in declaration order. The graph is
/// directed but not required to be acyclic, and parallel edges are kept: a
/// block connected twice to the same neighbor sees that neighbor twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Connections {
    inlets: Vec<Vec<BlockId>>,
    outlets: Vec<Vec<BlockId>>,
}

impl Connections {
    /// Empty connectivity for `block_count` blocks.
    pub fn new(block_count: usize) -> Self {
        Self {
            inlets: vec![Vec::new(); block_count],
            outlets: vec![Vec::new(); block_count],
        }
    }

    pub fn block_count(&self) -> usize {
        self.inlets.len()
    }

    /// Register a slot for one more block and return its id.
    pub fn add_block(&mut self) -> BlockId {
        let id = BlockId::from_index(self.inlets.len() as u32);
        self.inlets.push(Vec::new());
        self.outlets.push(Vec::new());
        id
    }

    /// Connect the outlet of `producer` to the inlet of `consumer`.
    pub fn connect(&mut self, producer: BlockId, consumer: BlockId) -> GraphResult<()> {
        self.check(producer)?;
        self.check(consumer)?;
        self.outlets[producer.slot()].push(consumer);
        self.inlets[consumer.slot()].push(producer);
        Ok(())
    }

    /// Upstream neighbors of `id` in connection order.
    pub fn inlets(&self, id: BlockId) -> &[BlockId] {
        self.inlets.get(id.slot()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Downstream neighbors of `id` in connection order.
    pub fn outlets(&self, id: BlockId) -> &[BlockId] {
        self.outlets.get(id.slot()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All edges as `(producer, consumer)` pairs, grouped by producer.
    pub fn edges(&self) -> impl Iterator<Item = (BlockId, BlockId)> + '_ {
        self.outlets.iter().enumerate().flat_map(|(i, outs)| {
            let producer = BlockId::from_index(i as u32);
            outs.iter().map(move |&consumer| (producer, consumer))
        })
    }

    pub fn edge_count(&self) -> usize {
        self.outlets.iter().map(Vec::len).sum()
    }

    fn check(&self, id: BlockId) -> GraphResult<()> {
        if id.slot() < self.block_count() {
            Ok(())
        } else {
            Err(GraphError::UnknownBlock {
                block: id,
                block_count: self.block_count(),
            })
        }
    }
}
