//! Read-only view of the network handed to [`Block::update_inputs`].
//!
//! [`Block::update_inputs`]: crate::Block::update_inputs

use crate::block::{NodeTables, Signals};
use crate::error::{ComponentError, ComponentResult};
use lf_core::BlockId;
use lf_graph::{Connections, NetworkIndex, VarKind};
use nalgebra::DVector;

/// Everything a block may read while pulling its inputs.
///
/// Carries the block's own id, the network connectivity, the signals every
/// block published after `set_values`, and the current global node tables.
#[derive(Clone, Copy)]
pub struct InputContext<'a> {
    block: BlockId,
    connections: &'a Connections,
    signals: &'a [Signals],
    index: &'a NetworkIndex,
    tables: NodeTables<'a>,
}

impl<'a> InputContext<'a> {
    pub fn new(
        block: BlockId,
        connections: &'a Connections,
        signals: &'a [Signals],
        index: &'a NetworkIndex,
        tables: NodeTables<'a>,
    ) -> Self {
        Self {
            block,
            connections,
            signals,
            index,
            tables,
        }
    }

    /// The block being updated.
    pub fn block(&self) -> BlockId {
        self.block
    }

    pub fn n_nodes(&self) -> usize {
        self.tables.n_nodes()
    }

    pub fn tables(&self) -> NodeTables<'a> {
        self.tables
    }

    /// Signals of upstream neighbors, in connection order.
    pub fn inlets(&self) -> impl Iterator<Item = &'a Signals> + '_ {
        self.connections
            .inlets(self.block)
            .iter()
            .filter_map(|id| self.signals.get(id.slot()))
    }

    /// Signals of downstream neighbors, in connection order.
    pub fn outlets(&self) -> impl Iterator<Item = &'a Signals> + '_ {
        self.connections
            .outlets(self.block)
            .iter()
            .filter_map(|id| self.signals.get(id.slot()))
    }

    /// Sum of the flows published by upstream neighbors (zero if none).
    ///
    /// A neighbor flow whose width differs from the node count is a
    /// [`ComponentError::DimensionMismatch`].
    pub fn inflow(&self) -> ComponentResult<DVector<f64>> {
        self.sum_flows(self.inlets())
    }

    /// Sum of the flows published by downstream neighbors (zero if none).
    pub fn outflow(&self) -> ComponentResult<DVector<f64>> {
        self.sum_flows(self.outlets())
    }

    /// Level published by the first upstream neighbor that has one.
    pub fn upstream_level(&self) -> Option<DVector<f64>> {
        self.inlets().find_map(|s| s.level.clone())
    }

    /// Any global state or output column by name.
    pub fn value(&self, name: &str) -> ComponentResult<DVector<f64>> {
        let (kind, offset) =
            self.index
                .lookup(name)
                .ok_or_else(|| ComponentError::UnknownVariable {
                    name: name.to_string(),
                })?;
        let table = match kind {
            VarKind::State => self.tables.x,
            VarKind::Output => self.tables.y,
        };
        Ok(table.column(offset).into_owned())
    }

    fn sum_flows<'s>(
        &self,
        neighbors: impl Iterator<Item = &'s Signals>,
    ) -> ComponentResult<DVector<f64>> {
        let mut total = DVector::zeros(self.n_nodes());
        for flow in neighbors.filter_map(|s| s.flow.as_ref()) {
            if flow.len() != total.len() {
                return Err(ComponentError::DimensionMismatch {
                    block: self.block.to_string(),
                    what: "neighbor flow",
                    expected: total.len(),
                    actual: flow.len(),
                });
            }
            total += flow;
        }
        Ok(total)
    }
}
