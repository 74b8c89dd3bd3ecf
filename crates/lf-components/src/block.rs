//! The contract every network element implements.

use crate::context::InputContext;
use crate::error::{ComponentError, ComponentResult};
use lf_graph::{BlockLayout, BlockSlots};
use nalgebra::{DMatrix, DMatrixView, DVector};

/// Global values for the interior nodes of one finite element.
///
/// Every table has one row per node. `xdot` and `x` have one column per
/// global state, `y` one column per global output.
#[derive(Clone, Copy, Debug)]
pub struct NodeTables<'a> {
    pub xdot: &'a DMatrix<f64>,
    pub x: &'a DMatrix<f64>,
    pub y: &'a DMatrix<f64>,
    /// Absolute time of each node.
    pub t: &'a [f64],
}

impl<'a> NodeTables<'a> {
    pub fn n_nodes(&self) -> usize {
        self.t.len()
    }

    /// The columns owned by one block.
    pub fn block_view(&self, slots: &BlockSlots) -> NodeValues<'a> {
        NodeValues {
            xdot: self.xdot.columns(slots.states.start, slots.states.len()),
            x: self.x.columns(slots.states.start, slots.states.len()),
            y: self.y.columns(slots.outputs.start, slots.outputs.len()),
            t: self.t,
        }
    }
}

/// One block's slice of the node tables, as handed to [`Block::set_values`].
///
/// Column `j` of `xdot`/`x` is the block's `j`-th declared state, column `j`
/// of `y` its `j`-th declared output.
#[derive(Clone, Copy, Debug)]
pub struct NodeValues<'a> {
    pub xdot: DMatrixView<'a, f64>,
    pub x: DMatrixView<'a, f64>,
    pub y: DMatrixView<'a, f64>,
    pub t: &'a [f64],
}

impl NodeValues<'_> {
    pub fn n_nodes(&self) -> usize {
        self.t.len()
    }

    /// Check the slice widths against a block's declared layout.
    pub fn check_layout(&self, block: &str, layout: &BlockLayout) -> ComponentResult<()> {
        check_width(block, "state derivatives", layout.states.len(), self.xdot.ncols())?;
        check_width(block, "states", layout.states.len(), self.x.ncols())?;
        check_width(block, "outputs", layout.outputs.len(), self.y.ncols())
    }

    pub fn state(&self, j: usize) -> DVector<f64> {
        self.x.column(j).into_owned()
    }

    pub fn state_derivative(&self, j: usize) -> DVector<f64> {
        self.xdot.column(j).into_owned()
    }

    pub fn output(&self, j: usize) -> DVector<f64> {
        self.y.column(j).into_owned()
    }

    pub fn times(&self) -> DVector<f64> {
        DVector::from_column_slice(self.t)
    }
}

/// Values a block publishes to its neighbors.
///
/// This is the closed capability set neighbors may rely on. A block that
/// does not carry a flow (a reservoir) leaves `flow` empty, one that does not
/// expose a free surface (a release) leaves `level` empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Signals {
    /// Flow through the block, one entry per node.
    pub flow: Option<DVector<f64>>,
    /// Liquid level held by the block, one entry per node.
    pub level: Option<DVector<f64>>,
}

impl Signals {
    pub fn flow(flow: DVector<f64>) -> Self {
        Self {
            flow: Some(flow),
            level: None,
        }
    }

    pub fn level(level: DVector<f64>) -> Self {
        Self {
            flow: None,
            level: Some(level),
        }
    }
}

/// A stateful network element exposing residual equations.
///
/// Within one finite element the engine calls, in three barriers:
/// 1. [`Block::set_values`] on every block,
/// 2. [`Block::update_inputs`] on every block,
/// 3. [`Block::residual`] on every block.
///
/// No block sees phase `k+1` before every block has finished phase `k`.
pub trait Block {
    /// Block name for diagnostics.
    fn name(&self) -> &str;

    /// Ordered state and output names. Queried once, when the index is built.
    fn layout(&self) -> BlockLayout;

    /// Initial value of each declared state, in declaration order.
    fn initial_states(&self) -> Vec<f64>;

    /// Store this block's derivative, state and output values at the current
    /// element's interior nodes.
    fn set_values(&mut self, values: NodeValues<'_>) -> ComponentResult<()>;

    /// Pull neighbor values into local working fields.
    ///
    /// Called after every block's `set_values` and before any `residual`.
    fn update_inputs(&mut self, _ctx: &InputContext<'_>) -> ComponentResult<()> {
        Ok(())
    }

    /// Values published to neighbors, read between `set_values` and
    /// `update_inputs`.
    fn signals(&self) -> Signals {
        Signals::default()
    }

    /// Residual table of shape `n_nodes x (states + outputs)`, state
    /// (differential) equations first, output (algebraic) equations last.
    fn residual(&self) -> ComponentResult<DMatrix<f64>>;
}

/// Fail with `DimensionMismatch` unless `actual == expected`.
pub fn check_width(
    block: &str,
    what: &'static str,
    expected: usize,
    actual: usize,
) -> ComponentResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(ComponentError::DimensionMismatch {
            block: block.to_string(),
            what,
            expected,
            actual,
        })
    }
}
