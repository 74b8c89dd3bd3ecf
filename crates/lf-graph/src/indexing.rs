//! Global index allocation for block states and outputs.
//!
//! Every block declares ordered state and output names. The network index
//! concatenates those declarations in block order, so block `i`'s states
//! occupy one contiguous range of the global state vector and its outputs one
//! contiguous range of the global output vector. The layout is frozen once
//! built.

use std::collections::HashMap;
use std::ops::Range;

use lf_core::BlockId;

use crate::error::{GraphError, GraphResult};
use crate::validate::validate_unique_names;

/// Which global vector a name lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    State,
    Output,
}

/// Ordered state and output names declared by one block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockLayout {
    pub states: Vec<String>,
    pub outputs: Vec<String>,
}

impl BlockLayout {
    pub fn new<S, O>(states: S, outputs: O) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        Self {
            states: states.into_iter().map(Into::into).collect(),
            outputs: outputs.into_iter().map(Into::into).collect(),
        }
    }

    /// Residual width: one column per state plus one per output.
    pub fn width(&self) -> usize {
        self.states.len() + self.outputs.len()
    }
}

/// Global ranges owned by one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSlots {
    /// Offsets into the global state vector.
    pub states: Range<usize>,
    /// Offsets into the global output vector.
    pub outputs: Range<usize>,
    /// Columns of the global residual table (state equations first).
    pub residuals: Range<usize>,
}

impl BlockSlots {
    /// Residual columns holding this block's algebraic (output) equations.
    pub fn algebraic_residuals(&self) -> Range<usize> {
        (self.residuals.start + self.states.len())..self.residuals.end
    }
}

/// Index map from names to contiguous offsets and back.
#[derive(Debug, Clone)]
pub struct NetworkIndex {
    slots: Vec<BlockSlots>,

    /// Reverse lookup: state offset -> name.
    state_names: Vec<String>,

    /// Reverse lookup: output offset -> name.
    output_names: Vec<String>,

    /// Forward lookup: name -> (kind, offset).
    lookup: HashMap<String, (VarKind, usize)>,
}

impl NetworkIndex {
    /// Allocate offsets for a sequence of layouts, in order, starting at 0.
    pub fn from_layouts<'a, I>(layouts: I) -> GraphResult<Self>
    where
        I: IntoIterator<Item = &'a BlockLayout>,
        I::IntoIter: Clone,
    {
        let layouts = layouts.into_iter();
        validate_unique_names(layouts.clone())?;

        let mut slots = Vec::new();
        let mut state_names = Vec::new();
        let mut output_names = Vec::new();
        let mut lookup = HashMap::new();
        let mut residual_offset = 0;

        for layout in layouts {
            let state_start = state_names.len();
            let output_start = output_names.len();

            for name in &layout.states {
                lookup.insert(name.clone(), (VarKind::State, state_names.len()));
                state_names.push(name.clone());
            }
            for name in &layout.outputs {
                lookup.insert(name.clone(), (VarKind::Output, output_names.len()));
                output_names.push(name.clone());
            }

            slots.push(BlockSlots {
                states: state_start..state_names.len(),
                outputs: output_start..output_names.len(),
                residuals: residual_offset..residual_offset + layout.width(),
            });
            residual_offset += layout.width();
        }

        Ok(Self {
            slots,
            state_names,
            output_names,
            lookup,
        })
    }

    pub fn num_states(&self) -> usize {
        self.state_names.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.output_names.len()
    }

    /// Width of the global residual table.
    pub fn num_residuals(&self) -> usize {
        self.num_states() + self.num_outputs()
    }

    pub fn block_count(&self) -> usize {
        self.slots.len()
    }

    /// Ranges owned by a block (panics if the id is not part of the index).
    pub fn slots(&self, id: BlockId) -> &BlockSlots {
        &self.slots[id.slot()]
    }

    /// All block ranges in declaration order.
    pub fn blocks(&self) -> &[BlockSlots] {
        &self.slots
    }

    /// Kind and offset of a declared name.
    pub fn lookup(&self, name: &str) -> Option<(VarKind, usize)> {
        self.lookup.get(name).copied()
    }

    pub fn state_offset(&self, name: &str) -> GraphResult<usize> {
        match self.lookup(name) {
            Some((VarKind::State, offset)) => Ok(offset),
            _ => Err(GraphError::NameNotFound { name: name.into() }),
        }
    }

    pub fn output_offset(&self, name: &str) -> GraphResult<usize> {
        match self.lookup(name) {
            Some((VarKind::Output, offset)) => Ok(offset),
            _ => Err(GraphError::NameNotFound { name: name.into() }),
        }
    }

    pub fn state_names(&self) -> &[String] {
        &self.state_names
    }

    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    /// `(name, offset)` entries for one block's states.
    pub fn block_states(&self, id: BlockId) -> impl Iterator<Item = (&str, usize)> + '_ {
        let range = self.slots(id).states.clone();
        range.map(move |i| (self.state_names[i].as_str(), i))
    }

    /// `(name, offset)` entries for one block's outputs.
    pub fn block_outputs(&self, id: BlockId) -> impl Iterator<Item = (&str, usize)> + '_ {
        let range = self.slots(id).outputs.clone();
        range.map(move |i| (self.output_names[i].as_str(), i))
    }

    /// Pair a global vector with the names of its entries.
    ///
    /// `values` is truncated to the number of names of that kind.
    pub fn named<'a>(
        &'a self,
        kind: VarKind,
        values: &'a [f64],
    ) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        let names = match kind {
            VarKind::State => &self.state_names,
            VarKind::Output => &self.output_names,
        };
        names.iter().map(String::as_str).zip(values.iter().copied())
    }

    /// Residual columns that hold algebraic equations, in block order.
    pub fn algebraic_residual_columns(&self) -> Vec<usize> {
        self.slots
            .iter()
            .flat_map(|s| s.algebraic_residuals())
            .collect()
    }
}
