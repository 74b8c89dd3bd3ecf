//! Common utilities for block calculations.

use crate::block::{NodeValues, check_width};
use crate::error::{ComponentError, ComponentResult};
use lf_core::numeric::ensure_finite;
use nalgebra::{DMatrix, DVector};

/// Ensure a parameter is finite, returning ComponentError if not.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<f64> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })
}

/// Ensure a parameter is finite and strictly positive.
pub fn check_positive(value: f64, what: &'static str) -> ComponentResult<f64> {
    let v = check_finite(value, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(ComponentError::NonPhysical { what })
    }
}

/// Element-wise `sqrt(max(h, 0))`.
///
/// Levels may dip below zero while the root-finder iterates; the clamp keeps
/// the gravity-driven flow laws real-valued there.
pub fn sqrt_head(h: &DVector<f64>) -> DVector<f64> {
    h.map(|v| v.max(0.0).sqrt())
}

/// Owned copy of the values last handed to a block by `set_values`.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeCache {
    pub xdot: DMatrix<f64>,
    pub x: DMatrix<f64>,
    pub y: DMatrix<f64>,
    pub t: DVector<f64>,
}

impl Default for NodeCache {
    fn default() -> Self {
        Self {
            xdot: DMatrix::zeros(0, 0),
            x: DMatrix::zeros(0, 0),
            y: DMatrix::zeros(0, 0),
            t: DVector::zeros(0),
        }
    }
}

impl NodeCache {
    pub fn store(&mut self, values: NodeValues<'_>) {
        self.xdot = values.xdot.into_owned();
        self.x = values.x.into_owned();
        self.y = values.y.into_owned();
        self.t = values.times();
    }

    pub fn n_nodes(&self) -> usize {
        self.t.len()
    }

    /// State `j` at every node, zeros before the first `store`.
    pub fn state(&self, j: usize) -> DVector<f64> {
        column_or_zeros(&self.x, j, self.n_nodes())
    }

    pub fn state_derivative(&self, j: usize) -> DVector<f64> {
        column_or_zeros(&self.xdot, j, self.n_nodes())
    }

    pub fn output(&self, j: usize) -> DVector<f64> {
        column_or_zeros(&self.y, j, self.n_nodes())
    }
}

fn column_or_zeros(table: &DMatrix<f64>, j: usize, n: usize) -> DVector<f64> {
    if j < table.ncols() {
        table.column(j).into_owned()
    } else {
        DVector::zeros(n)
    }
}

/// Assemble a residual table from per-equation columns.
///
/// Every column must have `n_nodes` entries.
pub fn residual_table(
    block: &str,
    n_nodes: usize,
    columns: &[DVector<f64>],
) -> ComponentResult<DMatrix<f64>> {
    for col in columns {
        check_width(block, "residual column", n_nodes, col.len())?;
    }
    Ok(DMatrix::from_fn(n_nodes, columns.len(), |i, j| columns[j][i]))
}
