//! Fixed Lobatto collocation tables for orders 2 through 6.
//!
//! For an element of width `dt` starting at state `x0`, the interior-node
//! states `x` and derivatives `xdot` (rows = nodes `1..n`) satisfy
//! `dt * M * xdot - x + x0 = 0` when `xdot` is the derivative of the
//! collocation polynomial through `x0` and `x`.

use crate::error::{SimError, SimResult};
use nalgebra::DMatrix;

pub const MIN_ORDER: usize = 2;
pub const MAX_ORDER: usize = 6;

const M2: [&[f64]; 1] = [&[1.0]];

const M3: [&[f64]; 2] = [&[0.75, -0.25], &[1.00, 0.00]];

const M4: [&[f64]; 3] = [
    &[0.436, -0.281, 0.121],
    &[0.614, 0.064, 0.0461],
    &[0.603, 0.230, 0.167],
];

const M5: [&[f64]; 4] = [
    &[0.278, -0.202, 0.169, -0.071],
    &[0.398, 0.069, 0.064, -0.031],
    &[0.387, 0.234, 0.278, -0.071],
    &[0.389, 0.222, 0.389, 0.000],
];

const M6: [&[f64]; 5] = [
    &[0.191, -0.147, 0.139, -0.113, 0.047],
    &[0.276, 0.059, 0.051, -0.050, 0.022],
    &[0.267, 0.193, 0.252, -0.114, 0.045],
    &[0.269, 0.178, 0.384, 0.032, 0.019],
    &[0.269, 0.181, 0.374, 0.110, 0.067],
];

/// Collocation matrix and node fractions for one order.
#[derive(Debug, Clone, PartialEq)]
pub struct CollocationTable {
    /// `(n-1) x (n-1)` coefficient matrix.
    pub matrix: DMatrix<f64>,
    /// `n` node positions in `[0, 1]`, first 0 and last 1.
    pub fractions: Vec<f64>,
}

impl CollocationTable {
    /// Table for `n` nodes per element (endpoints included).
    pub fn new(n: usize) -> SimResult<Self> {
        let (matrix, fractions) = Self::coefficients(n)?;
        Ok(Self { matrix, fractions })
    }

    /// `(matrix, node_fractions)` for `n` in `2..=6`.
    pub fn coefficients(n: usize) -> SimResult<(DMatrix<f64>, Vec<f64>)> {
        let rows: &[&[f64]] = match n {
            2 => &M2,
            3 => &M3,
            4 => &M4,
            5 => &M5,
            6 => &M6,
            _ => return Err(SimError::UnsupportedOrder { n }),
        };
        let matrix = DMatrix::from_fn(n - 1, n - 1, |i, j| rows[i][j]);
        Ok((matrix, lobatto_fractions(n)))
    }

    /// Number of nodes, endpoints included.
    pub fn order(&self) -> usize {
        self.fractions.len()
    }

    /// Node fractions past the element start.
    pub fn interior_fractions(&self) -> &[f64] {
        &self.fractions[1..]
    }
}

fn lobatto_fractions(n: usize) -> Vec<f64> {
    match n {
        2 => vec![0.0, 1.0],
        3 => vec![0.0, 0.5, 1.0],
        4 => {
            let a = 5f64.sqrt() / 10.0;
            vec![0.0, 0.5 - a, 0.5 + a, 1.0]
        }
        5 => {
            let a = 21f64.sqrt() / 14.0;
            vec![0.0, 0.5 - a, 0.5, 0.5 + a, 1.0]
        }
        _ => {
            let s7 = 7f64.sqrt();
            let outer = ((7.0 + 2.0 * s7) / 21.0).sqrt() / 2.0;
            let inner = ((7.0 - 2.0 * s7) / 21.0).sqrt() / 2.0;
            vec![0.0, 0.5 - outer, 0.5 - inner, 0.5 + inner, 0.5 + outer, 1.0]
        }
    }
}
