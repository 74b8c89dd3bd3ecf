//! The root-finder contract consumed by the simulation engine.

use nalgebra::DVector;

use crate::error::SolverResult;

/// Residual callback: maps a candidate vector to its residual.
///
/// `FnMut` so that callers can mutate model state while being evaluated.
pub type ResidualFn<'a> = dyn FnMut(&DVector<f64>) -> SolverResult<DVector<f64>> + 'a;

/// Outcome of one root-finding call.
#[derive(Debug, Clone, PartialEq)]
pub struct RootReport {
    /// Final iterate, whether or not it converged.
    pub x: DVector<f64>,
    /// Euclidean norm of the residual at `x`.
    pub residual_norm: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Opaque nonlinear equation solver.
///
/// Implementations must return a vector of the same dimension as `guess`.
/// A solve that fails to converge is still `Ok`: the report carries the best
/// iterate and `converged == false`, and the caller decides what to do with it.
/// `Err` is reserved for failures of the residual itself or malformed systems.
pub trait RootFinder {
    fn solve(
        &self,
        residual: &mut ResidualFn<'_>,
        guess: DVector<f64>,
    ) -> SolverResult<RootReport>;
}
