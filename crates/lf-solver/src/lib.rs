//! Nonlinear root-finding for lumpflow.
//!
//! The simulation engine only needs "given a residual function and an initial
//! guess, return a vector that approximately zeroes it". That contract is the
//! [`RootFinder`] trait; [`NewtonSolver`] is the implementation shipped with
//! the workspace (damped Newton, finite-difference Jacobian, dense LU).

pub mod error;
pub mod jacobian;
pub mod newton;
pub mod root_finder;

pub use error::{SolverError, SolverResult};
pub use jacobian::{JacobianMethod, central_difference_jacobian, finite_difference_jacobian};
pub use newton::{NewtonConfig, NewtonSolver, newton_solve};
pub use root_finder::{ResidualFn, RootFinder, RootReport};
