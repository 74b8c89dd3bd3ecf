//! Damped Newton solver with backtracking line search.

use crate::error::{SolverError, SolverResult};
use crate::jacobian::JacobianMethod;
use crate::root_finder::{ResidualFn, RootFinder, RootReport};
use nalgebra::DVector;
use tracing::{debug, trace};

/// Newton solver configuration.
#[derive(Debug, Clone)]
pub struct NewtonConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Absolute tolerance for residual norm
    pub abs_tol: f64,
    /// Relative tolerance for residual norm (relative to the initial norm)
    pub rel_tol: f64,
    /// Relative tolerance on the Newton step: ||dx|| <= x_tol * (||x|| + x_tol)
    pub x_tol: f64,
    /// Relative perturbation for finite-difference Jacobians
    pub fd_epsilon: f64,
    /// Difference scheme for the Jacobian
    pub jacobian: JacobianMethod,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    /// Maximum line search iterations
    pub max_line_search_iters: usize,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            abs_tol: 1e-10,
            rel_tol: 1e-12,
            x_tol: 1.49012e-8,
            fd_epsilon: 1e-7,
            jacobian: JacobianMethod::Forward,
            line_search_beta: 0.5,
            max_line_search_iters: 30,
        }
    }
}

/// Newton iteration from `x0` on `residual_fn`.
///
/// Never fails for lack of convergence: a stalled or exhausted iteration
/// returns its last accepted iterate with `converged == false`.
pub fn newton_solve<F>(
    x0: DVector<f64>,
    residual_fn: &mut F,
    config: &NewtonConfig,
) -> SolverResult<RootReport>
where
    F: FnMut(&DVector<f64>) -> SolverResult<DVector<f64>> + ?Sized,
{
    let mut x = x0;
    let mut r = residual_fn(&x)?;
    if r.len() != x.len() {
        return Err(SolverError::DimensionMismatch {
            unknowns: x.len(),
            equations: r.len(),
        });
    }
    if let Some(i) = r.iter().position(|v| !v.is_finite()) {
        return Err(SolverError::NonFinite {
            what: format!("residual entry {} at the initial guess", i),
        });
    }

    let mut r_norm = r.norm();
    let r0_norm = r_norm;
    let converged_at = |norm: f64| norm <= config.abs_tol || norm <= config.rel_tol * r0_norm;

    for iter in 0..config.max_iterations {
        // Check convergence
        if converged_at(r_norm) {
            debug!(iterations = iter, residual_norm = r_norm, "newton converged");
            return Ok(report(x, r_norm, iter, true));
        }

        // Solve J * dx = -r
        let jac = config
            .jacobian
            .evaluate(&x, &r, residual_fn, config.fd_epsilon)?;
        let dx = match jac.lu().solve(&(-&r)) {
            Some(dx) if dx.iter().all(|v| v.is_finite()) => dx,
            _ => {
                debug!(iterations = iter, residual_norm = r_norm, "singular Jacobian");
                return Ok(report(x, r_norm, iter, false));
            }
        };

        // A negligible Newton step means the residual is at its floor
        if dx.norm() <= config.x_tol * (x.norm() + config.x_tol) {
            let x_new = &x + &dx;
            let r_new = residual_fn(&x_new)?;
            let n = r_new.norm();
            let (x, r_norm) = if n.is_finite() && n <= r_norm {
                (x_new, n)
            } else {
                (x, r_norm)
            };
            debug!(iterations = iter + 1, residual_norm = r_norm, "newton step below x_tol");
            return Ok(report(x, r_norm, iter + 1, true));
        }

        // Backtracking line search on the residual norm
        let mut alpha = 1.0;
        let mut accepted = None;
        for _ in 0..config.max_line_search_iters {
            let x_new = &x + alpha * &dx;
            let r_new = residual_fn(&x_new)?;
            if r_new.len() != x.len() {
                return Err(SolverError::DimensionMismatch {
                    unknowns: x.len(),
                    equations: r_new.len(),
                });
            }
            let n = r_new.norm();
            if n.is_finite() && n < r_norm {
                accepted = Some((x_new, r_new, n));
                break;
            }
            alpha *= config.line_search_beta;
        }

        let Some((x_new, r_new, n)) = accepted else {
            debug!(iterations = iter, residual_norm = r_norm, "line search stagnated");
            return Ok(report(x, r_norm, iter, false));
        };

        trace!(iteration = iter, residual_norm = n, alpha, "newton step");
        x = x_new;
        r = r_new;
        r_norm = n;
    }

    let converged = converged_at(r_norm);
    debug!(
        iterations = config.max_iterations,
        residual_norm = r_norm,
        converged,
        "newton iteration limit reached"
    );
    Ok(report(x, r_norm, config.max_iterations, converged))
}

fn report(x: DVector<f64>, residual_norm: f64, iterations: usize, converged: bool) -> RootReport {
    RootReport {
        x,
        residual_norm,
        iterations,
        converged,
    }
}

/// [`RootFinder`] backed by [`newton_solve`].
#[derive(Debug, Clone, Default)]
pub struct NewtonSolver {
    pub config: NewtonConfig,
}

impl NewtonSolver {
    pub fn new(config: NewtonConfig) -> Self {
        Self { config }
    }
}

impl RootFinder for NewtonSolver {
    fn solve(
        &self,
        residual: &mut ResidualFn<'_>,
        guess: DVector<f64>,
    ) -> SolverResult<RootReport> {
        newton_solve(guess, residual, &self.config)
    }
}
