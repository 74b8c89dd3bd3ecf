//! Finite difference Jacobian computation.

use crate::error::{SolverError, SolverResult};
use nalgebra::{DMatrix, DVector};

/// Difference scheme used to approximate the Jacobian.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JacobianMethod {
    /// One extra residual evaluation per unknown.
    #[default]
    Forward,
    /// Two extra evaluations per unknown, second-order accurate.
    Central,
}

impl JacobianMethod {
    pub(crate) fn evaluate<F>(
        self,
        x: &DVector<f64>,
        f_x: &DVector<f64>,
        f: &mut F,
        epsilon: f64,
    ) -> SolverResult<DMatrix<f64>>
    where
        F: FnMut(&DVector<f64>) -> SolverResult<DVector<f64>> + ?Sized,
    {
        match self {
            JacobianMethod::Forward => finite_difference_jacobian(x, f_x, f, epsilon),
            JacobianMethod::Central => central_difference_jacobian(x, f, epsilon),
        }
    }
}

/// Compute Jacobian using forward finite differences.
///
/// For each column j, perturbs x[j] by epsilon (scaled by |x[j]|) and computes
/// (f(x+e) - f(x))/e. `f_x` is the already-known residual at `x`.
pub fn finite_difference_jacobian<F>(
    x: &DVector<f64>,
    f_x: &DVector<f64>,
    f: &mut F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: FnMut(&DVector<f64>) -> SolverResult<DVector<f64>> + ?Sized,
{
    let n = x.len();
    let m = f_x.len();
    let mut jac = DMatrix::zeros(m, n);

    for j in 0..n {
        let mut x_perturbed = x.clone();
        let dx = epsilon * x[j].abs().max(1.0);
        x_perturbed[j] += dx;

        let f_perturbed = f(&x_perturbed)?;
        check_len(&f_perturbed, m)?;
        jac.set_column(j, &((f_perturbed - f_x) / dx));
    }

    Ok(jac)
}

/// Compute Jacobian using central finite differences (more accurate but 2x cost).
pub fn central_difference_jacobian<F>(
    x: &DVector<f64>,
    f: &mut F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: FnMut(&DVector<f64>) -> SolverResult<DVector<f64>> + ?Sized,
{
    let n = x.len();
    let mut jac: Option<DMatrix<f64>> = None;

    for j in 0..n {
        let dx = epsilon * x[j].abs().max(1.0);

        let mut x_plus = x.clone();
        x_plus[j] += dx;
        let f_plus = f(&x_plus)?;

        let mut x_minus = x.clone();
        x_minus[j] -= dx;
        let f_minus = f(&x_minus)?;
        check_len(&f_minus, f_plus.len())?;

        let cols = jac.get_or_insert_with(|| DMatrix::zeros(f_plus.len(), n));
        check_len(&f_plus, cols.nrows())?;
        cols.set_column(j, &((f_plus - f_minus) / (2.0 * dx)));
    }

    Ok(jac.unwrap_or_else(|| DMatrix::zeros(0, 0)))
}

fn check_len(v: &DVector<f64>, expected: usize) -> SolverResult<()> {
    if v.len() == expected {
        Ok(())
    } else {
        Err(SolverError::ResidualFailed {
            what: format!(
                "residual length changed from {} to {} between evaluations",
                expected,
                v.len()
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jacobian_linear() {
        // f(x) = 2*x, J = 2
        let mut f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, 2.0 * x[0]))
        };

        let x = DVector::from_element(1, 3.0);
        let f_x = f(&x).unwrap();
        let jac = finite_difference_jacobian(&x, &f_x, &mut f, 1e-7).unwrap();

        assert!((jac[(0, 0)] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn jacobian_quadratic() {
        // f(x) = x^2, J = 2*x
        let mut f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0]))
        };

        let x = DVector::from_element(1, 3.0);
        let f_x = f(&x).unwrap();
        let jac = finite_difference_jacobian(&x, &f_x, &mut f, 1e-7).unwrap();

        assert!((jac[(0, 0)] - 6.0).abs() < 1e-5);
    }

    #[test]
    fn central_jacobian_two_by_two() {
        // f = [x0*x1, x0 + x1^2], J = [[x1, x0], [1, 2 x1]]
        let mut f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![x[0] * x[1], x[0] + x[1] * x[1]]))
        };

        let x = DVector::from_vec(vec![2.0, 3.0]);
        let jac = central_difference_jacobian(&x, &mut f, 1e-6).unwrap();

        assert!((jac[(0, 0)] - 3.0).abs() < 1e-6);
        assert!((jac[(0, 1)] - 2.0).abs() < 1e-6);
        assert!((jac[(1, 0)] - 1.0).abs() < 1e-6);
        assert!((jac[(1, 1)] - 6.0).abs() < 1e-6);
    }

    #[test]
    fn residual_error_propagates() {
        let mut calls = 0;
        let mut f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            calls += 1;
            if calls > 1 {
                Err(SolverError::ResidualFailed { what: "boom".into() })
            } else {
                Ok(x.clone())
            }
        };
        let x = DVector::from_element(2, 1.0);
        let f_x = f(&x).unwrap();
        let err = finite_difference_jacobian(&x, &f_x, &mut f, 1e-7).unwrap_err();
        assert!(matches!(err, SolverError::ResidualFailed { .. }));
    }
}
