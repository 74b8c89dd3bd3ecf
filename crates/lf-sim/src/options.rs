//! Run configuration for a flowsheet.

use crate::collocation::{MAX_ORDER, MIN_ORDER};
use crate::error::{SimError, SimResult};

/// What to do when the root-finder reports a non-converged element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConvergencePolicy {
    /// Accept the returned vector silently.
    Trust,
    /// Accept the returned vector and emit a warning.
    #[default]
    Warn,
    /// Abort the run with [`SimError::NotConverged`].
    Fail,
}

/// Options for simulation runs.
#[derive(Clone, Debug, PartialEq)]
pub struct SimOptions {
    /// Nodes per finite element, endpoints included (2..=6)
    pub n_nodes: usize,
    /// Finite element width
    pub dt: f64,
    /// Clock value at element counter 0
    pub start_time: f64,
    pub convergence: ConvergencePolicy,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            n_nodes: 5,
            dt: 1.0,
            start_time: 0.0,
            convergence: ConvergencePolicy::default(),
        }
    }
}

impl SimOptions {
    pub fn new(n_nodes: usize, dt: f64, start_time: f64) -> Self {
        Self {
            n_nodes,
            dt,
            start_time,
            ..Self::default()
        }
    }

    pub fn with_convergence(mut self, policy: ConvergencePolicy) -> Self {
        self.convergence = policy;
        self
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(MIN_ORDER..=MAX_ORDER).contains(&self.n_nodes) {
            return Err(SimError::UnsupportedOrder { n: self.n_nodes });
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "dt must be positive and finite",
            });
        }
        if !self.start_time.is_finite() {
            return Err(SimError::InvalidArg {
                what: "start time must be finite",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_options_defaults() {
        let opts = SimOptions::default();
        assert_eq!(opts.n_nodes, 5);
        assert_eq!(opts.dt, 1.0);
        assert_eq!(opts.start_time, 0.0);
        assert_eq!(opts.convergence, ConvergencePolicy::Warn);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn sim_options_invalid() {
        assert_eq!(
            SimOptions::new(7, 1.0, 0.0).validate(),
            Err(SimError::UnsupportedOrder { n: 7 })
        );
        assert!(SimOptions::new(3, 0.0, 0.0).validate().is_err());
        assert!(SimOptions::new(3, f64::NAN, 0.0).validate().is_err());
        assert!(SimOptions::new(3, 1.0, f64::INFINITY).validate().is_err());
    }
}
