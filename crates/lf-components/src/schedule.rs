//! Prescribed time functions for source blocks.

use crate::error::{ComponentError, ComponentResult};
use std::fmt;

/// How a [`Timeseries`] is evaluated between samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interpolation {
    #[default]
    Linear,
    /// Hold the most recent sample.
    Previous,
}

/// Sampled values on a strictly increasing time grid.
///
/// Outside the sampled range the first/last value is held.
#[derive(Clone, Debug, PartialEq)]
pub struct Timeseries {
    times: Vec<f64>,
    values: Vec<f64>,
    interpolation: Interpolation,
}

impl Timeseries {
    pub fn new(
        times: Vec<f64>,
        values: Vec<f64>,
        interpolation: Interpolation,
    ) -> ComponentResult<Self> {
        if times.is_empty() {
            return Err(ComponentError::InvalidArg {
                what: "timeseries has no samples",
            });
        }
        if times.len() != values.len() {
            return Err(ComponentError::InvalidArg {
                what: "timeseries times and values differ in length",
            });
        }
        if times.iter().chain(&values).any(|v| !v.is_finite()) {
            return Err(ComponentError::NonPhysical {
                what: "timeseries sample",
            });
        }
        if times.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ComponentError::InvalidArg {
                what: "timeseries times must be strictly increasing",
            });
        }
        Ok(Self {
            times,
            values,
            interpolation,
        })
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn at(&self, t: f64) -> f64 {
        let last = self.times.len() - 1;
        if t <= self.times[0] {
            return self.values[0];
        }
        if t >= self.times[last] {
            return self.values[last];
        }
        // First sample strictly after t; 1..=last by the range checks above.
        let hi = self.times.partition_point(|&s| s <= t);
        let lo = hi - 1;
        match self.interpolation {
            Interpolation::Previous => self.values[lo],
            Interpolation::Linear => {
                let w = (t - self.times[lo]) / (self.times[hi] - self.times[lo]);
                self.values[lo] + w * (self.values[hi] - self.values[lo])
            }
        }
    }
}

/// A value prescribed as a function of absolute time.
pub enum Schedule {
    Constant(f64),
    Series(Timeseries),
    Function(Box<dyn Fn(f64) -> f64>),
}

impl Schedule {
    pub fn function(f: impl Fn(f64) -> f64 + 'static) -> Self {
        Schedule::Function(Box::new(f))
    }

    pub fn at(&self, t: f64) -> f64 {
        match self {
            Schedule::Constant(v) => *v,
            Schedule::Series(ts) => ts.at(t),
            Schedule::Function(f) => f(t),
        }
    }
}

impl fmt::Debug for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schedule::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            Schedule::Series(ts) => f.debug_tuple("Series").field(ts).finish(),
            Schedule::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl From<Timeseries> for Schedule {
    fn from(ts: Timeseries) -> Self {
        Schedule::Series(ts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn series(interp: Interpolation) -> Timeseries {
        Timeseries::new(vec![0.0, 10.0, 20.0], vec![1.0, 3.0, 2.0], interp).unwrap()
    }

    #[test]
    fn linear_interpolates_and_holds_ends() {
        let ts = series(Interpolation::Linear);
        assert_eq!(ts.at(-5.0), 1.0);
        assert_eq!(ts.at(5.0), 2.0);
        assert_eq!(ts.at(10.0), 3.0);
        assert_eq!(ts.at(15.0), 2.5);
        assert_eq!(ts.at(99.0), 2.0);
    }

    #[test]
    fn previous_holds_last_sample() {
        let ts = series(Interpolation::Previous);
        assert_eq!(ts.at(9.99), 1.0);
        assert_eq!(ts.at(10.0), 3.0);
        assert_eq!(ts.at(19.0), 3.0);
    }

    #[test]
    fn rejects_bad_grids() {
        assert!(Timeseries::new(vec![], vec![], Interpolation::Linear).is_err());
        assert!(Timeseries::new(vec![0.0, 1.0], vec![1.0], Interpolation::Linear).is_err());
        assert!(Timeseries::new(vec![0.0, 0.0], vec![1.0, 2.0], Interpolation::Linear).is_err());
        assert!(Timeseries::new(vec![0.0, f64::NAN], vec![1.0, 2.0], Interpolation::Linear).is_err());
    }

    #[test]
    fn schedule_variants() {
        assert_eq!(Schedule::Constant(0.4).at(123.0), 0.4);
        assert_eq!(Schedule::function(|t| 2.0 * t).at(3.0), 6.0);
        let s: Schedule = series(Interpolation::Linear).into();
        assert_eq!(s.at(15.0), 2.5);
        assert_eq!(format!("{:?}", Schedule::function(|t| t)), "Function(..)");
    }

    proptest! {
        #[test]
        fn linear_stays_within_sample_bounds(t in -10.0f64..30.0) {
            let ts = series(Interpolation::Linear);
            let v = ts.at(t);
            prop_assert!((1.0..=3.0).contains(&v));
        }
    }
}
