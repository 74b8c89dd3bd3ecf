use crate::LfError;

/// Floating point type used throughout the system.
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, LfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(LfError::NonFinite { what, value: v })
    }
}

/// Check every entry of a slice; reports the first offending value.
pub fn ensure_all_finite(values: &[Real], what: &'static str) -> Result<(), LfError> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(&value) => Err(LfError::NonFinite { what, value }),
        None => Ok(()),
    }
}

/// Number of whole steps of width `dt` that fit in `span`: `floor(span / dt)`.
///
/// Never overshoots: `whole_steps(span, dt) as f64 * dt <= span`.
pub fn whole_steps(span: Real, dt: Real) -> usize {
    if !(span > 0.0) || !(dt > 0.0) {
        return 0;
    }
    let mut n = (span / dt).floor();
    while n > 0.0 && n * dt > span {
        n -= 1.0;
    }
    n as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_all_finite_reports_first_bad_value() {
        let err = ensure_all_finite(&[1.0, Real::INFINITY, Real::NAN], "vec").unwrap_err();
        assert_eq!(
            err,
            LfError::NonFinite {
                what: "vec",
                value: Real::INFINITY
            }
        );
        assert!(ensure_all_finite(&[0.0, -2.0], "vec").is_ok());
    }

    #[test]
    fn whole_steps_truncates() {
        assert_eq!(whole_steps(1.0, 0.3), 3);
        assert_eq!(whole_steps(1.0, 0.1), 10);
        assert_eq!(whole_steps(8e4, 1600.0), 50);
        // 0.3 / 0.1 rounds just below 3
        assert_eq!(whole_steps(0.3, 0.1), 2);
        assert_eq!(whole_steps(0.05, 0.1), 0);
        assert_eq!(whole_steps(-1.0, 0.1), 0);
    }

    proptest! {
        #[test]
        fn whole_steps_never_overshoots(span in 0.0f64..1e3, dt in 1e-3f64..10.0) {
            let n = whole_steps(span, dt) as f64;
            prop_assert!(n * dt <= span);
            prop_assert!((n + 1.0) * dt >= span);
        }
    }
}
