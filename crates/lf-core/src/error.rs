use thiserror::Error;

pub type LfResult<T> = Result<T, LfError>;

/// Failures shared by every lumpflow crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LfError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_quantity() {
        let err = LfError::NonFinite {
            what: "initial state",
            value: f64::NAN,
        };
        assert_eq!(
            err.to_string(),
            "Non-finite numeric value for initial state: NaN"
        );
        let err = LfError::Invariant {
            what: "block table width",
        };
        assert!(err.to_string().contains("block table width"));
    }
}
