use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CoerceError {
    #[error("unable to cast {value} of type {kind} to {target}")]
    Incompatible {
        value: String,
        kind: &'static str,
        target: &'static str,
    },

    #[error("unable to cast negative value {0} to an unsigned integer")]
    Negative(String),

    #[error("value {value:?} overflows {target}")]
    Overflow { value: String, target: &'static str },

    #[error("invalid duration {0:?}")]
    InvalidDuration(String),

    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },

    #[error("negative duration {0:?}")]
    NegativeDuration(String),

    #[error("unable to parse date: {0}")]
    InvalidTime(String),
}
