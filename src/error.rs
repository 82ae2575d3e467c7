use std::path::PathBuf;
use thiserror::Error;

use crate::coerce::CoerceError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config must be set")]
    EmptyPath,

    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to parse config: {0}")]
    InvalidDocument(#[from] toml::de::Error),

    #[error("invalid key path: {0:?}")]
    InvalidPath(String),

    #[error("empty tag on field `{field}`")]
    EmptyTag { field: &'static str },

    #[error("invalid tag on field `{field}`: {token}")]
    InvalidTag { field: &'static str, token: String },

    #[error("field {0} must be set")]
    MissingField(String),

    #[error("field {path}: {source}")]
    Coerce { path: String, source: CoerceError },

    #[error("field {path}: value {value} out of range for {ty}")]
    OutOfRange {
        path: String,
        ty: &'static str,
        value: String,
    },

    #[error("unsupported type: {ty} (field `{field}`)")]
    UnsupportedType {
        field: &'static str,
        ty: &'static str,
    },

    #[error("{path} is not an array of tables (found {found})")]
    NotAnArray { path: String, found: &'static str },

    #[error("end of array")]
    EndOfArray,
}

impl ConfigError {
    /// Returns `true` for the signal an exhausted [`ArrayCursor`](crate::ArrayCursor)
    /// reports. It marks the end of a loop, not a failure.
    pub fn is_end_of_array(&self) -> bool {
        matches!(self, ConfigError::EndOfArray)
    }
}
