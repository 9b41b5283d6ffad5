//! Error types for path digging and the config/rule builders.

use std::fmt;

use thiserror::Error;

/// Container kind a path segment expected to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Object,
    Array,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Object => f.write_str("object"),
            Expected::Array => f.write_str("array"),
        }
    }
}

/// Errors produced by [`crate::dig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigError {
    /// The root value is a scalar and cannot be dug into.
    #[error("argument is not diggable")]
    InvalidArgument,

    /// The path string has an empty segment or a bare `[]`.
    #[error("invalid path: {path:?}")]
    InvalidPath { path: String },

    /// A segment is missing and path creation was not requested.
    #[error("property '{key}' is not found")]
    NoSuchKey { key: String },

    /// A segment resolved to a value of the wrong shape.
    #[error("unexpected type of value at '{key}': expected {expected}")]
    TypeMismatch { key: String, expected: Expected },
}

/// Errors produced by the builders and file IO.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no profiles")]
    NoProfiles,

    #[error("no active profile")]
    NoActiveProfile,

    #[error("index out of bounds: {index} (profiles: {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("no profile matches {selector}")]
    NoMatchingProfile { selector: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("io is not set")]
    IoNotSet,

    #[error("no data loaded")]
    NotLoaded,

    #[error("home directory not found")]
    NoHomeDir,

    #[error(transparent)]
    Dig(#[from] DigError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
