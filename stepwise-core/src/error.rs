//! Error types for stepwise-core

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for attempt handling
#[derive(Error, Debug)]
pub enum AttemptError {
    #[error("Question not found: {0}")]
    QuestionNotFound(String),

    #[error("Invalid variant index: {0}")]
    Variant(#[from] BitIndexError),

    #[error("Invalid question form: {0}")]
    Form(#[from] QuestionFormError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from setting a bit in an [`AttemptedSet`](crate::variants::AttemptedSet)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BitIndexError {
    #[error("bit index {0} is negative")]
    Negative(i64),

    #[error("bit index {index} is outside the {width}-bit window")]
    OutOfWindow { index: i64, width: u32 },
}

/// Errors from the host persistence layer
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Errors from parsing an authoring form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuestionFormError {
    #[error("Field {field} is not a valid {expected}: {value}")]
    Invalid {
        field: String,
        expected: &'static str,
        value: String,
    },
}

/// Errors in deployment configuration, fatal at startup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unrecognized deployment environment '{0}', expected one of: dev, staging, prod")]
    UnknownEnvironment(String),
}
