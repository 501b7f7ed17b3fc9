//! Errors raised when reading records.
use thiserror::Error;

/// Errors raised when reading records.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Nothing was recorded under the key.
    #[error("no value recorded under '{0}'")]
    MissingKey(String),

    /// The recorded value is not of the requested kind.
    #[error("value of '{key}' is not {expected}")]
    UnexpectedValue {
        /// Key of the value.
        key: String,

        /// The requested kind.
        expected: &'static str,
    },
}
