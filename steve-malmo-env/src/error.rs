//! Errors of the environment.
use crate::ConfigError;
use thiserror::Error;

/// Fatal errors of [`SteveEnv`](crate::SteveEnv).
///
/// Per-tick session errors and missing observations are not represented here;
/// they are logged and the episode goes on with the latest data.
#[derive(Error, Debug)]
pub enum SteveEnvError {
    /// The configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// All attempts to start a mission failed.
    #[error("failed to start mission after {attempts} attempts: {message}")]
    SessionStart {
        /// The number of attempts made.
        attempts: usize,

        /// The error of the last attempt.
        message: String,
    },

    /// The session stopped before the mission began.
    #[error("session closed before the mission began")]
    SessionClosed,
}
