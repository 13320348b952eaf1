//! Shared error definitions for registry primitives.

use thiserror::Error;

/// Result alias used throughout the registry bridge.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while manipulating primitive types.
#[derive(Debug, Error)]
pub enum Error {
    /// The provided resource key does not carry the expected scheme.
    #[error("invalid resource key `{key}`: {reason}")]
    InvalidResourceKey {
        /// The offending key string.
        key: String,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// A path template could not be parsed.
    #[error("invalid path template `{template}`: {reason}")]
    InvalidPathTemplate {
        /// The offending template string.
        template: String,
        /// Human-readable reason for rejection.
        reason: String,
    },
}
