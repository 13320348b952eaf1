//! Observability helpers for registry bridge binaries.
//!
//! Library crates only emit `tracing` events; binaries call [`init_tracing`]
//! once at startup. Output goes to stderr so stdout stays free for the
//! protocol layer.

#![warn(missing_docs, clippy::pedantic)]

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Directive used when neither `RUST_LOG` nor a caller default is set.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directive could not be parsed.
    #[error("invalid log directive `{directive}`: {reason}")]
    InvalidDirective {
        /// The rejected directive.
        directive: String,
        /// Parser message.
        reason: String,
    },

    /// A global subscriber was already installed.
    #[error("failed to install tracing subscriber: {reason}")]
    AlreadyInstalled {
        /// Underlying error message.
        reason: String,
    },
}

/// Builds the filter: `RUST_LOG` when set, otherwise `default_directive`.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidDirective`] if `default_directive` is
/// used and does not parse.
pub fn env_filter(default_directive: &str) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(default_directive).map_err(|err| TelemetryError::InvalidDirective {
        directive: default_directive.to_owned(),
        reason: err.to_string(),
    })
}

/// Installs a formatted subscriber writing to stderr.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidDirective`] for an unparsable directive
/// and [`TelemetryError::AlreadyInstalled`] if called twice.
pub fn init_tracing(default_directive: Option<&str>) -> Result<(), TelemetryError> {
    let filter = env_filter(default_directive.unwrap_or(DEFAULT_DIRECTIVE))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| TelemetryError::AlreadyInstalled {
            reason: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_garbage_directive() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let err = env_filter("registry_client=notalevel").expect_err("bad level");
        assert!(matches!(err, TelemetryError::InvalidDirective { .. }));
    }

    #[test]
    fn accepts_module_directives() {
        env_filter("warn,registry_client=debug").unwrap();
    }
}
