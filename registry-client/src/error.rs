//! Error taxonomy for discovery, URL assembly and dispatch.

use registry_catalog::CatalogError;
use registry_config::ConfigError;
use registry_primitives::ResourceKey;
use registry_spec::SpecError;
use registry_tools::ToolSurfaceError;
use thiserror::Error;

/// Result alias for discovery.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Result alias for URL assembly.
pub type UrlResult<T> = Result<T, UrlError>;

/// Result alias for dispatch.
pub type CallResult<T> = Result<T, CallError>;

/// Result alias for [`crate::RegistryClient`] operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Terminal failure of the discovery fetch.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The request never produced a response.
    #[error("discovery request to {url} failed: {reason}")]
    Transport {
        /// URL that was requested.
        url: String,
        /// Underlying transport message.
        reason: String,
    },

    /// The registry answered with a non-success status.
    #[error("discovery request to {url} returned status {status}")]
    Status {
        /// URL that was requested.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The body is not a readable API description.
    #[error("discovery document from {url} is malformed: {source}")]
    Malformed {
        /// URL that was requested.
        url: String,
        /// Parse failure.
        source: SpecError,
    },

    /// The discovery URL could not be assembled.
    #[error("invalid discovery url `{url}`: {reason}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Parser message.
        reason: String,
    },
}

/// Failure to assemble a request URL.
#[derive(Debug, Error)]
pub enum UrlError {
    /// Required path placeholders had no value.
    #[error("unresolved path parameters: {}", names.join(", "))]
    UnresolvedParameter {
        /// Placeholder names left without a value, in template order.
        names: Vec<String>,
    },

    /// An argument value cannot be rendered into a URL.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Argument name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The assembled URL does not parse.
    #[error("invalid request url `{url}`: {reason}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Parser message.
        reason: String,
    },
}

impl UrlError {
    /// Convenience constructor for rejected arguments.
    #[must_use]
    pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of one outbound call. Never retried.
#[derive(Debug, Error)]
pub enum CallError {
    /// Connection, TLS, timeout or body read failure.
    #[error("network failure: {reason}")]
    NetworkFailure {
        /// Underlying transport message.
        reason: String,
    },

    /// The registry answered with a 4xx or 5xx status.
    #[error("registry returned status {status}: {body}")]
    UpstreamStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, lossily decoded.
        body: String,
    },
}

impl CallError {
    /// Convenience constructor for transport failures.
    #[must_use]
    pub fn network(reason: impl Into<String>) -> Self {
        Self::NetworkFailure {
            reason: reason.into(),
        }
    }

    /// Upstream status code, if the registry answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::UpstreamStatus { status, .. } => Some(*status),
            Self::NetworkFailure { .. } => None,
        }
    }
}

/// Any failure surfaced by [`crate::RegistryClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid client configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Discovery failed; the client is not ready.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// The discovered document produced colliding resource keys.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The catalog produced an invalid tool surface.
    #[error(transparent)]
    ToolSurface(#[from] ToolSurfaceError),

    /// A resource key supplied by the caller is malformed.
    #[error(transparent)]
    InvalidKey(#[from] registry_primitives::Error),

    /// URL assembly failed.
    #[error(transparent)]
    Url(#[from] UrlError),

    /// The outbound call failed.
    #[error(transparent)]
    Call(#[from] CallError),

    /// No catalogued endpoint matches the key.
    #[error("no endpoint matches resource `{key}`")]
    UnknownEndpoint {
        /// The unmatched key.
        key: ResourceKey,
    },

    /// No tool carries the name.
    #[error("unknown tool `{name}`")]
    UnknownTool {
        /// The unmatched name.
        name: String,
    },

    /// Invocation attempted before a successful discovery.
    #[error("registry has not been discovered")]
    NotDiscovered,
}

impl ClientError {
    /// Upstream status code carried by the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Call(err) => err.status(),
            _ => None,
        }
    }
}
