//! Validated client configuration.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Tags whose operations are exposed when no explicit allow-list is given.
///
/// These are the read-only Quay categories; `billing`, `superuser`, `logs`
/// and other administrative groups stay hidden unless requested.
pub const DEFAULT_ALLOWED_TAGS: &[&str] = &[
    "discovery",
    "error",
    "manifest",
    "organization",
    "permission",
    "repository",
    "robot",
    "search",
    "secscan",
    "tag",
    "team",
    "user",
];

/// Timeout applied to every outbound request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Identifying client header value.
pub const DEFAULT_USER_AGENT: &str = concat!("quay-mcp-server/", env!("CARGO_PKG_VERSION"));

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors surfaced while building or loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The registry URL is not an absolute http(s) URL.
    #[error("invalid registry url `{url}`: {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Human-readable reason.
        reason: &'static str,
    },
    /// A configuration value failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
    /// Settings file could not be read.
    #[error("failed to read settings file {path:?}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Source [`std::io::Error`].
        source: std::io::Error,
    },
    /// Settings file is not valid TOML for [`crate::Settings`].
    #[error("failed to parse settings: {source}")]
    Parse {
        /// Source [`toml::de::Error`].
        #[from]
        source: toml::de::Error,
    },
}

/// Configuration for one registry client.
#[derive(Clone)]
pub struct ClientConfig {
    base_url: String,
    token: Option<String>,
    allowed_tags: BTreeSet<String>,
    timeout: Duration,
    user_agent: String,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("allowed_tags", &self.allowed_tags)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientConfig {
    /// Creates a configuration for the registry at `base_url`.
    ///
    /// Trailing `/` characters are trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] when the URL is empty or does not
    /// use the `http` or `https` scheme.
    pub fn new(base_url: impl AsRef<str>) -> ConfigResult<Self> {
        let base_url = sanitize_base_url(base_url.as_ref())?;
        Ok(Self {
            base_url,
            token: None,
            allowed_tags: DEFAULT_ALLOWED_TAGS.iter().map(|tag| (*tag).to_owned()).collect(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        })
    }

    /// Sets the OAuth bearer token. Blank tokens are ignored.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = if token.trim().is_empty() {
            None
        } else {
            Some(token)
        };
        self
    }

    /// Replaces the allowed tag set.
    #[must_use]
    pub fn with_allowed_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_tags = tags
            .into_iter()
            .map(Into::into)
            .filter(|tag: &String| !tag.trim().is_empty())
            .collect();
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the identifying client header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the timeout is zero or the user
    /// agent is blank.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid("request timeout must be greater than zero"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid("user agent cannot be empty"));
        }
        Ok(())
    }

    /// Registry base URL without trailing `/`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Bearer token, if configured.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Tags whose operations are exposed.
    #[must_use]
    pub fn allowed_tags(&self) -> &BTreeSet<String> {
        &self.allowed_tags
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Identifying client header value.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

fn sanitize_base_url(input: &str) -> ConfigResult<String> {
    let trimmed = input.trim().trim_end_matches('/');
    let invalid = |reason| ConfigError::InvalidUrl {
        url: input.to_owned(),
        reason,
    };
    let Some((scheme, rest)) = trimmed.split_once("://") else {
        return Err(invalid("registry url must start with http:// or https://"));
    };
    if !matches!(scheme, "http" | "https") {
        return Err(invalid("registry url must start with http:// or https://"));
    }
    if rest.is_empty() {
        return Err(invalid("registry url must include a host"));
    }
    Ok(trimmed.to_owned())
}
