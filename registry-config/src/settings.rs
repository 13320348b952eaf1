//! TOML settings file.
//!
//! ```toml
//! [registry]
//! url = "https://quay.io"
//! token = "..."
//! allowed_tags = ["repository", "tag"]
//! timeout_secs = 30
//!
//! [logging]
//! level = "info"
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ClientConfig, ConfigError, ConfigResult};

/// Root of a settings file. Every section and key is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Registry connection settings.
    pub registry: RegistrySettings,
    /// Log output settings.
    pub logging: LoggingSettings,
}

/// `[registry]` section.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistrySettings {
    /// Registry base URL.
    pub url: Option<String>,
    /// OAuth bearer token.
    pub token: Option<String>,
    /// Tags whose operations are exposed.
    pub allowed_tags: Option<Vec<String>>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Identifying client header value.
    pub user_agent: Option<String>,
}

/// `[logging]` section.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: Option<String>,
}

/// Reads a settings file; shorthand for [`Settings::load`].
///
/// # Errors
///
/// See [`Settings::load`].
pub fn load_settings(path: impl AsRef<Path>) -> ConfigResult<Settings> {
    Settings::load(path)
}

impl Settings {
    /// Reads and parses a settings file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Parse`] when it is not valid settings TOML.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded settings file");
        Self::from_toml_str(&contents)
    }

    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed input or unknown keys.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Converts the `[registry]` section into a validated [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when no URL is set or a value fails
    /// validation, and [`ConfigError::InvalidUrl`] for a malformed URL.
    pub fn client_config(&self) -> ConfigResult<ClientConfig> {
        let registry = &self.registry;
        let url = registry
            .url
            .as_deref()
            .ok_or(ConfigError::Invalid("registry url is required"))?;

        let mut config = ClientConfig::new(url)?;
        if let Some(token) = &registry.token {
            config = config.with_token(token.clone());
        }
        if let Some(tags) = &registry.allowed_tags {
            config = config.with_allowed_tags(tags.iter().cloned());
        }
        if let Some(secs) = registry.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(user_agent) = &registry.user_agent {
            config = config.with_user_agent(user_agent.clone());
        }
        config.validate()?;
        Ok(config)
    }
}
