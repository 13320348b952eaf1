//! Configuration management for the registry client.
//!
//! [`ClientConfig`] is the validated, in-process configuration. [`Settings`]
//! is its on-disk TOML form, used by binaries.

#![warn(missing_docs, clippy::pedantic)]

mod client;
mod settings;

pub use client::{
    ClientConfig, ConfigError, ConfigResult, DEFAULT_ALLOWED_TAGS, DEFAULT_TIMEOUT,
    DEFAULT_USER_AGENT,
};
pub use settings::{LoggingSettings, RegistrySettings, Settings, load_settings};
