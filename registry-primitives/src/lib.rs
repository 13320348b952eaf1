//! Core shared types for exposing a registry HTTP API as callable tools.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod path_template;
mod resource_key;

/// Error type and result alias shared across the workspace.
pub use error::{Error, Result};
/// Parsed path templates with `{name}` placeholders.
pub use path_template::{PathTemplate, Substitution};
/// Externally visible identifiers naming one endpoint.
pub use resource_key::{RESOURCE_SCHEME, ResourceKey};
