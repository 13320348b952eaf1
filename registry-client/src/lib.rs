//! Runtime half of the registry tool bridge.
//!
//! [`RegistryClient`] fetches the registry's API description once, derives
//! the endpoint catalog and tool surface from it, and then turns tool calls
//! into single `GET` requests. The [`UrlBuilder`] and [`Dispatcher`] are
//! usable on their own for callers that manage their own catalog.

#![warn(missing_docs, clippy::pedantic)]

mod client;
pub mod discovery;
pub mod dispatcher;
pub mod error;
mod http_client;
pub mod url_builder;

pub use client::RegistryClient;
pub use discovery::{FALLBACK_DISCOVERY_PATH, PRIMARY_DISCOVERY_PATH, fetch_spec};
pub use dispatcher::{DEFAULT_MAX_BODY_BYTES, Dispatcher};
pub use error::{
    CallError, CallResult, ClientError, ClientResult, DiscoveryError, DiscoveryResult, UrlError,
    UrlResult,
};
pub use registry_tools::{ToolOutput, ToolProvider};
pub use url_builder::{UrlBuilder, arguments_from_json};
