//! Quay registry API exposed as generated, callable tools.
//!
//! This facade bundles the workspace crates behind feature flags. Most users
//! only need [`client::RegistryClient`]:
//!
//! ```no_run
//! use quay_mcp::client::{RegistryClient, ToolProvider};
//! use quay_mcp::config::ClientConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = RegistryClient::new(ClientConfig::new("https://quay.io")?)?;
//! client.discover().await?;
//! let output = client
//!     .call_tool("listRepos", serde_json::json!({ "namespace": "redhat", "public": true }))
//!     .await;
//! println!("{}", output.text());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, clippy::pedantic)]

/// Resource keys and path templates.
pub use registry_primitives as primitives;

/// Discovery document model.
pub use registry_spec as spec;

/// Tag-filtered endpoint catalog.
pub use registry_catalog as catalog;

/// Tool, resource and resource-template projections (enabled by `tools` feature).
#[cfg(feature = "tools")]
pub use registry_tools as tools;

/// Discovery, URL building and dispatch (enabled by `client` feature).
#[cfg(feature = "client")]
pub use registry_client as client;

/// Client configuration and settings files (enabled by `config` feature).
#[cfg(feature = "config")]
pub use registry_config as config;

/// Tracing bootstrap for binaries (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use registry_telemetry as telemetry;
