//! Seam between the generated surface and the external protocol layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ResourceDescriptor, ResourceTemplateDescriptor, ToolDescriptor};

/// Well-formed response handed back across the protocol boundary.
///
/// Failures are reported with `is_error` set rather than as an `Err`, so the
/// caller always receives a payload it can render.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOutput {
    is_error: bool,
    text: String,
}

impl ToolOutput {
    /// Successful output carrying a JSON text body.
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            is_error: false,
            text: text.into(),
        }
    }

    /// Failed invocation described by a JSON text body.
    #[must_use]
    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            text: text.into(),
        }
    }

    /// Whether the invocation failed.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.is_error
    }

    /// JSON text body.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parses the body back into a JSON value.
    #[must_use]
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.text).ok()
    }
}

/// Implemented by anything able to serve the generated tool surface.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Advertised tools.
    fn tools(&self) -> &[ToolDescriptor];

    /// Static resources.
    fn resources(&self) -> Vec<ResourceDescriptor>;

    /// Parameterized resource templates.
    fn resource_templates(&self) -> Vec<ResourceTemplateDescriptor>;

    /// Invokes a tool by name with a JSON object of arguments.
    async fn call_tool(&self, name: &str, arguments: Value) -> ToolOutput;

    /// Reads a resource by concrete URI.
    async fn read_resource(&self, uri: &str) -> ToolOutput;
}
