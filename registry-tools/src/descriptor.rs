//! Tool descriptors projected from catalogued endpoints.

use std::collections::BTreeMap;

use registry_catalog::{Catalog, Endpoint};
use registry_primitives::ResourceKey;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::resources::endpoint_details;

/// Reserved optional argument carrying a fully custom resource key.
pub const RESERVED_ARGUMENT: &str = "resource_uri";

const NAME_JOINER: char = '_';
const FALLBACK_NAME: &str = "registry_root";

/// Result alias for tool surface generation.
pub type ToolSurfaceResult<T> = Result<T, ToolSurfaceError>;

/// Errors produced while projecting a catalog into tools.
#[derive(Debug, Error)]
pub enum ToolSurfaceError {
    /// Two endpoints derived the same tool name.
    #[error("tool `{name}` is derived from both `{first}` and `{second}`")]
    DuplicateName {
        /// The contested tool name.
        name: String,
        /// Path of the endpoint that claimed the name first.
        first: String,
        /// Path of the colliding endpoint.
        second: String,
    },

    /// An endpoint declares a parameter under the reserved argument name.
    #[error("endpoint `{path}` declares the reserved argument `resource_uri`")]
    ReservedArgument {
        /// Path of the offending endpoint.
        path: String,
    },
}

/// JSON schema fragment describing one argument.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl PropertySchema {
    fn new(kind: &str, description: Option<String>) -> Self {
        Self {
            kind: kind.to_owned(),
            description,
        }
    }

    /// JSON schema type name.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Optional human-readable description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Object schema for a tool's arguments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InputSchema {
    #[serde(rename = "type")]
    kind: &'static str,
    properties: BTreeMap<String, PropertySchema>,
    required: Vec<String>,
}

impl InputSchema {
    /// Every declared argument.
    #[must_use]
    pub fn properties(&self) -> &BTreeMap<String, PropertySchema> {
        &self.properties
    }

    /// Mandatory argument names, in path order.
    #[must_use]
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Optional argument names, excluding [`RESERVED_ARGUMENT`].
    pub fn optional(&self) -> impl Iterator<Item = &str> {
        self.properties
            .keys()
            .map(String::as_str)
            .filter(|name| {
                *name != RESERVED_ARGUMENT && !self.required.iter().any(|r| r.as_str() == *name)
            })
    }
}

/// Externally advertised, callable projection of one endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    name: String,
    description: String,
    input_schema: InputSchema,
    #[serde(skip)]
    key: ResourceKey,
}

impl ToolDescriptor {
    /// Projects a single endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ToolSurfaceError::ReservedArgument`] when the endpoint
    /// declares a query parameter named [`RESERVED_ARGUMENT`].
    pub fn from_endpoint(endpoint: &Endpoint) -> ToolSurfaceResult<Self> {
        let mut properties = BTreeMap::new();
        let required = endpoint.template().placeholders().to_vec();

        for name in &required {
            let description = endpoint
                .path_parameter(name)
                .and_then(|param| param.description())
                .map(ToOwned::to_owned);
            properties.insert(name.clone(), PropertySchema::new("string", description));
        }

        for param in endpoint.query_parameters() {
            if param.name() == RESERVED_ARGUMENT {
                return Err(ToolSurfaceError::ReservedArgument {
                    path: endpoint.path().to_owned(),
                });
            }
            if endpoint.template().is_placeholder(param.name()) {
                continue;
            }
            let kind = schema_type(param.kind());
            let description = param.description().map(ToOwned::to_owned);
            properties.insert(param.name().to_owned(), PropertySchema::new(kind, description));
        }

        properties.insert(
            RESERVED_ARGUMENT.to_owned(),
            PropertySchema::new(
                "string",
                Some(format!(
                    "Custom resource URI overriding path parameters, e.g. {}",
                    endpoint.key()
                )),
            ),
        );

        let details = endpoint_details(endpoint);
        let description = match endpoint.summary() {
            Some(summary) => format!("{summary}: {details}"),
            None => details,
        };

        Ok(Self {
            name: tool_name(endpoint),
            description,
            input_schema: InputSchema {
                kind: "object",
                properties,
                required,
            },
            key: endpoint.key().clone(),
        })
    }

    /// Stable external name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Argument schema.
    #[must_use]
    pub fn input_schema(&self) -> &InputSchema {
        &self.input_schema
    }

    /// Resource key of the endpoint this tool calls.
    #[must_use]
    pub fn key(&self) -> &ResourceKey {
        &self.key
    }
}

/// The full set of tools generated from one catalog.
#[derive(Clone, Debug, Default)]
pub struct ToolSurface {
    tools: Vec<ToolDescriptor>,
    by_name: BTreeMap<String, usize>,
}

/// Projects every endpoint of the catalog into a tool descriptor.
///
/// # Errors
///
/// Returns [`ToolSurfaceError::DuplicateName`] when two endpoints derive the
/// same tool name, or [`ToolSurfaceError::ReservedArgument`] when an endpoint
/// shadows the reserved argument.
pub fn project(catalog: &Catalog) -> ToolSurfaceResult<ToolSurface> {
    let mut surface = ToolSurface::default();
    for endpoint in catalog {
        let descriptor = ToolDescriptor::from_endpoint(endpoint)?;
        if let Some(&index) = surface.by_name.get(descriptor.name()) {
            let first = catalog
                .get(surface.tools[index].key())
                .map_or_else(|| surface.tools[index].key().to_string(), |e| e.path().to_owned());
            return Err(ToolSurfaceError::DuplicateName {
                name: descriptor.name().to_owned(),
                first,
                second: endpoint.path().to_owned(),
            });
        }
        debug!(tool = descriptor.name(), path = endpoint.path(), "projected tool");
        surface
            .by_name
            .insert(descriptor.name().to_owned(), surface.tools.len());
        surface.tools.push(descriptor);
    }
    Ok(surface)
}

impl ToolSurface {
    /// All descriptors, in catalog order.
    #[must_use]
    pub fn descriptors(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Looks up a descriptor by tool name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.by_name.get(name).map(|&index| &self.tools[index])
    }

    /// Number of tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tool is available.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Derives the external tool name for an endpoint.
///
/// The declared operation identifier wins; otherwise the path is joined with
/// `_` and placeholder braces are dropped.
#[must_use]
pub fn tool_name(endpoint: &Endpoint) -> String {
    if let Some(operation_id) = endpoint.operation_id() {
        return operation_id.to_owned();
    }
    let joined: String = endpoint
        .path()
        .chars()
        .filter(|c| !matches!(c, '{' | '}'))
        .map(|c| if c == '/' { NAME_JOINER } else { c })
        .collect();
    let trimmed = joined.trim_matches(NAME_JOINER);
    if trimmed.is_empty() {
        FALLBACK_NAME.to_owned()
    } else {
        trimmed.to_owned()
    }
}

fn schema_type(declared: Option<&str>) -> &'static str {
    match declared {
        Some("integer") => "integer",
        Some("number") => "number",
        Some("boolean") => "boolean",
        _ => "string",
    }
}
