//! Endpoints retained in the catalog.

use registry_primitives::{PathTemplate, ResourceKey};
use registry_spec::{Method, Operation, Parameter, ParameterLocation};

/// One read-only operation exposed by the catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    key: ResourceKey,
    template: PathTemplate,
    method: Method,
    summary: Option<String>,
    description: Option<String>,
    operation_id: Option<String>,
    tags: Vec<String>,
    parameters: Vec<Parameter>,
}

impl Endpoint {
    pub(crate) fn from_operation(operation: &Operation, template: PathTemplate) -> Self {
        Self {
            key: ResourceKey::from_path(template.as_str()),
            template,
            method: operation.method(),
            summary: operation.summary().map(ToOwned::to_owned),
            description: operation.description().map(ToOwned::to_owned),
            operation_id: operation.operation_id().map(ToOwned::to_owned),
            tags: operation.tags().to_vec(),
            parameters: operation
                .parameters()
                .iter()
                .filter(|param| {
                    matches!(
                        param.location(),
                        ParameterLocation::Path | ParameterLocation::Query
                    )
                })
                .cloned()
                .collect(),
        }
    }

    /// Resource key naming this endpoint.
    #[must_use]
    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    /// Parsed path template.
    #[must_use]
    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    /// Raw path template text.
    #[must_use]
    pub fn path(&self) -> &str {
        self.template.as_str()
    }

    /// HTTP method; always `GET` for catalogued endpoints.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Summary line, if declared.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Long description, if declared.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Operation identifier, if declared.
    #[must_use]
    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    /// Category tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Query parameters declared by the operation.
    pub fn query_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(|param| param.location() == ParameterLocation::Query)
    }

    /// Declared path parameter matching a placeholder name.
    #[must_use]
    pub fn path_parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|param| param.location() == ParameterLocation::Path && param.name() == name)
    }
}
