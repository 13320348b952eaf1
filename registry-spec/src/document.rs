//! Serde model of the Swagger discovery document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::operation::{Method, Operation, Parameter};

/// Result alias for spec parsing.
pub type SpecResult<T> = Result<T, SpecError>;

/// Errors produced while parsing a discovery document.
#[derive(Debug, Error)]
pub enum SpecError {
    /// The body was not a valid Swagger document.
    #[error("malformed API description: {source}")]
    Malformed {
        /// Source [`serde_json::Error`].
        #[from]
        source: serde_json::Error,
    },
}

/// `info` block of the document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiInfo {
    /// API title.
    #[serde(default)]
    pub title: String,
    /// API version string.
    #[serde(default)]
    pub version: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Operation as it appears under a method slot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOperation {
    /// Summary line.
    #[serde(default)]
    pub summary: String,
    /// Long description.
    #[serde(default)]
    pub description: String,
    /// Operation identifier.
    #[serde(default)]
    pub operation_id: String,
    /// Category tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Operation-level parameters.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

/// One entry of the `paths` object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathItem {
    /// Parameters shared by every operation of the path.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// `get` slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<RawOperation>,
    /// `put` slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<RawOperation>,
    /// `post` slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<RawOperation>,
    /// `delete` slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<RawOperation>,
    /// `options` slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<RawOperation>,
    /// `head` slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<RawOperation>,
    /// `patch` slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<RawOperation>,
}

impl PathItem {
    fn slots(&self) -> [(Method, Option<&RawOperation>); 7] {
        [
            (Method::Get, self.get.as_ref()),
            (Method::Put, self.put.as_ref()),
            (Method::Post, self.post.as_ref()),
            (Method::Delete, self.delete.as_ref()),
            (Method::Options, self.options.as_ref()),
            (Method::Head, self.head.as_ref()),
            (Method::Patch, self.patch.as_ref()),
        ]
    }
}

/// Parsed discovery document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecDocument {
    /// Host the API is served from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Path prefix shared by every endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    /// Transfer schemes.
    #[serde(default)]
    pub schemes: Vec<String>,
    /// API metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<ApiInfo>,
    /// Path items keyed by raw path template.
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
}

impl SpecDocument {
    /// Parses a document from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Malformed`] when the bytes are not a JSON object
    /// of the expected shape.
    pub fn from_slice(bytes: &[u8]) -> SpecResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Declared base path, ignoring empty values.
    #[must_use]
    pub fn base_path(&self) -> Option<&str> {
        self.base_path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
    }

    /// Number of path items in the document.
    #[must_use]
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// Flattens every method slot into an [`Operation`], ordered by path and
    /// then method.
    ///
    /// Path-level parameters are merged into each operation; an
    /// operation-level parameter with the same name and location wins.
    /// Parameters without a name (unresolved references) are skipped.
    #[must_use]
    pub fn operations(&self) -> Vec<Operation> {
        let mut operations = Vec::new();
        for (path, item) in &self.paths {
            for (method, raw) in item.slots() {
                let Some(raw) = raw else { continue };
                operations.push(to_operation(path, method, raw, &item.parameters));
            }
        }
        operations
    }
}

fn to_operation(path: &str, method: Method, raw: &RawOperation, shared: &[Parameter]) -> Operation {
    let mut parameters: Vec<Parameter> = shared
        .iter()
        .filter(|param| !raw.parameters.iter().any(|own| own.same_slot(param)))
        .cloned()
        .collect();
    parameters.extend(raw.parameters.iter().cloned());
    parameters.retain(|param| !param.name().trim().is_empty());

    Operation::new(path, method)
        .with_summary(raw.summary.clone())
        .with_description(raw.description.clone())
        .with_operation_id(raw.operation_id.clone())
        .with_tags(raw.tags.iter().cloned())
        .with_parameters(parameters)
}
