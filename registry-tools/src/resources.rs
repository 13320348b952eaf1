//! Resource and resource-template views over the catalog.
//!
//! Endpoints without placeholders are advertised as static resources whose
//! URI is the resource key; parameterized endpoints become templates that a
//! caller instantiates by filling the placeholders inside the key.

use registry_catalog::{Catalog, Endpoint};
use registry_primitives::ResourceKey;
use serde::Serialize;

/// MIME type reported for every registry response.
pub const JSON_MIME_TYPE: &str = "application/json";

/// Static resource backed by an endpoint without placeholders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    /// Resource key.
    pub uri: ResourceKey,
    /// Display name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Content type of reads.
    pub mime_type: &'static str,
}

/// Parameterized resource backed by an endpoint with placeholders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTemplateDescriptor {
    /// Resource key still containing `{name}` placeholders.
    pub uri_template: ResourceKey,
    /// Display name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Content type of reads.
    pub mime_type: &'static str,
}

/// Lists endpoints without placeholders as static resources.
#[must_use]
pub fn resources(catalog: &Catalog) -> Vec<ResourceDescriptor> {
    catalog
        .iter()
        .filter(|endpoint| !endpoint.template().has_placeholders())
        .map(|endpoint| ResourceDescriptor {
            uri: endpoint.key().clone(),
            name: endpoint_title(endpoint),
            description: endpoint_details(endpoint),
            mime_type: JSON_MIME_TYPE,
        })
        .collect()
}

/// Lists parameterized endpoints as resource templates.
#[must_use]
pub fn resource_templates(catalog: &Catalog) -> Vec<ResourceTemplateDescriptor> {
    catalog
        .iter()
        .filter(|endpoint| endpoint.template().has_placeholders())
        .map(|endpoint| ResourceTemplateDescriptor {
            uri_template: endpoint.key().clone(),
            name: endpoint_title(endpoint),
            description: endpoint_details(endpoint),
            mime_type: JSON_MIME_TYPE,
        })
        .collect()
}

/// Display name: summary, else description, else `GET <path>`.
#[must_use]
pub fn endpoint_title(endpoint: &Endpoint) -> String {
    endpoint
        .summary()
        .or(endpoint.description())
        .map_or_else(|| format!("{} {}", endpoint.method(), endpoint.path()), ToOwned::to_owned)
}

/// Method and path followed by description, tags and operation identifier.
#[must_use]
pub fn endpoint_details(endpoint: &Endpoint) -> String {
    let mut details = format!("{} {}", endpoint.method(), endpoint.path());
    if let Some(description) = endpoint.description() {
        details.push_str(" - ");
        details.push_str(description);
    }
    if !endpoint.tags().is_empty() {
        details.push_str(&format!(" (Tags: {})", endpoint.tags().join(", ")));
    }
    if let Some(operation_id) = endpoint.operation_id() {
        details.push_str(&format!(" [{operation_id}]"));
    }
    details
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use registry_spec::{Method, Operation};

    fn catalog() -> Catalog {
        let tags: BTreeSet<String> = ["user", "repository", "health"]
            .into_iter()
            .map(ToOwned::to_owned)
            .collect();
        let ops = vec![
            Operation::new("/api/v1/user", Method::Get)
                .with_summary("Get current user")
                .with_description("Returns information about the current user")
                .with_tags(["user"])
                .with_operation_id("getCurrentUser"),
            Operation::new("/api/v1/repository/{namespace}/{repository}", Method::Get)
                .with_summary("Get repository")
                .with_tags(["repository"])
                .with_operation_id("getRepository"),
            Operation::new("/api/v1/health", Method::Get)
                .with_description("Check service health")
                .with_tags(["health"]),
        ];
        Catalog::from_operations(None, ops, &tags).unwrap()
    }

    #[test]
    fn splits_static_and_parameterized_endpoints() {
        let catalog = catalog();
        let statics = resources(&catalog);
        let templates = resource_templates(&catalog);

        let uris: Vec<_> = statics.iter().map(|r| r.uri.as_str()).collect();
        assert_eq!(uris, vec!["quay://api/v1/health", "quay://api/v1/user"]);

        assert_eq!(templates.len(), 1);
        assert_eq!(
            templates[0].uri_template.as_str(),
            "quay://api/v1/repository/{namespace}/{repository}"
        );
        assert_eq!(templates[0].name, "Get repository");
        assert_eq!(templates[0].mime_type, JSON_MIME_TYPE);
    }

    #[test]
    fn titles_fall_back_to_description_then_path() {
        let catalog = catalog();
        let statics = resources(&catalog);
        assert_eq!(statics[0].name, "Check service health");
        assert_eq!(statics[1].name, "Get current user");

        let bare = Catalog::from_operations(
            None,
            vec![Operation::new("/api/v1/plans/", Method::Get).with_tags(["health"])],
            &["health".to_owned()].into(),
        )
        .unwrap();
        assert_eq!(resources(&bare)[0].name, "GET /api/v1/plans/");
    }

    #[test]
    fn details_include_tags_and_operation_id() {
        let catalog = catalog();
        let user = &resources(&catalog)[1];
        assert_eq!(
            user.description,
            "GET /api/v1/user - Returns information about the current user (Tags: user) [getCurrentUser]"
        );
    }
}
