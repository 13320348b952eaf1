//! Catalog construction and lookup.

use std::collections::{BTreeMap, BTreeSet};

use registry_primitives::{PathTemplate, ResourceKey};
use registry_spec::{Operation, SpecDocument};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::Endpoint;

/// Result alias for catalog construction.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors detected while building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Two distinct path templates normalised to the same resource key.
    #[error("resource key `{key}` is produced by both `{first}` and `{second}`")]
    KeyCollision {
        /// The contested key.
        key: ResourceKey,
        /// Template that claimed the key first.
        first: String,
        /// Template that collided with it.
        second: String,
    },
}

/// Immutable set of endpoints keyed by resource key.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    base_path: Option<String>,
    endpoints: BTreeMap<ResourceKey, Endpoint>,
}

/// Builds the catalog for a discovered document.
///
/// An absent document yields an empty catalog; discovery failures are
/// reported by the fetch step, not here.
///
/// # Errors
///
/// Returns [`CatalogError::KeyCollision`] when two retained templates map to
/// the same resource key.
pub fn build_catalog(
    spec: Option<&SpecDocument>,
    allowed_tags: &BTreeSet<String>,
) -> CatalogResult<Catalog> {
    let Some(spec) = spec else {
        return Ok(Catalog::default());
    };
    let catalog = Catalog::from_operations(spec.base_path(), spec.operations(), allowed_tags)?;
    info!(
        endpoints = catalog.len(),
        paths = spec.path_count(),
        "built endpoint catalog"
    );
    Ok(catalog)
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from already flattened operations.
    ///
    /// Non-`GET` operations and operations whose tags do not intersect
    /// `allowed_tags` (exact, case-sensitive) are dropped. Operations whose
    /// path cannot be parsed as a template are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::KeyCollision`] when two retained templates map
    /// to the same resource key.
    pub fn from_operations<I>(
        base_path: Option<&str>,
        operations: I,
        allowed_tags: &BTreeSet<String>,
    ) -> CatalogResult<Self>
    where
        I: IntoIterator<Item = Operation>,
    {
        let mut endpoints: BTreeMap<ResourceKey, Endpoint> = BTreeMap::new();

        for operation in operations {
            if !operation.method().is_get() {
                debug!(path = operation.path(), method = %operation.method(), "skipping non-GET operation");
                continue;
            }
            if !operation.tags().iter().any(|tag| allowed_tags.contains(tag)) {
                debug!(path = operation.path(), tags = ?operation.tags(), "skipping operation outside allowed tags");
                continue;
            }

            let template = match PathTemplate::parse(operation.path()) {
                Ok(template) => template,
                Err(err) => {
                    warn!(path = operation.path(), error = %err, "skipping unparseable path");
                    continue;
                }
            };

            let endpoint = Endpoint::from_operation(&operation, template);
            if let Some(existing) = endpoints.get(endpoint.key()) {
                return Err(CatalogError::KeyCollision {
                    key: endpoint.key().clone(),
                    first: existing.path().to_owned(),
                    second: endpoint.path().to_owned(),
                });
            }
            endpoints.insert(endpoint.key().clone(), endpoint);
        }

        Ok(Self {
            base_path: base_path.map(ToOwned::to_owned),
            endpoints,
        })
    }

    /// Base path declared by the API description.
    #[must_use]
    pub fn base_path(&self) -> Option<&str> {
        self.base_path.as_deref()
    }

    /// Number of endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether the catalog holds no endpoint.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Looks up an endpoint by its exact resource key.
    #[must_use]
    pub fn get(&self, key: &ResourceKey) -> Option<&Endpoint> {
        self.endpoints.get(key)
    }

    /// Resolves a possibly instantiated key to the endpoint it names.
    ///
    /// An exact key match wins. Otherwise the endpoint whose template matches
    /// the key's path is returned, preferring templates with fewer
    /// placeholders.
    #[must_use]
    pub fn resolve(&self, key: &ResourceKey) -> Option<&Endpoint> {
        if let Some(endpoint) = self.endpoints.get(key) {
            return Some(endpoint);
        }
        let path = key.path();
        self.endpoints
            .values()
            .filter(|endpoint| endpoint.template().matches(&path))
            .min_by_key(|endpoint| endpoint.template().placeholders().len())
    }

    /// Iterates endpoints in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.values()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Endpoint;
    type IntoIter = std::collections::btree_map::Values<'a, ResourceKey, Endpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.endpoints.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registry_spec::{Method, Parameter, ParameterLocation};

    fn tags(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|tag| (*tag).to_owned()).collect()
    }

    fn get(path: &str, tag: &str) -> Operation {
        Operation::new(path, Method::Get).with_tags([tag])
    }

    #[test]
    fn keeps_only_allowed_tags() {
        let ops = vec![
            get("/api/v1/repository", "repository"),
            get("/api/v1/plans/", "billing"),
        ];
        let catalog = Catalog::from_operations(None, ops, &tags(&["repository"])).unwrap();

        assert_eq!(catalog.len(), 1);
        let endpoint = catalog.iter().next().unwrap();
        assert_eq!(endpoint.path(), "/api/v1/repository");
        assert_eq!(endpoint.key().as_str(), "quay://api/v1/repository");
    }

    #[test]
    fn tag_match_is_case_sensitive() {
        let ops = vec![get("/api/v1/repository", "Repository")];
        let catalog = Catalog::from_operations(None, ops, &tags(&["repository"])).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn drops_non_get_operations() {
        let ops = vec![
            Operation::new("/api/v1/repository", Method::Post).with_tags(["repository"]),
            Operation::new("/api/v1/repository/{repository}", Method::Delete)
                .with_tags(["repository"]),
        ];
        let catalog = Catalog::from_operations(None, ops, &tags(&["repository"])).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn absent_spec_builds_empty_catalog() {
        let catalog = build_catalog(None, &tags(&["repository"])).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.base_path(), None);
    }

    #[test]
    fn detects_key_collisions() {
        let ops = vec![get("/api/v1/user", "user"), get("api/v1/user", "user")];
        let err = Catalog::from_operations(None, ops, &tags(&["user"]))
            .expect_err("collision should be reported");
        assert!(matches!(
            err,
            CatalogError::KeyCollision { ref first, ref second, .. }
                if first == "/api/v1/user" && second == "api/v1/user"
        ));
    }

    #[test]
    fn keeps_path_and_query_parameters_only() {
        let op = get("/api/v1/repository/{repository}/tag/", "tag").with_parameters(vec![
            Parameter::new("repository", ParameterLocation::Path).required(true),
            Parameter::new("limit", ParameterLocation::Query),
            Parameter::new("body", ParameterLocation::Body),
        ]);
        let catalog = Catalog::from_operations(None, vec![op], &tags(&["tag"])).unwrap();
        let endpoint = catalog.iter().next().unwrap();
        let names: Vec<_> = endpoint.query_parameters().map(Parameter::name).collect();
        assert_eq!(names, vec!["limit"]);
        assert!(endpoint.path_parameter("repository").is_some());
        assert!(endpoint.path_parameter("body").is_none());
    }

    #[test]
    fn resolves_instantiated_keys() {
        let ops = vec![
            get("/api/v1/repository/{namespace}/{repository}", "repository"),
            get("/api/v1/repository/{namespace}/tags", "repository"),
            get("/api/v1/user/", "user"),
        ];
        let catalog =
            Catalog::from_operations(Some("/api/v1"), ops, &tags(&["repository", "user"])).unwrap();

        let concrete = ResourceKey::parse("quay://api/v1/repository/myorg/myrepo").unwrap();
        let endpoint = catalog.resolve(&concrete).expect("template matches");
        assert_eq!(endpoint.path(), "/api/v1/repository/{namespace}/{repository}");

        let literal_wins = ResourceKey::parse("quay://api/v1/repository/myorg/tags").unwrap();
        let endpoint = catalog.resolve(&literal_wins).expect("template matches");
        assert_eq!(endpoint.path(), "/api/v1/repository/{namespace}/tags");

        let exact = ResourceKey::parse("quay://api/v1/user/").unwrap();
        assert_eq!(catalog.resolve(&exact).unwrap().path(), "/api/v1/user/");

        let unknown = ResourceKey::parse("quay://api/v1/nothing").unwrap();
        assert!(catalog.resolve(&unknown).is_none());
        assert_eq!(catalog.base_path(), Some("/api/v1"));
    }

    #[test]
    fn skips_unparseable_paths() {
        let ops = vec![get("/api/v1/{broken", "user"), get("/api/v1/user", "user")];
        let catalog = Catalog::from_operations(None, ops, &tags(&["user"])).unwrap();
        assert_eq!(catalog.len(), 1);
    }
}
