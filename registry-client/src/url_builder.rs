//! Request URL assembly for both call shapes.
//!
//! The resource-key shape recovers path values by matching a concrete key
//! against the endpoint template; the named-argument shape partitions a flat
//! argument map into path and query values. Both end in the same assembly
//! step so their output is identical for equivalent input.

use std::collections::BTreeMap;

use registry_catalog::Endpoint;
use registry_primitives::ResourceKey;
use registry_tools::RESERVED_ARGUMENT;
use serde_json::Value;
use url::Url;

use crate::error::{UrlError, UrlResult};

/// Builds absolute request URLs for catalogued endpoints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlBuilder {
    base_url: String,
    base_path: Option<String>,
}

impl UrlBuilder {
    /// Creates a builder for a registry base URL and the document's base path.
    ///
    /// Trailing separators are trimmed from both; an empty or `/` base path is
    /// treated as absent.
    #[must_use]
    pub fn new(base_url: &str, base_path: Option<&str>) -> Self {
        let base_path = base_path
            .map(|path| path.trim().trim_matches('/'))
            .filter(|path| !path.is_empty())
            .map(|path| format!("/{path}"));
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_owned(),
            base_path,
        }
    }

    /// Registry base URL without trailing separator.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Normalised base path, always starting with `/`.
    #[must_use]
    pub fn base_path(&self) -> Option<&str> {
        self.base_path.as_deref()
    }

    /// Builds the URL named by a concrete resource key.
    ///
    /// # Errors
    ///
    /// Returns [`UrlError::UnresolvedParameter`] when the key does not match
    /// the endpoint template and the template has placeholders.
    pub fn for_resource_key(&self, endpoint: &Endpoint, key: &ResourceKey) -> UrlResult<Url> {
        self.assemble(endpoint, Some(key), &BTreeMap::new())
    }

    /// Builds the URL for a flat map of named arguments.
    ///
    /// Names matching a placeholder fill the path; every other name except
    /// [`RESERVED_ARGUMENT`] becomes a query parameter. A non-empty
    /// [`RESERVED_ARGUMENT`] is parsed as a resource key whose matched values
    /// take precedence over named path arguments.
    ///
    /// # Errors
    ///
    /// Returns [`UrlError::UnresolvedParameter`] when a placeholder has no
    /// value and [`UrlError::InvalidArgument`] for a malformed override key.
    pub fn for_arguments(
        &self,
        endpoint: &Endpoint,
        arguments: &BTreeMap<String, String>,
    ) -> UrlResult<Url> {
        let override_key = arguments
            .get(RESERVED_ARGUMENT)
            .filter(|value| !value.trim().is_empty())
            .map(|value| {
                ResourceKey::parse(value.trim())
                    .map_err(|err| UrlError::invalid_argument(RESERVED_ARGUMENT, err.to_string()))
            })
            .transpose()?;
        self.assemble(endpoint, override_key.as_ref(), arguments)
    }

    /// Prefixes the base path unless `path` already starts with it on a
    /// segment boundary.
    #[must_use]
    pub fn prefixed_path(&self, path: &str) -> String {
        let path = if path.starts_with('/') {
            path.to_owned()
        } else {
            format!("/{path}")
        };
        match &self.base_path {
            Some(base) if !starts_with_segment(&path, base) => format!("{base}{path}"),
            _ => path,
        }
    }

    fn assemble(
        &self,
        endpoint: &Endpoint,
        key: Option<&ResourceKey>,
        arguments: &BTreeMap<String, String>,
    ) -> UrlResult<Url> {
        let template = endpoint.template();
        let mut path_values = BTreeMap::new();
        let mut query = BTreeMap::new();

        for (name, value) in arguments {
            if name == RESERVED_ARGUMENT || value.is_empty() {
                continue;
            }
            if template.is_placeholder(name) {
                ensure_no_dot_segment(name, value)?;
                path_values.insert(name.clone(), encode_path_value(value));
            } else {
                query.insert(name.as_str(), value.as_str());
            }
        }

        if let Some(key) = key {
            let concrete = key.path();
            for (name, value) in template.extract(&concrete) {
                if value != format!("{{{name}}}") {
                    ensure_no_dot_segment(&name, &value)?;
                    path_values.insert(name, encode_path_value(&value));
                }
            }
        }

        let substitution = template.substitute(&path_values);
        if !substitution.is_complete() {
            return Err(UrlError::UnresolvedParameter {
                names: substitution.unresolved().to_vec(),
            });
        }

        let raw = format!("{}{}", self.base_url, self.prefixed_path(substitution.path()));
        let mut url = Url::parse(&raw).map_err(|err| UrlError::InvalidUrl {
            url: raw.clone(),
            reason: err.to_string(),
        })?;

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }
}

/// Converts a JSON argument object into the flat string map used for URLs.
///
/// Strings pass through, numbers and booleans are rendered as JSON text and
/// `null` values are dropped. A `null` document is an empty map.
///
/// # Errors
///
/// Returns [`UrlError::InvalidArgument`] for arrays, nested objects or a
/// document that is not an object.
pub fn arguments_from_json(arguments: &Value) -> UrlResult<BTreeMap<String, String>> {
    let object = match arguments {
        Value::Null => return Ok(BTreeMap::new()),
        Value::Object(object) => object,
        _ => {
            return Err(UrlError::invalid_argument(
                "arguments",
                "arguments must be a JSON object",
            ));
        }
    };

    let mut converted = BTreeMap::new();
    for (name, value) in object {
        let rendered = match value {
            Value::Null => continue,
            Value::String(text) => text.clone(),
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(UrlError::invalid_argument(
                    name.clone(),
                    "only strings, numbers and booleans are supported",
                ));
            }
        };
        converted.insert(name.clone(), rendered);
    }
    Ok(converted)
}

fn starts_with_segment(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Rejects path values that URL normalisation would turn into `.` or `..`
/// segments, which could move a request onto an endpoint outside the catalog.
fn ensure_no_dot_segment(name: &str, value: &str) -> UrlResult<()> {
    let dotted = value.split(['/', '\\']).any(|piece| {
        let decoded = piece.to_ascii_lowercase().replace("%2e", ".");
        decoded == "." || decoded == ".."
    });
    if dotted {
        return Err(UrlError::invalid_argument(
            name,
            "relative path segments are not allowed",
        ));
    }
    Ok(())
}

fn encode_path_value(value: &str) -> String {
    value.replace('?', "%3F").replace('#', "%23")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use registry_catalog::Catalog;
    use registry_spec::{Method, Operation, Parameter, ParameterLocation};

    fn catalog(paths: &[&str]) -> Catalog {
        let tags: BTreeSet<String> = ["repository".to_owned()].into();
        let ops = paths.iter().map(|path| {
            Operation::new(*path, Method::Get)
                .with_tags(["repository"])
                .with_parameters(vec![Parameter::new("public", ParameterLocation::Query)])
        });
        Catalog::from_operations(Some("/api/v1"), ops, &tags).unwrap()
    }

    fn endpoint<'a>(catalog: &'a Catalog, path: &str) -> &'a Endpoint {
        catalog
            .get(&ResourceKey::from_path(path))
            .expect("endpoint is catalogued")
    }

    fn args(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn resource_key_fills_placeholders_without_duplicating_base_path() {
        let template = "/api/v1/repository/{namespace}/{repository}";
        let catalog = catalog(&[template]);
        let builder = UrlBuilder::new("https://quay.io/", Some("/api/v1"));
        let key = ResourceKey::parse("quay://api/v1/repository/myorg/myrepo").unwrap();

        let url = builder
            .for_resource_key(endpoint(&catalog, template), &key)
            .unwrap();
        assert_eq!(url.as_str(), "https://quay.io/api/v1/repository/myorg/myrepo");
    }

    #[test]
    fn mismatched_key_is_unresolved() {
        let template = "/api/v1/repository/{namespace}/{repository}";
        let catalog = catalog(&[template]);
        let builder = UrlBuilder::new("https://quay.io", None);
        let key = ResourceKey::parse("quay://api/v1/repository/only-one").unwrap();

        let err = builder
            .for_resource_key(endpoint(&catalog, template), &key)
            .expect_err("segment count differs");
        assert!(matches!(
            err,
            UrlError::UnresolvedParameter { ref names } if names == &["namespace", "repository"]
        ));

        let template_key = ResourceKey::from_path(template);
        let err = builder
            .for_resource_key(endpoint(&catalog, template), &template_key)
            .expect_err("uninstantiated key");
        assert!(matches!(err, UrlError::UnresolvedParameter { .. }));
    }

    #[test]
    fn named_arguments_without_placeholders_become_sorted_query() {
        let catalog = catalog(&["/api/v1/repository"]);
        let builder = UrlBuilder::new("https://quay.io", Some("/api/v1"));
        let endpoint = endpoint(&catalog, "/api/v1/repository");

        let url = builder
            .for_arguments(endpoint, &args(&[("public", "true"), ("namespace", "redhat")]))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://quay.io/api/v1/repository?namespace=redhat&public=true"
        );

        let again = builder
            .for_arguments(endpoint, &args(&[("namespace", "redhat"), ("public", "true")]))
            .unwrap();
        assert_eq!(url, again);
    }

    #[test]
    fn named_arguments_split_path_and_query() {
        let template = "/api/v1/repository/{namespace}/{repository}";
        let catalog = catalog(&[template]);
        let builder = UrlBuilder::new("https://quay.io", Some("/api/v1"));

        let url = builder
            .for_arguments(
                endpoint(&catalog, template),
                &args(&[
                    ("namespace", "myorg"),
                    ("repository", "myrepo"),
                    ("includeTags", "true"),
                    ("empty", ""),
                ]),
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://quay.io/api/v1/repository/myorg/myrepo?includeTags=true"
        );
        assert!(!url.as_str().contains('{'));
    }

    #[test]
    fn empty_query_set_has_no_question_mark() {
        let catalog = catalog(&["/api/v1/user/"]);
        let builder = UrlBuilder::new("https://quay.io", None);
        let url = builder
            .for_arguments(endpoint(&catalog, "/api/v1/user/"), &BTreeMap::new())
            .unwrap();
        assert_eq!(url.as_str(), "https://quay.io/api/v1/user/");
        assert!(url.query().is_none());
    }

    #[test]
    fn missing_named_argument_is_reported() {
        let template = "/api/v1/repository/{namespace}/{repository}";
        let catalog = catalog(&[template]);
        let builder = UrlBuilder::new("https://quay.io", None);
        let err = builder
            .for_arguments(endpoint(&catalog, template), &args(&[("namespace", "myorg")]))
            .expect_err("repository missing");
        assert!(matches!(
            err,
            UrlError::UnresolvedParameter { ref names } if names == &["repository"]
        ));
    }

    #[test]
    fn reserved_argument_overrides_path_values() {
        let template = "/api/v1/repository/{namespace}/{repository}";
        let catalog = catalog(&[template]);
        let builder = UrlBuilder::new("https://quay.io", Some("/api/v1"));

        let url = builder
            .for_arguments(
                endpoint(&catalog, template),
                &args(&[
                    ("namespace", "ignored"),
                    (RESERVED_ARGUMENT, "quay://api/v1/repository/redhat/ubi8"),
                ]),
            )
            .unwrap();
        assert_eq!(url.as_str(), "https://quay.io/api/v1/repository/redhat/ubi8");

        let err = builder
            .for_arguments(
                endpoint(&catalog, template),
                &args(&[(RESERVED_ARGUMENT, "https://quay.io/api")]),
            )
            .expect_err("foreign scheme");
        assert!(matches!(err, UrlError::InvalidArgument { .. }));
    }

    #[test]
    fn base_path_joins_on_segment_boundaries() {
        let builder = UrlBuilder::new("https://quay.io", Some("api/v1/"));
        assert_eq!(builder.base_path(), Some("/api/v1"));
        assert_eq!(builder.prefixed_path("/api/v1/user"), "/api/v1/user");
        assert_eq!(builder.prefixed_path("/api/v1"), "/api/v1");
        assert_eq!(builder.prefixed_path("/api/v10/user"), "/api/v1/api/v10/user");
        assert_eq!(builder.prefixed_path("user"), "/api/v1/user");

        let bare = UrlBuilder::new("https://quay.io", Some("/"));
        assert_eq!(bare.base_path(), None);
        assert_eq!(bare.prefixed_path("user"), "/user");
    }

    #[test]
    fn reserved_characters_in_path_values_are_encoded() {
        let template = "/api/v1/repository/{namespace}/{repository}";
        let catalog = catalog(&[template]);
        let builder = UrlBuilder::new("https://quay.io", None);
        let url = builder
            .for_arguments(
                endpoint(&catalog, template),
                &args(&[("namespace", "a?b"), ("repository", "c#d")]),
            )
            .unwrap();
        assert_eq!(url.path(), "/api/v1/repository/a%3Fb/c%23d");
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }

    #[test]
    fn dot_segments_in_named_arguments_are_rejected() {
        let template = "/api/v1/repository/{namespace}/{repository}";
        let catalog = catalog(&[template]);
        let builder = UrlBuilder::new("https://quay.io", Some("/api/v1"));
        let endpoint = endpoint(&catalog, template);

        for (namespace, repository) in [
            ("..", ".."),
            ("%2e%2e", "superuser"),
            ("myorg", ".%2E"),
            ("myorg", "a/../../plans"),
            (".", "myrepo"),
            ("myorg", "..\\plans"),
        ] {
            let err = builder
                .for_arguments(
                    endpoint,
                    &args(&[("namespace", namespace), ("repository", repository)]),
                )
                .expect_err("dot segment must not reach the url");
            assert!(
                matches!(err, UrlError::InvalidArgument { .. }),
                "{namespace}/{repository}: {err}"
            );
        }

        let url = builder
            .for_arguments(
                endpoint,
                &args(&[("namespace", "my.org"), ("repository", "...")]),
            )
            .unwrap();
        assert_eq!(url.path(), "/api/v1/repository/my.org/...");
    }

    #[test]
    fn dot_segments_in_resource_keys_are_rejected() {
        let template = "/api/v1/repository/{namespace}/{repository}";
        let catalog = catalog(&[template]);
        let builder = UrlBuilder::new("https://quay.io", Some("/api/v1"));
        let endpoint = endpoint(&catalog, template);

        let key = ResourceKey::parse("quay://api/v1/repository/../plans").unwrap();
        let err = builder
            .for_resource_key(endpoint, &key)
            .expect_err("key climbs out of the template");
        assert!(matches!(err, UrlError::InvalidArgument { ref name, .. } if name == "namespace"));

        let err = builder
            .for_arguments(
                endpoint,
                &args(&[(RESERVED_ARGUMENT, "quay://api/v1/repository/myorg/%2e%2e")]),
            )
            .expect_err("override key climbs out of the template");
        assert!(matches!(err, UrlError::InvalidArgument { ref name, .. } if name == "repository"));
    }

    #[test]
    fn json_arguments_are_flattened() {
        let converted = arguments_from_json(&serde_json::json!({
            "namespace": "redhat",
            "limit": 10,
            "public": true,
            "page": null,
        }))
        .unwrap();
        assert_eq!(
            converted,
            args(&[("limit", "10"), ("namespace", "redhat"), ("public", "true")])
        );

        assert!(arguments_from_json(&Value::Null).unwrap().is_empty());

        let err = arguments_from_json(&serde_json::json!({ "tags": ["a"] }))
            .expect_err("arrays rejected");
        assert!(matches!(err, UrlError::InvalidArgument { ref name, .. } if name == "tags"));

        let err = arguments_from_json(&serde_json::json!("x")).expect_err("not an object");
        assert!(matches!(err, UrlError::InvalidArgument { .. }));
    }
}
