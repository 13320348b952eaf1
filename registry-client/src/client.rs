//! Registry client facade: discovery once, then stateless invocations.

use std::borrow::Cow;
use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use registry_catalog::{Catalog, Endpoint, build_catalog};
use registry_config::ClientConfig;
use registry_primitives::ResourceKey;
use registry_spec::SpecDocument;
use registry_tools::{
    ResourceDescriptor, ResourceTemplateDescriptor, ToolDescriptor, ToolOutput, ToolProvider,
    ToolSurface, project, resource_templates, resources,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::discovery::fetch_spec;
use crate::dispatcher::Dispatcher;
use crate::error::{ClientError, ClientResult};
use crate::url_builder::{UrlBuilder, arguments_from_json};

const NOT_JSON_NOTE: &str = "Response was not valid JSON, wrapped as string";

/// Client bound to one registry.
///
/// [`RegistryClient::discover`] must succeed before anything can be invoked.
/// Afterwards the catalog and tool surface are read-only, so a client behind
/// an `Arc` serves concurrent invocations without locking.
#[derive(Debug)]
pub struct RegistryClient {
    config: ClientConfig,
    dispatcher: Dispatcher,
    state: Option<Discovered>,
    empty: Catalog,
}

#[derive(Debug)]
struct Discovered {
    spec: SpecDocument,
    catalog: Catalog,
    surface: ToolSurface,
    urls: UrlBuilder,
}

impl RegistryClient {
    /// Creates an undiscovered client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when the configuration fails
    /// validation.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let dispatcher = Dispatcher::new(&config);
        Ok(Self {
            config,
            dispatcher,
            state: None,
            empty: Catalog::new(),
        })
    }

    /// Fetches the API description, builds the catalog and projects tools.
    ///
    /// On failure the client stays (or becomes) undiscovered with an empty
    /// catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Discovery`], [`ClientError::Catalog`] or
    /// [`ClientError::ToolSurface`]; all of them are terminal for startup.
    pub async fn discover(&mut self) -> ClientResult<()> {
        self.state = None;
        let spec = fetch_spec(&self.dispatcher, self.config.base_url()).await?;
        let catalog = build_catalog(Some(&spec), self.config.allowed_tags())?;
        let surface = project(&catalog)?;
        let urls = UrlBuilder::new(self.config.base_url(), catalog.base_path());
        info!(
            registry = self.config.base_url(),
            endpoints = catalog.len(),
            tools = surface.len(),
            "registry discovered"
        );
        self.state = Some(Discovered {
            spec,
            catalog,
            surface,
            urls,
        });
        Ok(())
    }

    /// Whether discovery has completed successfully.
    #[must_use]
    pub fn is_discovered(&self) -> bool {
        self.state.is_some()
    }

    /// Client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Discovered API description.
    #[must_use]
    pub fn spec(&self) -> Option<&SpecDocument> {
        self.state.as_ref().map(|state| &state.spec)
    }

    /// Endpoint catalog; empty until discovery succeeds.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        self.state.as_ref().map_or(&self.empty, |state| &state.catalog)
    }

    /// Generated tool descriptors; empty until discovery succeeds.
    #[must_use]
    pub fn tool_surface(&self) -> &[ToolDescriptor] {
        self.state
            .as_ref()
            .map(|state| state.surface.descriptors())
            .unwrap_or_default()
    }

    /// Invokes the endpoint named by `key` with named arguments.
    ///
    /// `key` may be a catalogued key or a concrete instantiation of one. Path
    /// values matched from a concrete key take precedence over `arguments`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotDiscovered`] before discovery,
    /// [`ClientError::UnknownEndpoint`] for an unmatched key,
    /// [`ClientError::Url`] when the URL cannot be built and
    /// [`ClientError::Call`] when the call fails.
    pub async fn invoke(
        &self,
        key: &ResourceKey,
        arguments: &BTreeMap<String, String>,
    ) -> ClientResult<Bytes> {
        let state = self.state()?;
        let endpoint = state
            .catalog
            .resolve(key)
            .ok_or_else(|| ClientError::UnknownEndpoint { key: key.clone() })?;
        let url = if endpoint.key() == key {
            state.urls.for_arguments(endpoint, arguments)?
        } else {
            let mut merged = arguments.clone();
            merged.insert(registry_tools::RESERVED_ARGUMENT.to_owned(), key.to_string());
            state.urls.for_arguments(endpoint, &merged)?
        };
        Ok(self.dispatcher.call(endpoint, &url).await?)
    }

    /// Invokes a tool by name with already flattened arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnknownTool`] for an unknown name, otherwise as
    /// [`RegistryClient::invoke`].
    pub async fn invoke_tool(
        &self,
        name: &str,
        arguments: &BTreeMap<String, String>,
    ) -> ClientResult<Bytes> {
        let state = self.state()?;
        let endpoint = state.tool_endpoint(name)?;
        let url = state.urls.for_arguments(endpoint, arguments)?;
        Ok(self.dispatcher.call(endpoint, &url).await?)
    }

    /// Reads a resource by concrete key.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidKey`] for a malformed key, otherwise as
    /// [`RegistryClient::invoke`].
    pub async fn read(&self, uri: &str) -> ClientResult<Bytes> {
        let key = ResourceKey::parse(uri)?;
        let state = self.state()?;
        let endpoint = state
            .catalog
            .resolve(&key)
            .ok_or_else(|| ClientError::UnknownEndpoint { key: key.clone() })?;
        let url = state.urls.for_resource_key(endpoint, &key)?;
        Ok(self.dispatcher.call(endpoint, &url).await?)
    }

    fn state(&self) -> ClientResult<&Discovered> {
        self.state.as_ref().ok_or(ClientError::NotDiscovered)
    }

    fn endpoint_for_tool(&self, name: &str) -> Option<&Endpoint> {
        self.state
            .as_ref()
            .and_then(|state| state.tool_endpoint(name).ok())
    }
}

impl Discovered {
    fn tool_endpoint(&self, name: &str) -> ClientResult<&Endpoint> {
        let descriptor = self
            .surface
            .get(name)
            .ok_or_else(|| ClientError::UnknownTool {
                name: name.to_owned(),
            })?;
        self.catalog
            .get(descriptor.key())
            .ok_or_else(|| ClientError::UnknownEndpoint {
                key: descriptor.key().clone(),
            })
    }
}

#[async_trait]
impl ToolProvider for RegistryClient {
    fn tools(&self) -> &[ToolDescriptor] {
        self.tool_surface()
    }

    fn resources(&self) -> Vec<ResourceDescriptor> {
        resources(self.catalog())
    }

    fn resource_templates(&self) -> Vec<ResourceTemplateDescriptor> {
        resource_templates(self.catalog())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> ToolOutput {
        let endpoint = self.endpoint_for_tool(name);
        let uri = endpoint.map(|endpoint| endpoint.key().to_string());
        let result = match arguments_from_json(&arguments) {
            Ok(arguments) => self.invoke_tool(name, &arguments).await,
            Err(err) => Err(err.into()),
        };
        render(uri.as_deref(), endpoint, result)
    }

    async fn read_resource(&self, uri: &str) -> ToolOutput {
        let endpoint = ResourceKey::parse(uri)
            .ok()
            .and_then(|key| self.state.as_ref()?.catalog.resolve(&key));
        let result = self.read(uri).await;
        render(Some(uri), endpoint, result)
    }
}

#[derive(Serialize)]
struct WrappedResponse<'a> {
    uri: &'a str,
    response: Cow<'a, str>,
    note: &'static str,
}

#[derive(Serialize)]
struct ErrorPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    uri: Option<&'a str>,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a str>,
}

fn render(uri: Option<&str>, endpoint: Option<&Endpoint>, result: ClientResult<Bytes>) -> ToolOutput {
    match result {
        Ok(body) => success_output(uri.unwrap_or_default(), &body),
        Err(err) => {
            warn!(uri = uri.unwrap_or_default(), error = %err, "invocation failed");
            let payload = ErrorPayload {
                uri,
                error: err.to_string(),
                status: err.status(),
                method: endpoint.map(|endpoint| endpoint.method().as_str()),
                path: endpoint.map(Endpoint::path),
            };
            ToolOutput::failure(to_json_text(&payload))
        }
    }
}

fn success_output(uri: &str, body: &[u8]) -> ToolOutput {
    if serde_json::from_slice::<Value>(body).is_ok() {
        return ToolOutput::success(String::from_utf8_lossy(body).into_owned());
    }
    let wrapped = WrappedResponse {
        uri,
        response: String::from_utf8_lossy(body),
        note: NOT_JSON_NOTE,
    };
    ToolOutput::success(to_json_text(&wrapped))
}

fn to_json_text<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|err| {
        serde_json::json!({ "error": format!("failed to encode payload: {err}") }).to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> RegistryClient {
        RegistryClient::new(ClientConfig::new("https://quay.io").unwrap()).unwrap()
    }

    #[test]
    fn undiscovered_client_exposes_empty_surface() {
        let client = client();
        assert!(!client.is_discovered());
        assert!(client.catalog().is_empty());
        assert!(client.tool_surface().is_empty());
        assert!(client.spec().is_none());
    }

    #[tokio::test]
    async fn invoking_before_discovery_fails() {
        let client = client();
        let key = ResourceKey::parse("quay://api/v1/user").unwrap();
        let err = client
            .invoke(&key, &BTreeMap::new())
            .await
            .expect_err("not discovered");
        assert!(matches!(err, ClientError::NotDiscovered));

        let output = client.call_tool("getUser", Value::Null).await;
        assert!(output.is_error());
        let payload = output.json().unwrap();
        assert_eq!(payload["error"], "registry has not been discovered");
        assert!(payload.get("uri").is_none());
    }

    #[tokio::test]
    async fn malformed_resource_uri_is_reported() {
        let output = client().read_resource("https://quay.io/api/v1/user").await;
        assert!(output.is_error());
        assert_eq!(output.json().unwrap()["uri"], "https://quay.io/api/v1/user");
    }

    #[test]
    fn non_json_bodies_are_wrapped() {
        let output = success_output("quay://api/v1/health", b"OK");
        assert!(!output.is_error());
        let payload = output.json().unwrap();
        assert_eq!(payload["response"], "OK");
        assert_eq!(payload["note"], NOT_JSON_NOTE);
        assert_eq!(payload["uri"], "quay://api/v1/health");

        let output = success_output("quay://api/v1/user", br#"{"username":"x"}"#);
        assert_eq!(output.text(), r#"{"username":"x"}"#);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ClientConfig::new("https://quay.io")
            .unwrap()
            .with_timeout(std::time::Duration::ZERO);
        assert!(matches!(
            RegistryClient::new(config),
            Err(ClientError::Config(_))
        ));
    }
}
