//! Outbound GET requests against the registry.

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use hyper::body::HttpBody;
use hyper::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use hyper::{Body, Method, Request, Uri};
use registry_catalog::Endpoint;
use registry_config::ClientConfig;
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

use crate::error::{CallError, CallResult};
use crate::http_client::{HyperClient, build_https_client};

const JSON_CONTENT: &str = "application/json";

/// Largest response body accepted unless overridden.
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Issues one request per call with the configured headers and timeout.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct Dispatcher {
    client: HyperClient,
    token: Option<String>,
    user_agent: String,
    timeout: Duration,
    max_body_bytes: usize,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("authenticated", &self.token.is_some())
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates a dispatcher from the client configuration.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: build_https_client(config.timeout()),
            token: config.token().map(ToOwned::to_owned),
            user_agent: config.user_agent().to_owned(),
            timeout: config.timeout(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Caps the size of response bodies read by this dispatcher.
    #[must_use]
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Calls a catalogued endpoint at an already assembled URL.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::NetworkFailure`] when no response arrives within
    /// the timeout and [`CallError::UpstreamStatus`] for a non-2xx answer.
    pub async fn call(&self, endpoint: &Endpoint, url: &Url) -> CallResult<Bytes> {
        debug!(method = %endpoint.method(), path = endpoint.path(), url = %url, "dispatching registry call");
        let result = self.get(url).await;
        if let Err(err) = &result {
            warn!(path = endpoint.path(), url = %url, error = %err, "registry call failed");
        }
        result
    }

    /// Sends a single GET and returns the body of a 2xx response unmodified.
    ///
    /// The configured timeout bounds the whole exchange, body included.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::call`]. A body larger than the configured limit is a
    /// [`CallError::NetworkFailure`].
    pub async fn get(&self, url: &Url) -> CallResult<Bytes> {
        let request = self.request(url)?;
        timeout(self.timeout, self.exchange(request))
            .await
            .map_err(|_| {
                CallError::network(format!("request timed out after {:?}", self.timeout))
            })?
    }

    fn request(&self, url: &Url) -> CallResult<Request<Body>> {
        let uri: Uri = url
            .as_str()
            .parse()
            .map_err(|err| CallError::network(format!("invalid request uri: {err}")))?;

        let mut builder = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(ACCEPT, JSON_CONTENT)
            .header(USER_AGENT, self.user_agent.as_str());
        if let Some(token) = &self.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        builder
            .body(Body::empty())
            .map_err(|err| CallError::network(format!("failed to build request: {err}")))
    }

    async fn exchange(&self, request: Request<Body>) -> CallResult<Bytes> {
        let response = self
            .client
            .request(request)
            .await
            .map_err(|err| CallError::network(format!("request failed: {err}")))?;

        let status = response.status();
        let body = read_limited(response.into_body(), self.max_body_bytes).await?;

        if !status.is_success() {
            return Err(CallError::UpstreamStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(body)
    }
}

async fn read_limited(mut body: Body, limit: usize) -> CallResult<Bytes> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = body.data().await {
        let chunk =
            chunk.map_err(|err| CallError::network(format!("failed to read response: {err}")))?;
        if buffer.len() + chunk.len() > limit {
            return Err(CallError::network(format!("response body exceeds {limit} bytes")));
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer.freeze())
}
