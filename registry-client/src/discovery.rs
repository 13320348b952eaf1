//! One-shot fetch of the registry's API description.

use registry_spec::SpecDocument;
use tracing::{info, warn};
use url::Url;

use crate::dispatcher::Dispatcher;
use crate::error::{CallError, DiscoveryError, DiscoveryResult};

/// Well-known location of the discovery document.
pub const PRIMARY_DISCOVERY_PATH: &str = "/api/v1/discovery";

/// Location retried once when the primary answers `404`.
pub const FALLBACK_DISCOVERY_PATH: &str = "/discovery";

const NOT_FOUND: u16 = 404;

/// Fetches and parses the discovery document.
///
/// The primary path is tried first; a `404` triggers exactly one retry on the
/// fallback path. Every other failure is terminal.
///
/// # Errors
///
/// Returns a [`DiscoveryError`] for transport failures, non-success statuses,
/// malformed bodies or an unusable base URL.
pub async fn fetch_spec(dispatcher: &Dispatcher, base_url: &str) -> DiscoveryResult<SpecDocument> {
    let base = base_url.trim_end_matches('/');
    let primary = discovery_url(base, PRIMARY_DISCOVERY_PATH)?;

    match fetch_document(dispatcher, &primary).await {
        Err(DiscoveryError::Status {
            status: NOT_FOUND, ..
        }) => {
            let fallback = discovery_url(base, FALLBACK_DISCOVERY_PATH)?;
            warn!(primary = %primary, fallback = %fallback, "discovery not found, retrying fallback path");
            fetch_document(dispatcher, &fallback).await
        }
        other => other,
    }
}

async fn fetch_document(dispatcher: &Dispatcher, url: &Url) -> DiscoveryResult<SpecDocument> {
    let body = dispatcher.get(url).await.map_err(|err| match err {
        CallError::UpstreamStatus { status, .. } => DiscoveryError::Status {
            url: url.to_string(),
            status,
        },
        CallError::NetworkFailure { reason } => DiscoveryError::Transport {
            url: url.to_string(),
            reason,
        },
    })?;

    let spec = SpecDocument::from_slice(&body).map_err(|source| DiscoveryError::Malformed {
        url: url.to_string(),
        source,
    })?;
    info!(url = %url, paths = spec.path_count(), "loaded registry API description");
    Ok(spec)
}

fn discovery_url(base: &str, path: &str) -> DiscoveryResult<Url> {
    let raw = format!("{base}{path}");
    Url::parse(&raw).map_err(|err| DiscoveryError::InvalidUrl {
        url: raw,
        reason: err.to_string(),
    })
}
