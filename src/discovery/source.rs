//! Target sources and the debugger HTTP surface.
//!
//! [`TargetSource`] is the seam between the directory and wherever targets
//! come from. [`HttpTargetSource`] reads `/json/list` from a running browser;
//! a plain `Vec<Target>` serves fixed listings.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DebuggerEndpoint;
use crate::error::{Error, Result};

use super::target::Target;

// ============================================================================
// TargetSource
// ============================================================================

/// Anything that can produce a target listing.
#[async_trait]
pub trait TargetSource: Send + Sync {
    /// Fetches the current targets.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if the source is unreachable
    /// - [`Error::InvalidResponse`] if the listing is malformed
    async fn fetch_targets(&self) -> Result<Vec<Target>>;
}

#[async_trait]
impl TargetSource for Vec<Target> {
    async fn fetch_targets(&self) -> Result<Vec<Target>> {
        Ok(self.clone())
    }
}

// ============================================================================
// BrowserVersion
// ============================================================================

/// Browser build information from `/json/version`.
///
/// The endpoint uses PascalCase keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserVersion {
    /// Product and version, e.g. `Chrome/120.0.6099.71`.
    #[serde(rename = "Browser", default)]
    pub browser: String,

    /// Protocol version, e.g. `1.3`.
    #[serde(rename = "Protocol-Version", default)]
    pub protocol_version: String,

    /// User agent string.
    #[serde(rename = "User-Agent", default)]
    pub user_agent: String,

    /// Browser-level WebSocket URL.
    #[serde(
        rename = "webSocketDebuggerUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub web_socket_debugger_url: Option<String>,
}

// ============================================================================
// HttpTargetSource
// ============================================================================

/// Reads targets from a browser's remote debugging HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpTargetSource {
    /// Where the browser listens.
    endpoint: DebuggerEndpoint,
    /// HTTP client with the endpoint timeout applied.
    client: reqwest::Client,
}

impl HttpTargetSource {
    /// Creates a source for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    pub fn new(endpoint: DebuggerEndpoint) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(endpoint.http_timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { endpoint, client })
    }

    /// Returns the endpoint.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &DebuggerEndpoint {
        &self.endpoint
    }

    /// Fetches `/json/version`.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if the endpoint is unreachable or answers non-2xx
    /// - [`Error::InvalidResponse`] if the body is not a version record
    pub async fn version(&self) -> Result<BrowserVersion> {
        let body = self.get_text(&self.endpoint.version_url()).await?;

        serde_json::from_str(&body)
            .map_err(|e| Error::invalid_response(format!("Malformed version info: {e}")))
    }

    /// GETs a URL and returns the body of a 2xx reply.
    async fn get_text(&self, url: &str) -> Result<String> {
        debug!(url, "Fetching");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::connection(format!(
                "CDP endpoint returned error: HTTP {status} for {url}"
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::connection(format!("Failed to read response from {url}: {e}")))
    }

    /// Maps a transport failure to a connection error.
    fn request_error(&self, err: &reqwest::Error) -> Error {
        let base = self.endpoint.base_url();

        if err.is_timeout() {
            Error::connection(format!("Timed out reaching Chrome at {base}"))
        } else {
            Error::connection(format!(
                "Cannot connect to Chrome at {base}. Is Chrome running with --remote-debugging-port?"
            ))
        }
    }
}

#[async_trait]
impl TargetSource for HttpTargetSource {
    async fn fetch_targets(&self) -> Result<Vec<Target>> {
        let body = self.get_text(&self.endpoint.list_url()).await?;
        parse_target_list(&body)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Parses a `/json/list` body.
///
/// # Errors
///
/// Returns [`Error::InvalidResponse`] unless the body is an array of target
/// records.
pub fn parse_target_list(body: &str) -> Result<Vec<Target>> {
    serde_json::from_str(body)
        .map_err(|e| Error::invalid_response(format!("Malformed target list: {e}")))
}

/// Returns `true` if the endpoint answers its target list.
///
/// Only connection failures count as unreachable; a malformed listing still
/// proves something is listening.
pub async fn check_connection(endpoint: &DebuggerEndpoint) -> bool {
    let source = match HttpTargetSource::new(endpoint.clone()) {
        Ok(source) => source,
        Err(e) => {
            debug!(error = %e, "Cannot build target source");
            return false;
        }
    };

    match source.fetch_targets().await {
        Ok(_) => true,
        Err(e) => {
            debug!(error = %e, "Connection check failed");
            !e.is_connection_error()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
