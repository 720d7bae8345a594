//! Watch records: clicks, messages, navigation and network lifecycle.

// ============================================================================
// Imports
// ============================================================================

use chrono::{DateTime, Utc};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::discovery::TargetInfo;
use crate::error::Result;
use crate::identifiers::{FrameId, NetworkRequestId};

use super::timestamp;

// ============================================================================
// Constants
// ============================================================================

/// Console prefix written by the injected click listener.
pub const CLICK_MARKER: &str = "[DEVLOG_CLICK]";

/// Console prefix written by the injected `postMessage` listener.
pub const MESSAGE_MARKER: &str = "[DEVLOG_MESSAGE]";

// ============================================================================
// WatchKind
// ============================================================================

/// What a watch record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchKind {
    /// A DOM click.
    Click,
    /// A top-level navigation.
    Navigation,
    /// A request was sent.
    Request,
    /// A request was redirected.
    Redirect,
    /// A `postMessage` was received.
    Message,
    /// Response headers arrived.
    Response,
    /// A request failed to load.
    Failed,
}

impl WatchKind {
    /// Returns the uppercase label.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Click => "CLICK",
            Self::Navigation => "NAVIGATION",
            Self::Request => "REQUEST",
            Self::Redirect => "REDIRECT",
            Self::Message => "MESSAGE",
            Self::Response => "RESPONSE",
            Self::Failed => "FAILED",
        }
    }
}

// ============================================================================
// WatchEvent
// ============================================================================

/// A normalized watch record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchEvent {
    /// When it happened.
    pub ts: DateTime<Utc>,

    /// What happened.
    pub kind: WatchKind,

    /// URL involved (empty for clicks and messages).
    pub url: String,

    /// HTTP method.
    #[serde(default)]
    pub method: Option<String>,

    /// HTTP status (responses and redirects).
    #[serde(default)]
    pub status: Option<u16>,

    /// Resource type (`Document`, `XHR`, `Fetch`, ...).
    #[serde(default)]
    pub resource_type: Option<String>,

    /// Redirect destination.
    #[serde(default)]
    pub redirect_url: Option<String>,

    /// Raw listener output for clicks and messages, as `{"raw": text}`.
    #[serde(default)]
    pub element: Option<Value>,

    /// Target that produced the record.
    #[serde(default)]
    pub target: Option<TargetInfo>,

    /// Network request ID.
    #[serde(default)]
    pub request_id: Option<NetworkRequestId>,

    /// Failure description.
    #[serde(default)]
    pub error_text: Option<String>,

    /// Response MIME type.
    #[serde(default)]
    pub mime_type: Option<String>,

    /// Frame that issued the request or navigated.
    #[serde(default)]
    pub frame_id: Option<FrameId>,
}

impl WatchEvent {
    /// Creates a record with every optional field empty.
    #[must_use]
    pub fn new(kind: WatchKind, ts: DateTime<Utc>, url: impl Into<String>) -> Self {
        Self {
            ts,
            kind,
            url: url.into(),
            method: None,
            status: None,
            resource_type: None,
            redirect_url: None,
            element: None,
            target: None,
            request_id: None,
            error_text: None,
            mime_type: None,
            frame_id: None,
        }
    }

    /// Returns `true` for failures and responses with status 400 or above.
    #[must_use]
    pub fn is_error(&self) -> bool {
        match self.kind {
            WatchKind::Failed => true,
            WatchKind::Response => self.status.is_some_and(|s| s >= 400),
            _ => false,
        }
    }

    /// Returns the raw listener text for clicks and messages.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        self.element.as_ref()?.get("raw")?.as_str()
    }

    /// Serializes to one line of JSON. Absent optionals are `null`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
    pub fn to_ndjson(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Renders `HH:MM:SS.mmm KIND details`.
    #[must_use]
    pub fn to_pretty(&self) -> String {
        let resource = self
            .resource_type
            .as_deref()
            .map(|t| format!(" [{t}]"))
            .unwrap_or_default();

        let details = match self.kind {
            WatchKind::Click => strip_marker(self.raw(), CLICK_MARKER),
            WatchKind::Message => strip_marker(self.raw(), MESSAGE_MARKER),
            WatchKind::Redirect => {
                let status = self.status.map_or_else(|| "-".to_string(), |s| s.to_string());
                format!("{status} → {}", self.url)
            }
            WatchKind::Navigation => self.url.clone(),
            WatchKind::Response => {
                let status = self.status.map_or_else(|| "-".to_string(), |s| s.to_string());
                format!("{status} {}{resource}", self.url)
            }
            WatchKind::Failed => {
                let error = self.error_text.as_deref().unwrap_or("failed");
                format!("{error} {}{resource}", self.url)
            }
            WatchKind::Request => {
                let method = self.method.as_deref().unwrap_or("GET");
                format!("{method} {}{resource}", self.url)
            }
        };

        format!(
            "{} {:<10} {details}",
            timestamp::clock(&self.ts),
            self.kind.label()
        )
    }
}

fn strip_marker(raw: Option<&str>, marker: &str) -> String {
    let raw = raw.unwrap_or_default();
    raw.strip_prefix(marker)
        .map_or(raw, |rest| rest.strip_prefix(' ').unwrap_or(rest))
        .to_string()
}

// ============================================================================
// WatchOptions
// ============================================================================

/// What a watch stream reports.
///
/// # Example
///
/// ```ignore
/// use devlog_cdp::WatchOptions;
///
/// // Only failing XHR/fetch traffic
/// let options = WatchOptions::network()
///     .with_resource_types(["XHR", "Fetch"])
///     .with_errors_only();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOptions {
    /// Report clicks from the injected listener.
    pub clicks: bool,

    /// Report `postMessage` traffic from the injected listener.
    pub messages: bool,

    /// Report top-level navigations.
    pub navigation: bool,

    /// Report requests and redirects.
    pub requests: bool,

    /// Report responses.
    pub responses: bool,

    /// Report failed loads.
    pub failures: bool,

    /// Only track `Document` requests.
    pub document_only: bool,

    /// Drop everything except failures and responses with status >= 400.
    pub errors_only: bool,

    /// Only track these resource types.
    pub resource_types: Option<FxHashSet<String>>,

    /// Only report responses with these status codes.
    pub status_filter: Option<FxHashSet<u16>>,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self::watch()
    }
}

impl WatchOptions {
    /// Creates options that report nothing.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self {
            clicks: false,
            messages: false,
            navigation: false,
            requests: false,
            responses: false,
            failures: false,
            document_only: false,
            errors_only: false,
            resource_types: None,
            status_filter: None,
        }
    }

    /// Interaction preset: clicks, messages, navigation and page loads.
    #[must_use]
    pub fn watch() -> Self {
        Self {
            clicks: true,
            messages: true,
            navigation: true,
            requests: true,
            document_only: true,
            ..Self::none()
        }
    }

    /// Network preset: requests, responses and failures of every type.
    #[must_use]
    pub fn network() -> Self {
        Self {
            requests: true,
            responses: true,
            failures: true,
            ..Self::none()
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl WatchOptions {
    /// Sets click reporting.
    #[inline]
    #[must_use]
    pub fn with_clicks(mut self, enabled: bool) -> Self {
        self.clicks = enabled;
        self
    }

    /// Sets message reporting.
    #[inline]
    #[must_use]
    pub fn with_messages(mut self, enabled: bool) -> Self {
        self.messages = enabled;
        self
    }

    /// Sets navigation reporting.
    #[inline]
    #[must_use]
    pub fn with_navigation(mut self, enabled: bool) -> Self {
        self.navigation = enabled;
        self
    }

    /// Sets request reporting.
    #[inline]
    #[must_use]
    pub fn with_requests(mut self, enabled: bool) -> Self {
        self.requests = enabled;
        self
    }

    /// Sets response reporting.
    #[inline]
    #[must_use]
    pub fn with_responses(mut self, enabled: bool) -> Self {
        self.responses = enabled;
        self
    }

    /// Sets failure reporting.
    #[inline]
    #[must_use]
    pub fn with_failures(mut self, enabled: bool) -> Self {
        self.failures = enabled;
        self
    }

    /// Sets document-only tracking.
    #[inline]
    #[must_use]
    pub fn with_document_only(mut self, enabled: bool) -> Self {
        self.document_only = enabled;
        self
    }

    /// Keeps only failures and error responses.
    #[inline]
    #[must_use]
    pub fn with_errors_only(mut self) -> Self {
        self.errors_only = true;
        self
    }

    /// Restricts tracking to the given resource types.
    #[must_use]
    pub fn with_resource_types(mut self, types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.resource_types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    /// Restricts responses to the given status codes.
    #[must_use]
    pub fn with_status_filter(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.status_filter = Some(statuses.into_iter().collect());
        self
    }
}

// ============================================================================
// Queries
// ============================================================================

impl WatchOptions {
    /// Returns `true` if any console-derived kind is reported.
    #[inline]
    #[must_use]
    pub fn wants_console(&self) -> bool {
        self.clicks || self.messages
    }

    /// Returns `true` if any network kind is reported.
    #[inline]
    #[must_use]
    pub fn wants_network(&self) -> bool {
        self.requests || self.responses || self.failures
    }

    /// Returns the CDP domains the selected kinds depend on.
    #[must_use]
    pub fn required_domains(&self) -> Vec<&'static str> {
        let mut domains = Vec::with_capacity(3);

        if self.wants_console() {
            domains.push("Runtime");
        }
        if self.wants_network() {
            domains.push("Network");
        }
        if self.navigation {
            domains.push("Page");
        }

        domains
    }

    /// Returns `true` if a resource type passes the type filter.
    #[must_use]
    pub fn accepts_type(&self, resource_type: Option<&str>) -> bool {
        self.resource_types
            .as_ref()
            .is_none_or(|types| types.contains(resource_type.unwrap_or_default()))
    }

    /// Returns `true` if a status passes the status filter.
    #[must_use]
    pub fn accepts_status(&self, status: u16) -> bool {
        self.status_filter
            .as_ref()
            .is_none_or(|statuses| statuses.contains(&status))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at_noon() -> DateTime<Utc> {
        timestamp::from_millis(Some(1_702_828_800_123.0))
    }

    #[test]
    fn test_presets() {
        let watch = WatchOptions::watch();
        assert!(watch.clicks && watch.messages && watch.navigation && watch.requests);
        assert!(watch.document_only);
        assert!(!watch.responses && !watch.failures);
        assert_eq!(watch.required_domains(), ["Runtime", "Network", "Page"]);

        let network = WatchOptions::network();
        assert!(network.requests && network.responses && network.failures);
        assert!(!network.document_only && !network.clicks);
        assert_eq!(network.required_domains(), ["Network"]);

        assert!(WatchOptions::none().required_domains().is_empty());
    }

    #[test]
    fn test_filters() {
        let options = WatchOptions::network()
            .with_resource_types(["XHR", "Fetch"])
            .with_status_filter([404, 500]);

        assert!(options.accepts_type(Some("XHR")));
        assert!(!options.accepts_type(Some("Image")));
        assert!(!options.accepts_type(None));
        assert!(options.accepts_status(404));
        assert!(!options.accepts_status(200));

        let open = WatchOptions::network();
        assert!(open.accepts_type(None));
        assert!(open.accepts_status(200));
    }

    #[test]
    fn test_is_error() {
        let mut response = WatchEvent::new(WatchKind::Response, at_noon(), "http://x/");
        response.status = Some(404);
        assert!(response.is_error());

        response.status = Some(204);
        assert!(!response.is_error());

        assert!(WatchEvent::new(WatchKind::Failed, at_noon(), "").is_error());
        assert!(!WatchEvent::new(WatchKind::Navigation, at_noon(), "").is_error());
    }

    #[test]
    fn test_pretty_per_kind() {
        let mut request = WatchEvent::new(WatchKind::Request, at_noon(), "http://x/api");
        request.method = Some("POST".to_string());
        request.resource_type = Some("Fetch".to_string());
        assert_eq!(
            request.to_pretty(),
            "16:00:00.123 REQUEST    POST http://x/api [Fetch]"
        );

        let mut redirect = WatchEvent::new(WatchKind::Redirect, at_noon(), "https://x/");
        redirect.status = Some(301);
        assert_eq!(redirect.to_pretty(), "16:00:00.123 REDIRECT   301 → https://x/");

        let mut response = WatchEvent::new(WatchKind::Response, at_noon(), "http://x/missing");
        response.status = Some(404);
        assert_eq!(response.to_pretty(), "16:00:00.123 RESPONSE   404 http://x/missing");

        let mut failed = WatchEvent::new(WatchKind::Failed, at_noon(), "http://x/a.js");
        failed.error_text = Some("net::ERR_FAILED".to_string());
        failed.resource_type = Some("Script".to_string());
        assert_eq!(
            failed.to_pretty(),
            "16:00:00.123 FAILED     net::ERR_FAILED http://x/a.js [Script]"
        );

        let navigation = WatchEvent::new(WatchKind::Navigation, at_noon(), "http://x/next");
        assert_eq!(navigation.to_pretty(), "16:00:00.123 NAVIGATION http://x/next");
    }

    #[test]
    fn test_pretty_strips_markers() {
        let mut click = WatchEvent::new(WatchKind::Click, at_noon(), "");
        click.element = Some(json!({ "raw": "[DEVLOG_CLICK] {\"tag\":\"BUTTON\"}" }));
        assert_eq!(click.to_pretty(), "16:00:00.123 CLICK      {\"tag\":\"BUTTON\"}");

        let mut message = WatchEvent::new(WatchKind::Message, at_noon(), "");
        message.element = Some(json!({ "raw": "[DEVLOG_MESSAGE] https://a.test hi" }));
        assert_eq!(message.to_pretty(), "16:00:00.123 MESSAGE    https://a.test hi");
    }

    #[test]
    fn test_ndjson_round_trip() {
        let mut event = WatchEvent::new(WatchKind::Failed, at_noon(), "http://x/a");
        event.request_id = Some(NetworkRequestId::new("1000.7"));
        event.frame_id = Some(FrameId::new("F1"));
        event.error_text = Some("net::ERR_ABORTED".to_string());

        let line = event.to_ndjson().expect("serialize");
        let value: Value = serde_json::from_str(&line).expect("json");
        assert_eq!(value["kind"], "failed");
        assert!(value["status"].is_null());

        let parsed: WatchEvent = serde_json::from_str(&line).expect("deserialize");
        assert_eq!(parsed, event);
    }
}
