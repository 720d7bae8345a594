//! Network request correlation.
//!
//! The correlator folds raw events into [`WatchEvent`]s. Requests are
//! remembered by ID so that responses can recall their method and failures
//! can recall the URL they were loading.
//!
//! # Rules
//!
//! | Event | Effect |
//! |-------|--------|
//! | `requestWillBeSent` | Record unless gated by document-only or type filter; emit `request` or `redirect` |
//! | `responseReceived` | Skip (keeping the record) if status or type is filtered; else emit `response` and forget |
//! | `loadingFailed` | Forget the record; emit `failed` with the recalled URL unless type is filtered |
//! | `frameNavigated` | Emit `navigation` for the top-level frame only |
//! | `consoleAPICalled` | Emit `click`/`message` when the text carries a listener marker |

// ============================================================================
// Imports
// ============================================================================

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde_json::{Value, json};
use tracing::trace;

use crate::discovery::TargetInfo;
use crate::identifiers::{FrameId, NetworkRequestId};
use crate::protocol::{
    Event, FrameNavigated, LoadingFailed, ParsedEvent, RequestWillBeSent, ResponseReceived,
};

use super::log::LogEvent;
use super::timestamp;
use super::watch::{CLICK_MARKER, MESSAGE_MARKER, WatchEvent, WatchKind, WatchOptions};

// ============================================================================
// PendingRequest
// ============================================================================

/// What is remembered about an in-flight request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingRequest {
    /// Request URL.
    pub url: String,
    /// HTTP method.
    pub method: String,
    /// Resource type.
    pub resource_type: Option<String>,
    /// Issuing frame.
    pub frame_id: Option<FrameId>,
}

// ============================================================================
// WatchCorrelator
// ============================================================================

/// Stateful fold from raw events to watch records.
///
/// Unmatched records live as long as the correlator.
#[derive(Debug, Clone, Default)]
pub struct WatchCorrelator {
    /// What to report.
    options: WatchOptions,
    /// Identity stamped on every record.
    target: Option<TargetInfo>,
    /// In-flight requests by ID.
    pending: FxHashMap<NetworkRequestId, PendingRequest>,
}

impl WatchCorrelator {
    /// Creates a correlator.
    #[must_use]
    pub fn new(options: WatchOptions, target: Option<TargetInfo>) -> Self {
        Self {
            options,
            target,
            pending: FxHashMap::default(),
        }
    }

    /// Returns the options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    /// Returns the number of remembered requests.
    #[inline]
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if a request is remembered.
    #[inline]
    #[must_use]
    pub fn is_pending(&self, request_id: &NetworkRequestId) -> bool {
        self.pending.contains_key(request_id)
    }

    /// Returns a remembered request.
    #[inline]
    #[must_use]
    pub fn pending(&self, request_id: &NetworkRequestId) -> Option<&PendingRequest> {
        self.pending.get(request_id)
    }

    /// Folds one raw event, returning at most one watch record.
    pub fn observe(&mut self, event: &Event) -> Option<WatchEvent> {
        let emitted = match event.parse() {
            ParsedEvent::ConsoleApiCalled(params) => self.on_console(&params),
            ParsedEvent::RequestWillBeSent(request) => self.on_request(request),
            ParsedEvent::ResponseReceived(response) => self.on_response(response),
            ParsedEvent::LoadingFailed(failure) => self.on_failure(failure),
            ParsedEvent::FrameNavigated(frame) => self.on_navigation(frame),
            _ => None,
        }?;

        if self.options.errors_only && !emitted.is_error() {
            return None;
        }

        Some(emitted)
    }

    fn on_console(&self, params: &Value) -> Option<WatchEvent> {
        if !self.options.wants_console() {
            return None;
        }

        let log = LogEvent::from_console_api_called(params, self.target.as_ref());

        let kind = if self.options.clicks && log.text.starts_with(CLICK_MARKER) {
            WatchKind::Click
        } else if self.options.messages && log.text.starts_with(MESSAGE_MARKER) {
            WatchKind::Message
        } else {
            return None;
        };

        let mut event = self.record(kind, log.ts, String::new());
        event.element = Some(json!({ "raw": log.text }));
        Some(event)
    }

    fn on_request(&mut self, request: RequestWillBeSent) -> Option<WatchEvent> {
        if !self.options.accepts_type(request.resource_type.as_deref()) {
            return None;
        }

        self.pending.insert(
            request.request_id.clone(),
            PendingRequest {
                url: request.url.clone(),
                method: request.method.clone(),
                resource_type: request.resource_type.clone(),
                frame_id: request.frame_id.clone(),
            },
        );
        trace!(request_id = %request.request_id, pending = self.pending.len(), "Request tracked");

        // Document-only limits emission; failures still recall sub-resources
        let is_document = request.resource_type.as_deref() == Some("Document");
        if !self.options.requests || (self.options.document_only && !is_document) {
            return None;
        }

        let kind = if request.redirect.is_some() {
            WatchKind::Redirect
        } else {
            WatchKind::Request
        };

        let mut event = self.record(kind, timestamp::from_seconds(request.wall_time), request.url);
        event.method = Some(request.method);
        event.resource_type = request.resource_type;
        event.request_id = Some(request.request_id);
        event.frame_id = request.frame_id;

        if let Some(redirect) = request.redirect {
            event.status = redirect.status;
            event.redirect_url = Some(event.url.clone());
        }

        Some(event)
    }

    fn on_response(&mut self, response: ResponseReceived) -> Option<WatchEvent> {
        if !self.options.accepts_status(response.status) {
            return None;
        }
        if !self.options.accepts_type(response.resource_type.as_deref()) {
            return None;
        }

        let recalled = self.pending.remove(&response.request_id);

        if !self.options.responses {
            return None;
        }

        let recalled = recalled.unwrap_or_default();
        let url = if response.url.is_empty() {
            recalled.url
        } else {
            response.url
        };

        let mut event = self.record(WatchKind::Response, Utc::now(), url);
        event.method = Some(recalled.method).filter(|m| !m.is_empty());
        event.status = Some(response.status);
        event.resource_type = response.resource_type;
        event.mime_type = response.mime_type;
        event.request_id = Some(response.request_id);
        event.frame_id = response.frame_id.or(recalled.frame_id);
        Some(event)
    }

    fn on_failure(&mut self, failure: LoadingFailed) -> Option<WatchEvent> {
        let recalled = self
            .pending
            .remove(&failure.request_id)
            .unwrap_or_default();

        let resource_type = failure.resource_type.or(recalled.resource_type);
        if !self.options.accepts_type(resource_type.as_deref()) {
            return None;
        }

        if !self.options.failures {
            return None;
        }

        let mut event = self.record(WatchKind::Failed, Utc::now(), recalled.url);
        event.method = Some(recalled.method).filter(|m| !m.is_empty());
        event.resource_type = resource_type;
        event.error_text = failure.error_text;
        event.request_id = Some(failure.request_id);
        event.frame_id = recalled.frame_id;
        Some(event)
    }

    fn on_navigation(&self, frame: FrameNavigated) -> Option<WatchEvent> {
        if !self.options.navigation || !frame.is_main_frame() {
            return None;
        }

        let mut event = self.record(WatchKind::Navigation, Utc::now(), frame.url);
        event.frame_id = Some(frame.frame_id);
        Some(event)
    }

    fn record(&self, kind: WatchKind, ts: DateTime<Utc>, url: String) -> WatchEvent {
        let mut event = WatchEvent::new(kind, ts, url);
        event.target = self.target.clone();
        event
    }
}

// ============================================================================
// Tests
// ============================================================================
