//! Event message types.
//!
//! Events are messages the target sends without being asked. Everything on
//! the channel that is not a reply to a pending command is surfaced as an
//! [`Event`], then parsed into a [`ParsedEvent`] for type-safe handling.
//!
//! # Event Types
//!
//! | Domain | Events |
//! |--------|--------|
//! | `Runtime` | `consoleAPICalled`, `exceptionThrown`, `executionContextCreated` |
//! | `Log` | `entryAdded` |
//! | `Network` | `requestWillBeSent`, `responseReceived`, `loadingFailed` |
//! | `Page` | `frameNavigated` |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::identifiers::{ExecutionContextId, FrameId, NetworkRequestId};

use super::fields;

// ============================================================================
// Event
// ============================================================================

/// An unsolicited message from the target.
///
/// # Format
///
/// ```json
/// { "method": "Domain.eventName", "params": { ... } }
/// ```
///
/// All fields are optional on the wire so that stray messages (for example a
/// reply whose request already timed out) still reach the event feed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Event {
    /// Message ID as sent, present on replies no longer awaited.
    ///
    /// Kept as raw JSON so non-integer IDs still reach the feed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    /// Event name in `Domain.eventName` format.
    #[serde(default)]
    pub method: String,

    /// Event-specific data.
    #[serde(default)]
    pub params: Value,

    /// Flattened session ID, if the target multiplexes sessions.
    #[serde(rename = "sessionId", default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Remaining top-level fields, such as `result` on a stray reply.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Event {
    /// Creates an event from method and params.
    #[inline]
    #[must_use]
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
            ..Self::default()
        }
    }

    /// Returns the domain name from the method.
    #[inline]
    #[must_use]
    pub fn domain(&self) -> &str {
        self.method.split('.').next().unwrap_or_default()
    }

    /// Returns the event name from the method.
    #[inline]
    #[must_use]
    pub fn event_name(&self) -> &str {
        self.method.split('.').nth(1).unwrap_or_default()
    }

    /// Parses the event into a typed variant.
    #[must_use]
    pub fn parse(&self) -> ParsedEvent {
        self.parse_internal()
    }
}

// ============================================================================
// ParsedEvent
// ============================================================================

/// Parsed event types for type-safe handling.
///
/// The three log shapes keep their raw params because the log normalizer
/// walks nested remote objects; network and page events are flattened.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedEvent {
    /// `Runtime.consoleAPICalled`.
    ConsoleApiCalled(Value),

    /// `Runtime.exceptionThrown`.
    ExceptionThrown(Value),

    /// `Log.entryAdded`.
    LogEntryAdded(Value),

    /// `Runtime.executionContextCreated`.
    ExecutionContextCreated(ExecutionContext),

    /// `Network.requestWillBeSent`.
    RequestWillBeSent(RequestWillBeSent),

    /// `Network.responseReceived`.
    ResponseReceived(ResponseReceived),

    /// `Network.loadingFailed`.
    LoadingFailed(LoadingFailed),

    /// `Page.frameNavigated`.
    FrameNavigated(FrameNavigated),

    /// Unknown event type.
    Unknown {
        /// Event method.
        method: String,
        /// Event params.
        params: Value,
    },
}

/// A request about to be sent, possibly replacing a redirected one.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestWillBeSent {
    /// Network request ID (shared across a redirect chain).
    pub request_id: NetworkRequestId,
    /// Request URL.
    pub url: String,
    /// HTTP method.
    pub method: String,
    /// Resource type (`Document`, `XHR`, `Fetch`, ...).
    pub resource_type: Option<String>,
    /// Frame that issued the request.
    pub frame_id: Option<FrameId>,
    /// Wall-clock time in seconds since epoch.
    pub wall_time: Option<f64>,
    /// The response that caused this request, for redirects.
    pub redirect: Option<RedirectResponse>,
}

/// The prior response embedded in a redirect.
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectResponse {
    /// URL that answered with the redirect.
    pub url: String,
    /// Redirect status code.
    pub status: Option<u16>,
}

/// Response headers received.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseReceived {
    /// Network request ID.
    pub request_id: NetworkRequestId,
    /// Response URL.
    pub url: String,
    /// HTTP status code (0 when absent).
    pub status: u16,
    /// MIME type.
    pub mime_type: Option<String>,
    /// Resource type.
    pub resource_type: Option<String>,
    /// Frame that issued the request.
    pub frame_id: Option<FrameId>,
}

/// Request failed to load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadingFailed {
    /// Network request ID.
    pub request_id: NetworkRequestId,
    /// Resource type.
    pub resource_type: Option<String>,
    /// Failure description (`net::ERR_...`).
    pub error_text: Option<String>,
    /// True if the load was canceled.
    pub canceled: bool,
}

/// A frame committed a navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameNavigated {
    /// Frame ID.
    pub frame_id: FrameId,
    /// Parent frame ID (None for the main frame).
    pub parent_id: Option<FrameId>,
    /// New frame URL.
    pub url: String,
    /// Frame name attribute.
    pub name: Option<String>,
}

impl FrameNavigated {
    /// Returns `true` for the top-level frame.
    #[inline]
    #[must_use]
    pub fn is_main_frame(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A JavaScript execution context was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Context ID.
    pub id: ExecutionContextId,
    /// Security origin.
    pub origin: String,
    /// Human readable name.
    pub name: String,
    /// Frame owning the context, if any.
    pub frame_id: Option<FrameId>,
    /// True for the frame's main world.
    pub is_default: bool,
}

// ============================================================================
// Event Parsing Implementation
// ============================================================================

impl Event {
    /// Internal parsing implementation.
    fn parse_internal(&self) -> ParsedEvent {
        let params = &self.params;

        match self.method.as_str() {
            "Runtime.consoleAPICalled" => ParsedEvent::ConsoleApiCalled(params.clone()),

            "Runtime.exceptionThrown" => ParsedEvent::ExceptionThrown(params.clone()),

            "Log.entryAdded" => ParsedEvent::LogEntryAdded(params.clone()),

            "Runtime.executionContextCreated" => {
                let context = fields::object(params, "context");
                let aux = fields::object(context, "auxData");

                ParsedEvent::ExecutionContextCreated(ExecutionContext {
                    id: ExecutionContextId::new(fields::opt_i64(context, "id").unwrap_or_default()),
                    origin: fields::string(context, "origin"),
                    name: fields::string(context, "name"),
                    frame_id: fields::non_empty_string(aux, "frameId").map(FrameId::from),
                    is_default: fields::bool(aux, "isDefault"),
                })
            }

            "Network.requestWillBeSent" => {
                let request = fields::object(params, "request");
                let redirect = match params.get("redirectResponse") {
                    Some(response @ Value::Object(_)) => Some(RedirectResponse {
                        url: fields::string(response, "url"),
                        status: fields::opt_status(response, "status"),
                    }),
                    _ => None,
                };

                ParsedEvent::RequestWillBeSent(RequestWillBeSent {
                    request_id: fields::string(params, "requestId").into(),
                    url: fields::string(request, "url"),
                    method: fields::string_or(request, "method", "GET"),
                    resource_type: fields::non_empty_string(params, "type"),
                    frame_id: fields::non_empty_string(params, "frameId").map(FrameId::from),
                    wall_time: fields::opt_f64(params, "wallTime"),
                    redirect,
                })
            }

            "Network.responseReceived" => {
                let response = fields::object(params, "response");

                ParsedEvent::ResponseReceived(ResponseReceived {
                    request_id: fields::string(params, "requestId").into(),
                    url: fields::string(response, "url"),
                    status: fields::opt_status(response, "status").unwrap_or_default(),
                    mime_type: fields::non_empty_string(response, "mimeType"),
                    resource_type: fields::non_empty_string(params, "type"),
                    frame_id: fields::non_empty_string(params, "frameId").map(FrameId::from),
                })
            }

            "Network.loadingFailed" => ParsedEvent::LoadingFailed(LoadingFailed {
                request_id: fields::string(params, "requestId").into(),
                resource_type: fields::non_empty_string(params, "type"),
                error_text: fields::non_empty_string(params, "errorText"),
                canceled: fields::bool(params, "canceled"),
            }),

            "Page.frameNavigated" => {
                let frame = fields::object(params, "frame");

                ParsedEvent::FrameNavigated(FrameNavigated {
                    frame_id: fields::string(frame, "id").into(),
                    parent_id: fields::non_empty_string(frame, "parentId").map(FrameId::from),
                    url: fields::string(frame, "url"),
                    name: fields::non_empty_string(frame, "name"),
                })
            }

            _ => ParsedEvent::Unknown {
                method: self.method.clone(),
                params: params.clone(),
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
