//! Unified log records.
//!
//! Three raw shapes feed one schema:
//!
//! | Event | Kind | Level |
//! |-------|------|-------|
//! | `Runtime.consoleAPICalled` | `console` | from the console method |
//! | `Runtime.exceptionThrown` | `exception` | always `error` |
//! | `Log.entryAdded` | `browser_log` | from the entry level |
//!
//! Normalization never fails. Missing or mistyped fields fall back to empty
//! strings, `info`, the current time or `None`.

// ============================================================================
// Imports
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::discovery::TargetInfo;
use crate::error::Result;
use crate::identifiers::ExecutionContextId;
use crate::protocol::fields;
use crate::protocol::{Event, ParsedEvent};

use super::timestamp;

// ============================================================================
// LogLevel
// ============================================================================

/// Log severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Debug output.
    Debug,
    /// Informational output.
    #[default]
    Info,
    /// Warning.
    Warn,
    /// Error.
    Error,
}

impl LogLevel {
    /// Maps a console method (`log`, `warn`, `assert`, ...) to a level.
    #[must_use]
    pub fn from_console_type(console_type: &str) -> Self {
        match console_type {
            "debug" | "trace" => Self::Debug,
            "warn" | "warning" => Self::Warn,
            "error" | "assert" => Self::Error,
            _ => Self::Info,
        }
    }

    /// Maps a browser log entry level to a level.
    #[must_use]
    pub fn from_entry_level(level: &str) -> Self {
        match level {
            "verbose" => Self::Debug,
            "warning" => Self::Warn,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }

    /// Returns the uppercase label.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

// ============================================================================
// LogKind
// ============================================================================

/// Which raw shape a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    /// A `console.*` call.
    Console,
    /// An uncaught exception.
    Exception,
    /// A browser-level entry (network errors, interventions, deprecations).
    BrowserLog,
}

// ============================================================================
// SourceLocation
// ============================================================================

/// Script location a record points at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Script URL.
    pub url: String,
    /// Line number as reported by the browser.
    pub line: u32,
    /// Column number as reported by the browser.
    pub column: u32,
}

impl SourceLocation {
    /// Returns the last path segment of the URL.
    #[must_use]
    pub fn filename(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or_default()
    }
}

// ============================================================================
// ArgValue
// ============================================================================

/// Structured form of one console argument.
///
/// Primitives keep their value; `undefined` and `null` collapse to `Null`;
/// everything else is stored as its description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// `undefined`, `null` or a primitive without a value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(serde_json::Number),
    /// A string, or the description of a non-primitive.
    Text(String),
}

impl ArgValue {
    /// Extracts the structured value of a remote object.
    #[must_use]
    pub fn from_remote_object(arg: &Value) -> Self {
        let kind = arg.get("type").and_then(Value::as_str).unwrap_or_default();
        let subtype = arg.get("subtype").and_then(Value::as_str).unwrap_or_default();

        match kind {
            "string" | "number" | "boolean" | "bigint" => match arg.get("value") {
                Some(Value::String(s)) => Self::Text(s.clone()),
                Some(Value::Number(n)) => Self::Number(n.clone()),
                Some(Value::Bool(b)) => Self::Bool(*b),
                _ => fields::opt_string(arg, "unserializableValue").map_or(Self::Null, Self::Text),
            },
            "undefined" => Self::Null,
            _ if subtype == "null" => Self::Null,
            _ => Self::Text(
                fields::opt_string(arg, "description").unwrap_or_else(|| format!("[{kind}]")),
            ),
        }
    }
}

// ============================================================================
// LogEvent
// ============================================================================

/// A normalized log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    /// When the browser produced the record.
    pub ts: DateTime<Utc>,

    /// Severity.
    pub level: LogLevel,

    /// Raw shape the record came from.
    pub kind: LogKind,

    /// Rendered message text.
    pub text: String,

    /// Structured console arguments.
    #[serde(default)]
    pub args: Vec<ArgValue>,

    /// Source location, if known.
    #[serde(default)]
    pub source: Option<SourceLocation>,

    /// Rendered stack trace.
    #[serde(default)]
    pub stack: Option<String>,

    /// Target that produced the record.
    #[serde(default)]
    pub target: Option<TargetInfo>,

    /// Execution context the record came from.
    #[serde(default)]
    pub execution_context_id: Option<ExecutionContextId>,
}

// ============================================================================
// Constructors
// ============================================================================

impl LogEvent {
    /// Normalizes any of the three log shapes; `None` for other events.
    #[must_use]
    pub fn from_event(event: &Event, target: Option<&TargetInfo>) -> Option<Self> {
        match event.parse() {
            ParsedEvent::ConsoleApiCalled(params) => {
                Some(Self::from_console_api_called(&params, target))
            }
            ParsedEvent::ExceptionThrown(params) => {
                Some(Self::from_exception_thrown(&params, target))
            }
            ParsedEvent::LogEntryAdded(params) => Some(Self::from_log_entry_added(&params, target)),
            _ => None,
        }
    }

    /// Normalizes `Runtime.consoleAPICalled` params.
    #[must_use]
    pub fn from_console_api_called(params: &Value, target: Option<&TargetInfo>) -> Self {
        let args = fields::array(params, "args");
        let frames = call_frames(fields::object(params, "stackTrace"));

        Self {
            ts: timestamp::from_millis(fields::opt_f64(params, "timestamp")),
            level: LogLevel::from_console_type(&fields::string_or(params, "type", "log")),
            kind: LogKind::Console,
            text: render_args(args),
            args: args.iter().map(ArgValue::from_remote_object).collect(),
            source: first_source(frames),
            stack: None,
            target: target.cloned(),
            execution_context_id: fields::opt_i64(params, "executionContextId")
                .map(ExecutionContextId::new),
        }
    }

    /// Normalizes `Runtime.exceptionThrown` params.
    #[must_use]
    pub fn from_exception_thrown(params: &Value, target: Option<&TargetInfo>) -> Self {
        let details = fields::object(params, "exceptionDetails");
        let frames = call_frames(fields::object(details, "stackTrace"));

        Self {
            ts: timestamp::from_millis(fields::opt_f64(params, "timestamp")),
            level: LogLevel::Error,
            kind: LogKind::Exception,
            text: exception_text(details),
            args: Vec::new(),
            source: first_source(frames),
            stack: format_stack(frames),
            target: target.cloned(),
            execution_context_id: fields::opt_i64(details, "executionContextId")
                .map(ExecutionContextId::new),
        }
    }

    /// Normalizes `Log.entryAdded` params.
    #[must_use]
    pub fn from_log_entry_added(params: &Value, target: Option<&TargetInfo>) -> Self {
        let entry = fields::object(params, "entry");
        let url = fields::string(entry, "url");

        let source = (!url.is_empty()).then(|| SourceLocation {
            url,
            line: fields::u32(entry, "lineNumber"),
            column: 0,
        });

        Self {
            ts: timestamp::from_millis(fields::opt_f64(entry, "timestamp")),
            level: LogLevel::from_entry_level(&fields::string_or(entry, "level", "info")),
            kind: LogKind::BrowserLog,
            text: fields::string(entry, "text"),
            args: Vec::new(),
            source,
            stack: format_stack(call_frames(fields::object(entry, "stackTrace"))),
            target: target.cloned(),
            execution_context_id: None,
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

impl LogEvent {
    /// Serializes to one line of JSON. Absent optionals are `null`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
    pub fn to_ndjson(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Renders `HH:MM:SS.mmm LEVEL text` plus the source location.
    ///
    /// Error-level browser logs put the full URL on a second line; everything
    /// else appends ` [filename:line]`.
    #[must_use]
    pub fn to_pretty(&self) -> String {
        let mut line = format!(
            "{} {:<5} {}",
            timestamp::clock(&self.ts),
            self.level.label(),
            self.text
        );

        if let Some(source) = self.source.as_ref().filter(|s| !s.url.is_empty()) {
            if self.kind == LogKind::BrowserLog && self.level == LogLevel::Error {
                line.push_str("\n    └─ ");
                line.push_str(&source.url);
            } else if !source.filename().is_empty() {
                line.push_str(&format!(" [{}:{}]", source.filename(), source.line));
            }
        }

        line
    }

    /// Renders `HH:MM:SS.mmm<TAB>LEVEL<TAB>text` on one line.
    #[must_use]
    pub fn to_tsv(&self) -> String {
        let text = self.text.replace('\t', " ").replace('\n', "\\n");
        format!(
            "{}\t{}\t{}",
            timestamp::clock(&self.ts),
            self.level.label(),
            text
        )
    }

    /// Returns `true` for error-level records.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }
}

// ============================================================================
// Remote Object Rendering
// ============================================================================

/// Joins the text form of each console argument with spaces.
fn render_args(args: &[Value]) -> String {
    args.iter().map(render_arg).collect::<Vec<_>>().join(" ")
}

/// Renders one remote object.
fn render_arg(arg: &Value) -> String {
    let kind = arg.get("type").and_then(Value::as_str).unwrap_or_default();
    let subtype = arg.get("subtype").and_then(Value::as_str).unwrap_or_default();
    let description = fields::opt_string(arg, "description");

    match kind {
        "string" => scalar_text(arg.get("value")),
        "number" => fields::opt_string(arg, "unserializableValue")
            .unwrap_or_else(|| scalar_text(arg.get("value"))),
        "boolean" => scalar_text(arg.get("value")).to_lowercase(),
        "undefined" => "undefined".to_string(),
        _ if subtype == "null" => "null".to_string(),
        "object" => description
            .or_else(|| match arg.get("preview") {
                Some(preview @ Value::Object(_)) => Some(render_preview(preview)),
                _ => None,
            })
            .unwrap_or_else(|| {
                let label = if subtype.is_empty() { "object" } else { subtype };
                format!("[{label}]")
            }),
        "function" => description.unwrap_or_else(|| "[function]".to_string()),
        "symbol" => description.unwrap_or_else(|| "[symbol]".to_string()),
        _ => description.unwrap_or_else(|| scalar_text(arg.get("value"))),
    }
}

/// Renders an object preview as `[a, b]` or `{k: v}`, with `...` when truncated.
fn render_preview(preview: &Value) -> String {
    let overflow = if fields::bool(preview, "overflow") { "..." } else { "" };
    let properties = fields::array(preview, "properties");

    if preview.get("subtype").and_then(Value::as_str) == Some("array") {
        let items: Vec<String> = properties
            .iter()
            .map(|p| fields::string_or(p, "value", "?"))
            .collect();
        return format!("[{}{overflow}]", items.join(", "));
    }

    if preview.get("type").and_then(Value::as_str) == Some("object") {
        let items: Vec<String> = properties
            .iter()
            .map(|p| {
                format!(
                    "{}: {}",
                    fields::string_or(p, "name", "?"),
                    fields::string_or(p, "value", "?")
                )
            })
            .collect();
        return format!("{{{}{overflow}}}", items.join(", "));
    }

    fields::string(preview, "description")
}

/// Text of a primitive value; strings are verbatim, absent values empty.
fn scalar_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Picks the best available text for an exception.
fn exception_text(details: &Value) -> String {
    let exception = fields::object(details, "exception");

    fields::opt_string(exception, "description")
        .or_else(|| match exception.get("value") {
            None | Some(Value::Null) => None,
            value => Some(scalar_text(value)),
        })
        .or_else(|| fields::non_empty_string(details, "text"))
        .unwrap_or_else(|| "Unknown exception".to_string())
}

// ============================================================================
// Stack Traces
// ============================================================================

fn call_frames(stack_trace: &Value) -> &[Value] {
    fields::array(stack_trace, "callFrames")
}

fn first_source(frames: &[Value]) -> Option<SourceLocation> {
    frames.first().map(|frame| SourceLocation {
        url: fields::string(frame, "url"),
        line: fields::u32(frame, "lineNumber"),
        column: fields::u32(frame, "columnNumber"),
    })
}

/// Renders frames as `    at fn (url:line:col)` lines.
fn format_stack(frames: &[Value]) -> Option<String> {
    if frames.is_empty() {
        return None;
    }

    let lines: Vec<String> = frames
        .iter()
        .map(|frame| {
            let function = fields::non_empty_string(frame, "functionName")
                .unwrap_or_else(|| "(anonymous)".to_string());
            format!(
                "    at {function} ({}:{}:{})",
                fields::string(frame, "url"),
                fields::u32(frame, "lineNumber"),
                fields::u32(frame, "columnNumber")
            )
        })
        .collect();

    Some(lines.join("\n"))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use serde_json::json;

    fn target_info() -> TargetInfo {
        TargetInfo {
            id: "T1".to_string(),
            title: "Test Page".to_string(),
            url: "http://localhost:3000".to_string(),
        }
    }

    #[test]
    fn test_console_log_basic() {
        let params = json!({
            "type": "log",
            "args": [{ "type": "string", "value": "Hello, world!" }],
            "timestamp": 1702828800000.0_f64,
            "executionContextId": 1
        });

        let event = LogEvent::from_console_api_called(&params, Some(&target_info()));

        assert_eq!(event.level, LogLevel::Info);
        assert_eq!(event.kind, LogKind::Console);
        assert_eq!(event.text, "Hello, world!");
        assert_eq!(event.args, vec![ArgValue::Text("Hello, world!".to_string())]);
        assert_eq!(event.execution_context_id, Some(ExecutionContextId::new(1)));
        assert_eq!(event.target.as_ref().map(|t| t.id.as_str()), Some("T1"));
        assert_eq!(event.ts.timestamp_millis(), 1_702_828_800_000);
    }

    #[test]
    fn test_console_level_mapping() {
        for (console_type, expected) in [
            ("log", LogLevel::Info),
            ("info", LogLevel::Info),
            ("debug", LogLevel::Debug),
            ("trace", LogLevel::Debug),
            ("warn", LogLevel::Warn),
            ("warning", LogLevel::Warn),
            ("error", LogLevel::Error),
            ("assert", LogLevel::Error),
            ("table", LogLevel::Info),
            ("groupEnd", LogLevel::Info),
        ] {
            let params = json!({ "type": console_type, "args": [] });
            assert_eq!(
                LogEvent::from_console_api_called(&params, None).level,
                expected,
                "console.{console_type}"
            );
        }
    }

    #[test]
    fn test_console_mixed_args() {
        let params = json!({
            "type": "log",
            "args": [
                { "type": "string", "value": "count:" },
                { "type": "number", "value": 42 },
                { "type": "boolean", "value": true },
                { "type": "undefined" },
                { "type": "object", "subtype": "null", "value": null },
                { "type": "number", "unserializableValue": "NaN", "description": "NaN" }
            ]
        });

        let event = LogEvent::from_console_api_called(&params, None);

        assert_eq!(event.text, "count: 42 true undefined null NaN");
        assert_eq!(
            event.args,
            vec![
                ArgValue::Text("count:".to_string()),
                ArgValue::Number(42.into()),
                ArgValue::Bool(true),
                ArgValue::Null,
                ArgValue::Null,
                ArgValue::Text("NaN".to_string()),
            ]
        );
    }

    #[test]
    fn test_object_rendering() {
        let params = json!({
            "type": "log",
            "args": [
                { "type": "object", "className": "Object", "description": "Object" },
                {
                    "type": "object",
                    "preview": {
                        "type": "object",
                        "overflow": true,
                        "properties": [
                            { "name": "a", "value": "1" },
                            { "name": "b", "value": "2" }
                        ]
                    }
                },
                {
                    "type": "object",
                    "subtype": "array",
                    "preview": {
                        "type": "object",
                        "subtype": "array",
                        "overflow": false,
                        "properties": [{ "name": "0", "value": "1" }, { "name": "1", "value": "2" }]
                    }
                },
                { "type": "object", "subtype": "map" },
                { "type": "function" },
                { "type": "symbol", "description": "Symbol(id)" }
            ]
        });

        let event = LogEvent::from_console_api_called(&params, None);

        assert_eq!(
            event.text,
            "Object {a: 1, b: 2...} [1, 2] [map] [function] Symbol(id)"
        );
        assert_eq!(event.args[4], ArgValue::Text("[function]".to_string()));
    }

    #[test]
    fn test_console_source_from_first_frame() {
        let params = json!({
            "type": "warn",
            "args": [{ "type": "string", "value": "careful" }],
            "stackTrace": {
                "callFrames": [
                    { "functionName": "f", "url": "http://localhost:3000/app.js", "lineNumber": 42, "columnNumber": 10 },
                    { "functionName": "g", "url": "http://localhost:3000/lib.js", "lineNumber": 1, "columnNumber": 1 }
                ]
            }
        });

        let event = LogEvent::from_console_api_called(&params, None);
        let source = event.source.expect("source");

        assert_eq!(source.url, "http://localhost:3000/app.js");
        assert_eq!(source.line, 42);
        assert_eq!(source.column, 10);
        assert!(event.stack.is_none());
    }

    #[test]
    fn test_exception_thrown() {
        let params = json!({
            "timestamp": 1702828800000.0_f64,
            "exceptionDetails": {
                "exceptionId": 1,
                "text": "Uncaught",
                "exception": {
                    "type": "object",
                    "subtype": "error",
                    "description": "TypeError: Cannot read property 'foo' of undefined"
                },
                "stackTrace": {
                    "callFrames": [
                        { "functionName": "handleClick", "url": "http://localhost:3000/app.js", "lineNumber": 100, "columnNumber": 15 },
                        { "functionName": "", "url": "http://localhost:3000/app.js", "lineNumber": 3, "columnNumber": 1 }
                    ]
                },
                "executionContextId": 2
            }
        });

        let event = LogEvent::from_exception_thrown(&params, Some(&target_info()));

        assert_eq!(event.level, LogLevel::Error);
        assert_eq!(event.kind, LogKind::Exception);
        assert!(event.text.contains("TypeError"));
        assert_eq!(event.source.as_ref().map(|s| s.line), Some(100));
        assert_eq!(
            event.stack.as_deref(),
            Some(
                "    at handleClick (http://localhost:3000/app.js:100:15)\n    at (anonymous) (http://localhost:3000/app.js:3:1)"
            )
        );
        assert_eq!(event.execution_context_id, Some(ExecutionContextId::new(2)));
    }

    #[test]
    fn test_exception_text_fallbacks() {
        let thrown_value = json!({ "exceptionDetails": { "exception": { "type": "number", "value": 42 } } });
        assert_eq!(LogEvent::from_exception_thrown(&thrown_value, None).text, "42");

        let text_only = json!({ "exceptionDetails": { "text": "Uncaught SyntaxError" } });
        assert_eq!(
            LogEvent::from_exception_thrown(&text_only, None).text,
            "Uncaught SyntaxError"
        );

        let empty = json!({});
        let event = LogEvent::from_exception_thrown(&empty, None);
        assert_eq!(event.text, "Unknown exception");
        assert!(event.stack.is_none());
        assert!(event.source.is_none());
    }

    #[test]
    fn test_log_entry_added() {
        let params = json!({
            "entry": {
                "source": "network",
                "level": "error",
                "text": "Failed to load resource: 404",
                "url": "http://localhost:3000/missing.js",
                "lineNumber": 7,
                "timestamp": 1702828800000.0_f64
            }
        });

        let event = LogEvent::from_log_entry_added(&params, None);

        assert_eq!(event.level, LogLevel::Error);
        assert_eq!(event.kind, LogKind::BrowserLog);
        assert_eq!(event.text, "Failed to load resource: 404");
        let source = event.source.as_ref().expect("source");
        assert_eq!(source.url, "http://localhost:3000/missing.js");
        assert_eq!(source.line, 7);
        assert_eq!(source.column, 0);
    }

    #[test]
    fn test_log_entry_level_mapping() {
        for (level, expected) in [
            ("verbose", LogLevel::Debug),
            ("info", LogLevel::Info),
            ("warning", LogLevel::Warn),
            ("error", LogLevel::Error),
            ("nonsense", LogLevel::Info),
        ] {
            let params = json!({ "entry": { "level": level, "text": "x" } });
            assert_eq!(LogEvent::from_log_entry_added(&params, None).level, expected);
        }

        let no_url = json!({ "entry": { "text": "x" } });
        assert!(LogEvent::from_log_entry_added(&no_url, None).source.is_none());
    }

    #[test]
    fn test_from_event_dispatch() {
        let console = Event::new("Runtime.consoleAPICalled", json!({ "type": "error", "args": [] }));
        let other = Event::new("Network.requestWillBeSent", json!({}));

        let event = LogEvent::from_event(&console, None).expect("console is a log");
        assert_eq!(event.kind, LogKind::Console);
        assert!(event.is_error());
        assert!(LogEvent::from_event(&other, None).is_none());
    }

    #[test]
    fn test_ndjson_round_trip() {
        let params = json!({
            "timestamp": 1702828800123.0_f64,
            "exceptionDetails": {
                "exception": { "description": "Error: boom" },
                "stackTrace": { "callFrames": [{ "functionName": "x", "url": "http://h/a.js", "lineNumber": 1, "columnNumber": 2 }] },
                "executionContextId": 9
            }
        });
        let event = LogEvent::from_exception_thrown(&params, Some(&target_info()));

        let line = event.to_ndjson().expect("serialize");
        assert!(!line.contains('\n'));

        let parsed: LogEvent = serde_json::from_str(&line).expect("deserialize");
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_ndjson_absent_optionals_are_null() {
        let event = LogEvent::from_console_api_called(&json!({ "type": "log" }), None);
        let value: Value = serde_json::from_str(&event.to_ndjson().expect("serialize")).expect("json");

        for key in ["source", "stack", "target", "execution_context_id"] {
            assert!(value[key].is_null(), "{key} should be null");
        }
        assert_eq!(value["level"], "info");
        assert_eq!(value["kind"], "console");
    }

    #[test]
    fn test_pretty_rendering() {
        let params = json!({
            "type": "warn",
            "timestamp": 1702828800123.0_f64,
            "args": [{ "type": "string", "value": "careful" }],
            "stackTrace": { "callFrames": [{ "url": "http://localhost:3000/js/app.js", "lineNumber": 42 }] }
        });
        let event = LogEvent::from_console_api_called(&params, None);

        assert_eq!(event.to_pretty(), "16:00:00.123 WARN  careful [app.js:42]");
    }

    #[test]
    fn test_pretty_error_browser_log_second_line() {
        let params = json!({
            "entry": {
                "level": "error",
                "text": "Failed to load resource",
                "url": "http://localhost:3000/missing.js",
                "timestamp": 1702828800123.0_f64
            }
        });
        let event = LogEvent::from_log_entry_added(&params, None);

        assert_eq!(
            event.to_pretty(),
            "16:00:00.123 ERROR Failed to load resource\n    └─ http://localhost:3000/missing.js"
        );
    }

    #[test]
    fn test_tsv_escapes() {
        let params = json!({
            "type": "log",
            "timestamp": 1702828800123.0_f64,
            "args": [{ "type": "string", "value": "a\tb\nc" }]
        });
        let event = LogEvent::from_console_api_called(&params, None);

        assert_eq!(event.to_tsv(), "16:00:00.123\tINFO\ta b\\nc");
    }

    #[test]
    fn test_malformed_payloads_degrade() {
        let event = LogEvent::from_console_api_called(&json!("not an object"), None);
        assert_eq!(event.level, LogLevel::Info);
        assert!(event.text.is_empty());

        let event = LogEvent::from_log_entry_added(&json!({ "entry": 5 }), None);
        assert_eq!(event.kind, LogKind::BrowserLog);
        assert!(event.text.is_empty());
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            any::<f64>().prop_map(Value::from),
            "[a-z]{0,8}".prop_map(Value::String),
            prop_oneof![
                Just("string"),
                Just("number"),
                Just("object"),
                Just("array"),
                Just("undefined"),
                Just("null")
            ]
            .prop_map(Value::from),
        ];

        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map(
                    prop_oneof![
                        Just("type".to_string()),
                        Just("subtype".to_string()),
                        Just("value".to_string()),
                        Just("description".to_string()),
                        Just("preview".to_string()),
                        Just("properties".to_string()),
                        Just("args".to_string()),
                        Just("entry".to_string()),
                        Just("exceptionDetails".to_string()),
                        Just("stackTrace".to_string()),
                        Just("callFrames".to_string()),
                        Just("timestamp".to_string()),
                        "[a-z]{1,6}",
                    ],
                    inner,
                    0..6,
                )
                .prop_map(|map| Value::Object(map.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_normalizers_never_panic(params in arb_json()) {
            let console = LogEvent::from_console_api_called(&params, None);
            let exception = LogEvent::from_exception_thrown(&params, None);
            let entry = LogEvent::from_log_entry_added(&params, None);

            prop_assert_eq!(console.kind, LogKind::Console);
            prop_assert_eq!(exception.level, LogLevel::Error);
            prop_assert_eq!(entry.kind, LogKind::BrowserLog);
            prop_assert!(console.to_ndjson().is_ok());
            let _ = exception.to_pretty();
            let _ = entry.to_tsv();
        }
    }
}
