//! DevLog CDP - Chrome DevTools Protocol capture core.
//!
//! This library attaches to a running Chromium-family browser over its remote
//! debugging port and turns the raw protocol traffic into typed records.
//!
//! # Architecture
//!
//! Capture follows a discover, bind, observe pipeline:
//!
//! - **Discovery**: list debuggable targets over HTTP and pick one
//! - **Session**: one WebSocket per target, with a background event loop that
//!   routes replies to waiting commands and queues everything else
//! - **Events**: normalize console/exception/log events into [`LogEvent`] and
//!   correlate network/navigation/instrumentation events into [`WatchEvent`]
//!
//! Key design principles:
//!
//! - Each [`Session`] owns: one connection + one event loop + one event queue
//! - Protocol uses `Domain.methodName` format
//! - Replies are matched to commands by request ID, never by arrival order
//! - Normalizers are total: malformed payloads still yield a record
//!
//! # Quick Start
//!
//! ```no_run
//! use devlog_cdp::{DebuggerEndpoint, HttpTargetSource, Result, Session};
//! use devlog_cdp::{TargetDirectory, TargetSelector};
//! use futures_util::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Find the first page on localhost:9222
//!     let source = HttpTargetSource::new(DebuggerEndpoint::default())?;
//!     let target = TargetDirectory::find(&source, &TargetSelector::FirstPage).await?;
//!
//!     // Bind and enable console capture
//!     let session = Session::new();
//!     session.connect(&target).await?;
//!     session.enable_logging().await?;
//!
//!     let mut logs = session.log_stream()?;
//!     while let Some(event) = logs.next().await {
//!         println!("{}", event.to_pretty());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | [`DebuggerEndpoint`] and [`SessionConfig`] |
//! | [`discovery`] | Target listing and selection |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`events`] | [`LogEvent`], [`WatchEvent`] and correlation |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | CDP message types |
//! | [`session`] | [`Session`] binding, commands, streams |
//! | [`transport`] | WebSocket connection and event loop |

// ============================================================================
// Modules
// ============================================================================

/// Endpoint and session configuration.
pub mod config;

/// Target discovery and selection.
///
/// Use [`TargetDirectory::find`] to resolve a [`TargetSelector`] against a
/// [`TargetSource`].
pub mod discovery;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Typed output records.
///
/// - [`LogEvent`] - Console, exception and browser log entries
/// - [`WatchEvent`] - Requests, responses, failures, navigation, clicks, messages
pub mod events;

/// Type-safe identifiers.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// CDP message types.
///
/// Requests, replies, events and typed commands.
pub mod protocol;

/// Debugging sessions.
pub mod session;

/// WebSocket transport layer.
///
/// Connection handle and event loop behind [`Session`].
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Configuration
pub use config::{DebuggerEndpoint, SessionConfig};

// Discovery types
pub use discovery::{
    BrowserVersion, HttpTargetSource, Target, TargetDirectory, TargetInfo, TargetSelector,
    TargetSource, TargetType, check_connection,
};

// Error types
pub use error::{Error, Result};

// Event records
pub use events::{
    ArgValue, LogEvent, LogKind, LogLevel, SourceLocation, WatchCorrelator, WatchEvent, WatchKind,
    WatchOptions,
};

// Identifier types
pub use identifiers::{ExecutionContextId, FrameId, NetworkRequestId, RequestId, TargetId};

// Protocol types
pub use protocol::{Command, Event, ParsedEvent};

// Session types
pub use session::{CaptureLimits, EventFeed, Frame, FrameTree, IframeSelector, Session};
