//! CDP wire message types.
//!
//! This module defines the message format exchanged with a target's debugger
//! endpoint.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Request` | Local → Target | Command request |
//! | `Response` | Target → Local | Command reply (`result` or `error`) |
//! | `Event` | Target → Local | Browser notification |
//!
//! # Command Naming
//!
//! Commands and events follow `Domain.methodName` format:
//!
//! - `Runtime.evaluate`
//! - `Page.getFrameTree`
//! - `Network.requestWillBeSent`
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Typed command definitions by domain |
//! | `event` | Event and parsed event types |
//! | `request` | Request and Response types |

// ============================================================================
// Submodules
// ============================================================================

/// Command definitions organized by domain.
pub mod command;

/// Event message types.
pub mod event;

/// Request and Response message types.
pub mod request;

pub(crate) mod fields;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{Command, LogCommand, NetworkCommand, PageCommand, RuntimeCommand};
pub use event::{
    Event, ExecutionContext, FrameNavigated, LoadingFailed, ParsedEvent, RedirectResponse,
    RequestWillBeSent, ResponseReceived,
};
pub use request::{Request, Response, ResponseError};
