//! WebSocket transport layer.
//!
//! This module handles communication between the local end (Rust) and a
//! target's debugger endpoint over WebSocket.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Session        │                              │  Browser        │
//! │                 │         WebSocket            │                 │
//! │  Connection ────┼─────────────────────────────►│  Target         │
//! │  EventReceiver ◄┼──────────────────────────────┤  (page, worker) │
//! └─────────────────┘  /devtools/page/{targetId}   └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `Connection::open` - Connect to the target's debugger URL
//! 2. `Connection::send` - Send commands, await correlated replies
//! 3. `EventReceiver` - Receive everything else in arrival order
//! 4. `Connection::shutdown` - Close the socket and fail pending commands
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | WebSocket connection and event loop |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

#[cfg(test)]
pub(crate) mod mock;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, ConnectionParts, EventReceiver};
