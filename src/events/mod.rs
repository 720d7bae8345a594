//! Typed output records built from raw events.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `log` | [`LogEvent`] normalization and rendering |
//! | `watch` | [`WatchEvent`] records and [`WatchOptions`] |
//! | `correlator` | [`WatchCorrelator`] request lifecycle tracking |
//! | `timestamp` | Protocol timestamp conversion |

// ============================================================================
// Submodules
// ============================================================================

/// Network request correlation.
pub mod correlator;

/// Unified log records.
pub mod log;

/// Protocol timestamp conversion.
pub mod timestamp;

/// Watch records and options.
pub mod watch;

// ============================================================================
// Re-exports
// ============================================================================

pub use correlator::{PendingRequest, WatchCorrelator};
pub use log::{ArgValue, LogEvent, LogKind, LogLevel, SourceLocation};
pub use watch::{CLICK_MARKER, MESSAGE_MARKER, WatchEvent, WatchKind, WatchOptions};
