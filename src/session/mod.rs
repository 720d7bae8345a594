//! Debugging sessions bound to a single target.
//!
//! Each [`Session`] owns one WebSocket connection to one target and the event
//! loop that serves it.
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | Session struct, lifecycle, command invocation, event feed |
//! | `domains` | Domain enablement and page instrumentation |
//! | `frames` | Frame tree, iframe resolution, script evaluation |
//! | `streams` | Log and watch streams, capture limits |
//!
//! # Example
//!
//! ```no_run
//! use devlog_cdp::{CaptureLimits, DebuggerEndpoint, HttpTargetSource, Result, Session};
//! use devlog_cdp::{TargetDirectory, TargetSelector};
//! use futures_util::StreamExt;
//!
//! # async fn example() -> Result<()> {
//! let source = HttpTargetSource::new(DebuggerEndpoint::default())?;
//! let target = TargetDirectory::find(&source, &TargetSelector::FirstPage).await?;
//!
//! let session = Session::new();
//! session.connect(&target).await?;
//! session.enable_logging().await?;
//!
//! let limits = CaptureLimits::new().with_max_events(10);
//! let mut logs = limits.apply(session.log_stream()?);
//! while let Some(event) = logs.next().await {
//!     println!("{}", event.to_pretty());
//! }
//!
//! session.disconnect().await;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

mod core;
mod domains;
mod frames;
mod streams;

// ============================================================================
// Re-exports
// ============================================================================

pub use core::{EventFeed, Session};
pub use frames::{Frame, FrameTree, IframeSelector};
pub use streams::CaptureLimits;
