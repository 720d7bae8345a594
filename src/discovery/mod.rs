//! Target discovery.
//!
//! Lists the debuggable targets a browser exposes over its remote debugging
//! HTTP endpoint and picks one to attach to.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TargetDirectory`] | Snapshot of targets with selector resolution |
//! | [`TargetSource`] | Async seam producing target listings |
//! | [`HttpTargetSource`] | `/json/list` and `/json/version` over HTTP |
//! | [`Target`] | One debuggable target |
//! | [`TargetSelector`] | Id, URL, title or first-page selection |
//!
//! # Example
//!
//! ```no_run
//! use devlog_cdp::{DebuggerEndpoint, HttpTargetSource, Result, TargetDirectory, TargetSelector};
//!
//! # async fn example() -> Result<()> {
//! let source = HttpTargetSource::new(DebuggerEndpoint::default())?;
//! let target = TargetDirectory::find(&source, &TargetSelector::FirstPage).await?;
//! println!("{} {}", target.id, target.url);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Target listing and resolution.
pub mod directory;

/// Target sources and the debugger HTTP surface.
pub mod source;

/// Target records and selectors.
pub mod target;

// ============================================================================
// Re-exports
// ============================================================================

pub use directory::TargetDirectory;
pub use source::{BrowserVersion, HttpTargetSource, TargetSource, check_connection, parse_target_list};
pub use target::{Target, TargetInfo, TargetSelector, TargetType};
