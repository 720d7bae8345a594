//! Target listing and resolution.

// ============================================================================
// Imports
// ============================================================================

use tracing::debug;

use crate::error::{Error, Result};

use super::source::TargetSource;
use super::target::{Target, TargetSelector};

// ============================================================================
// TargetDirectory
// ============================================================================

/// A snapshot of the targets a browser exposes.
///
/// # Example
///
/// ```ignore
/// use devlog_cdp::{DebuggerEndpoint, HttpTargetSource, TargetDirectory, TargetSelector};
///
/// let source = HttpTargetSource::new(DebuggerEndpoint::default())?;
/// let directory = TargetDirectory::list(&source).await?;
/// let target = directory.resolve(&TargetSelector::UrlContains("localhost".into()))?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetDirectory {
    /// Targets in listing order.
    targets: Vec<Target>,
}

impl TargetDirectory {
    /// Lists targets from a source.
    ///
    /// # Errors
    ///
    /// Propagates the source's connection or invalid response error.
    pub async fn list<S>(source: &S) -> Result<Self>
    where
        S: TargetSource + ?Sized,
    {
        let targets = source.fetch_targets().await?;
        debug!(count = targets.len(), "Targets listed");
        Ok(Self::from_targets(targets))
    }

    /// Lists targets and resolves one in a single step.
    ///
    /// # Errors
    ///
    /// Same as [`list`](Self::list) and [`resolve`](Self::resolve).
    pub async fn find<S>(source: &S, selector: &TargetSelector) -> Result<Target>
    where
        S: TargetSource + ?Sized,
    {
        Self::list(source).await?.resolve(selector).cloned()
    }

    /// Wraps an existing listing.
    #[inline]
    #[must_use]
    pub fn from_targets(targets: Vec<Target>) -> Self {
        Self { targets }
    }

    /// Returns all targets in listing order.
    #[inline]
    #[must_use]
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Returns the page targets in listing order.
    pub fn pages(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter().filter(|t| t.is_page())
    }

    /// Returns the number of targets.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns `true` if no targets are listed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Consumes the directory and returns the listing.
    #[inline]
    #[must_use]
    pub fn into_targets(self) -> Vec<Target> {
        self.targets
    }

    /// Picks one target.
    ///
    /// - `Id` matches exactly across all kinds
    /// - `UrlContains` / `TitleContains` take the first matching page
    /// - `FirstPage` takes the first page, else the first target of any kind
    ///
    /// # Errors
    ///
    /// Returns [`Error::TargetNotFound`] when nothing matches, including for
    /// every selector on an empty directory.
    pub fn resolve(&self, selector: &TargetSelector) -> Result<&Target> {
        if self.targets.is_empty() {
            return Err(Error::target_not_found("no targets available"));
        }

        let found = match selector {
            TargetSelector::Id(id) => self.targets.iter().find(|t| &t.id == id),
            TargetSelector::UrlContains(needle) => {
                self.pages().find(|t| t.url.contains(needle.as_str()))
            }
            TargetSelector::TitleContains(needle) => {
                self.pages().find(|t| t.title.contains(needle.as_str()))
            }
            TargetSelector::FirstPage => self.pages().next().or_else(|| self.targets.first()),
        };

        found.ok_or_else(|| Error::target_not_found(selector.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
