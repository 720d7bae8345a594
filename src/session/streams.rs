//! Typed output streams and capture limits.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use futures_util::future;
use futures_util::stream::{BoxStream, Stream, StreamExt};
use tracing::debug;

use crate::error::{Error, Result};
use crate::events::{LogEvent, WatchCorrelator, WatchEvent, WatchOptions};

use super::Session;

// ============================================================================
// CaptureLimits
// ============================================================================

/// Bounds for a capture.
///
/// Limits are cooperative: the stream ends after `max_events` items or once
/// `duration` has elapsed, whichever comes first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureLimits {
    /// Stop after this many items.
    pub max_events: Option<usize>,
    /// Stop after this much time.
    pub duration: Option<Duration>,
}

impl CaptureLimits {
    /// Creates unbounded limits.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_events: None,
            duration: None,
        }
    }

    /// Stops after `count` items.
    #[inline]
    #[must_use]
    pub const fn with_max_events(mut self, count: usize) -> Self {
        self.max_events = Some(count);
        self
    }

    /// Stops after `duration`.
    #[inline]
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Returns `true` if neither limit is set.
    #[inline]
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.max_events.is_none() && self.duration.is_none()
    }

    /// Applies the limits to a stream.
    ///
    /// The duration clock starts when this is called.
    pub fn apply<'a, S>(self, stream: S) -> BoxStream<'a, S::Item>
    where
        S: Stream + Send + 'a,
    {
        let stream = match self.max_events {
            Some(count) => stream.take(count).boxed(),
            None => stream.boxed(),
        };

        match self.duration {
            Some(duration) => stream.take_until(tokio::time::sleep(duration)).boxed(),
            None => stream,
        }
    }
}

// ============================================================================
// Session - Streams
// ============================================================================

impl Session {
    /// Returns a stream of normalized log records.
    ///
    /// Each record is stamped with the bound target.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if the session is not connected
    /// - [`Error::Unavailable`] if neither `Runtime` nor `Log` is enabled
    pub fn log_stream(&self) -> Result<BoxStream<'static, LogEvent>> {
        let feed = self.events()?;

        if !self.is_domain_enabled("Runtime") && !self.is_domain_enabled("Log") {
            return Err(Error::unavailable(
                "log capture requires the Runtime or Log domain",
            ));
        }

        let target = self.target_info();
        debug!("Log stream started");

        Ok(feed
            .into_stream()
            .filter_map(move |event| future::ready(LogEvent::from_event(&event, target.as_ref())))
            .boxed())
    }

    /// Returns a stream of correlated watch records.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if the session is not connected
    /// - [`Error::Unavailable`] if a domain `options` needs is not enabled
    pub fn watch_stream(
        &self,
        options: WatchOptions,
    ) -> Result<BoxStream<'static, WatchEvent>> {
        let feed = self.events()?;

        if let Some(domain) = options
            .required_domains()
            .into_iter()
            .find(|domain| !self.is_domain_enabled(domain))
        {
            return Err(Error::unavailable(format!(
                "watch capture requires the {domain} domain"
            )));
        }

        let mut correlator = WatchCorrelator::new(options, self.target_info());
        debug!("Watch stream started");

        Ok(feed
            .into_stream()
            .filter_map(move |event| future::ready(correlator.observe(&event)))
            .boxed())
    }
}

// ============================================================================
// Tests
// ============================================================================
