//! Core Session struct, lifecycle and command invocation.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::discovery::{Target, TargetInfo};
use crate::error::{Error, Result};
use crate::protocol::{Command, Event};
use crate::transport::{Connection, ConnectionParts, EventReceiver};

// ============================================================================
// Types
// ============================================================================

/// State held while a target is bound.
struct Binding {
    /// Bound target.
    target: Target,
    /// Command handle.
    connection: Connection,
    /// Shared single-consumer event queue.
    events: Arc<tokio::sync::Mutex<EventReceiver>>,
    /// Event loop task.
    task: JoinHandle<()>,
}

impl Binding {
    /// Shuts the connection down and waits for its event loop to exit.
    async fn release(self) {
        self.connection.shutdown();

        if let Err(e) = self.task.await
            && e.is_panic()
        {
            warn!(error = %e, "Event loop panicked");
        }

        debug!(target_id = %self.target.id, "Binding released");
    }
}

// ============================================================================
// Session
// ============================================================================

/// One bound connection to one target's debugger endpoint.
///
/// A session starts unbound. [`connect`](Self::connect) binds it and starts a
/// background event loop; [`disconnect`](Self::disconnect) stops the loop and
/// returns it to unbound. Dropping a session aborts its loop.
///
/// All methods take `&self`, so concurrent [`invoke`](Self::invoke) calls can
/// share one session.
///
/// # Example
///
/// ```no_run
/// use devlog_cdp::{Result, Session, Target};
///
/// # async fn example(target: Target) -> Result<()> {
/// let session = Session::new();
/// session.connect(&target).await?;
///
/// let reply = session.invoke("Browser.getVersion", None).await?;
/// println!("{reply}");
///
/// session.disconnect().await;
/// # Ok(())
/// # }
/// ```
pub struct Session {
    /// Tuning options.
    config: SessionConfig,
    /// Current binding.
    binding: Mutex<Option<Binding>>,
    /// Domains enabled through this session.
    domains: Mutex<FxHashSet<String>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("target", &self.target().map(|t| t.id))
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(binding) = self.binding.get_mut().take() {
            binding.connection.shutdown();
            binding.task.abort();
        }
    }
}

// ============================================================================
// Session - Construction
// ============================================================================

impl Session {
    /// Creates an unbound session with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SessionConfig::new(),
            binding: Mutex::new(None),
            domains: Mutex::new(FxHashSet::default()),
        }
    }

    /// Creates an unbound session with custom settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the settings are invalid.
    pub fn with_config(config: SessionConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            binding: Mutex::new(None),
            domains: Mutex::new(FxHashSet::default()),
        })
    }
}

// ============================================================================
// Session - Accessors
// ============================================================================

impl Session {
    /// Returns the settings.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns `true` while bound to an open connection.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.binding
            .lock()
            .as_ref()
            .is_some_and(|b| b.connection.is_open())
    }

    /// Returns the bound target.
    #[must_use]
    pub fn target(&self) -> Option<Target> {
        self.binding.lock().as_ref().map(|b| b.target.clone())
    }

    /// Returns the identity stamped on captured events.
    #[must_use]
    pub fn target_info(&self) -> Option<TargetInfo> {
        self.binding
            .lock()
            .as_ref()
            .map(|b| b.target.to_target_info())
    }

    /// Returns the number of commands awaiting a reply.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.binding
            .lock()
            .as_ref()
            .map_or(0, |b| b.connection.pending_count())
    }

    /// Returns `true` if the domain was enabled through this session.
    #[must_use]
    pub fn is_domain_enabled(&self, domain: &str) -> bool {
        self.domains.lock().contains(domain)
    }

    /// Returns the enabled domains, sorted.
    #[must_use]
    pub fn enabled_domains(&self) -> Vec<String> {
        let mut domains: Vec<String> = self.domains.lock().iter().cloned().collect();
        domains.sort_unstable();
        domains
    }
}

// ============================================================================
// Session - Lifecycle
// ============================================================================

impl Session {
    /// Binds the session to a target.
    ///
    /// An existing binding is disconnected first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the target has no debugger URL or the
    /// socket cannot be opened.
    pub async fn connect(&self, target: &Target) -> Result<()> {
        self.disconnect().await;

        let url = target
            .websocket_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                Error::connection(format!(
                    "Target {} has no debugger URL; another client may be attached",
                    target.id
                ))
            })?;

        let ConnectionParts {
            connection,
            events,
            task,
        } = Connection::open(url, &self.config).await?;

        let previous = self.binding.lock().replace(Binding {
            target: target.clone(),
            connection,
            events: Arc::new(tokio::sync::Mutex::new(events)),
            task,
        });

        // A concurrent connect won the race; keep the newest binding
        if let Some(previous) = previous {
            previous.release().await;
            self.domains.lock().clear();
        }

        info!(target_id = %target.id, url = %target.url, "Session connected");
        Ok(())
    }

    /// Stops the event loop, closes the socket and unbinds.
    ///
    /// Pending invocations fail with [`Error::ConnectionClosed`]. Calling this
    /// on an unbound session does nothing.
    pub async fn disconnect(&self) {
        let binding = self.binding.lock().take();
        let Some(binding) = binding else {
            return;
        };

        binding.release().await;

        self.domains.lock().clear();
        debug!("Session disconnected");
    }
}

// ============================================================================
// Session - Commands
// ============================================================================

impl Session {
    /// Sends a command and returns its result payload.
    ///
    /// Successful `Domain.enable` / `Domain.disable` calls are tracked so that
    /// streams can check their prerequisites.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if the session is not connected
    /// - [`Error::RequestTimeout`] if no reply arrives in time
    /// - [`Error::ConnectionClosed`] if the connection closes first
    /// - [`Error::Protocol`] if the target replies with an error
    pub async fn invoke(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let result = self.connection()?.send(method, params).await?;
        self.track_domain(method);
        Ok(result)
    }

    /// Sends a command with a custom reply timeout.
    ///
    /// # Errors
    ///
    /// Same as [`invoke`](Self::invoke).
    pub async fn invoke_with_timeout(
        &self,
        method: &str,
        params: Option<Value>,
        timeout: Duration,
    ) -> Result<Value> {
        let result = self
            .connection()?
            .send_with_timeout(method, params, timeout)
            .await?;
        self.track_domain(method);
        Ok(result)
    }

    /// Sends a typed command.
    ///
    /// # Errors
    ///
    /// Same as [`invoke`](Self::invoke).
    pub async fn execute(&self, command: Command) -> Result<Value> {
        let (method, params) = command.into_parts()?;
        self.invoke(&method, params).await
    }

    /// Returns the event feed.
    ///
    /// Every feed obtained from one binding reads the same queue: an event is
    /// delivered to exactly one reader.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the session is not connected.
    pub fn events(&self) -> Result<EventFeed> {
        self.binding
            .lock()
            .as_ref()
            .map(|b| EventFeed {
                receiver: Arc::clone(&b.events),
            })
            .ok_or_else(Error::not_connected)
    }

    /// Returns a clone of the bound connection.
    fn connection(&self) -> Result<Connection> {
        self.binding
            .lock()
            .as_ref()
            .map(|b| b.connection.clone())
            .ok_or_else(Error::not_connected)
    }

    /// Records `Domain.enable` / `Domain.disable`.
    fn track_domain(&self, method: &str) {
        let Some((domain, action)) = method.split_once('.') else {
            return;
        };

        match action {
            "enable" => {
                self.domains.lock().insert(domain.to_string());
                debug!(domain, "Domain enabled");
            }
            "disable" => {
                self.domains.lock().remove(domain);
                debug!(domain, "Domain disabled");
            }
            _ => {}
        }
    }
}

// ============================================================================
// EventFeed
// ============================================================================

/// Reader for a session's event queue.
///
/// Events arrive in channel order. The feed ends once the connection has
/// closed and the queue is drained.
#[derive(Clone)]
pub struct EventFeed {
    receiver: Arc<tokio::sync::Mutex<EventReceiver>>,
}

impl fmt::Debug for EventFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFeed").finish_non_exhaustive()
    }
}

impl EventFeed {
    /// Waits for the next event; `None` once the feed has ended.
    pub async fn next(&self) -> Option<Event> {
        self.receiver.lock().await.recv().await
    }

    /// Converts the feed into a stream.
    pub fn into_stream(self) -> BoxStream<'static, Event> {
        stream::unfold(self, |feed| async move {
            let event = feed.next().await?;
            Some((event, feed))
        })
        .boxed()
    }
}

// ============================================================================
// Tests
// ============================================================================
