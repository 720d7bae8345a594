//! Debugger endpoint and session configuration.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use devlog_cdp::{DebuggerEndpoint, SessionConfig};
//!
//! let endpoint = DebuggerEndpoint::new("127.0.0.1", 9333)
//!     .with_http_timeout(Duration::from_secs(2));
//!
//! let config = SessionConfig::new()
//!     .with_command_timeout(Duration::from_secs(10))
//!     .with_world_name("devlog");
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default debugger host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default remote debugging port.
pub const DEFAULT_PORT: u16 = 9222;

/// Default timeout for HTTP discovery calls.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for a command reply.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Default maximum number of in-flight commands per session.
pub const DEFAULT_MAX_PENDING: usize = 100;

// ============================================================================
// DebuggerEndpoint
// ============================================================================

/// Address of a browser's remote debugging HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebuggerEndpoint {
    /// Host name or IP.
    pub host: String,

    /// Remote debugging port.
    pub port: u16,

    /// Timeout applied to each HTTP call.
    pub http_timeout: Duration,
}

impl Default for DebuggerEndpoint {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl DebuggerEndpoint {
    /// Creates an endpoint for the given host and port.
    #[inline]
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Creates an endpoint on the default host with a custom port.
    #[inline]
    #[must_use]
    pub fn with_port_only(port: u16) -> Self {
        Self::new(DEFAULT_HOST, port)
    }

    /// Parses an endpoint from a base URL such as `http://localhost:9222`.
    ///
    /// # Errors
    ///
    /// - [`Error::Url`] if the URL does not parse
    /// - [`Error::Config`] if it is not `http` or has no host
    pub fn from_url(url: &str) -> Result<Self> {
        let parsed = Url::parse(url)?;

        if parsed.scheme() != "http" {
            return Err(Error::config(format!(
                "Debugger endpoint must use http, got '{}'",
                parsed.scheme()
            )));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| Error::config(format!("Debugger endpoint has no host: {url}")))?;

        Ok(Self::new(host, parsed.port().unwrap_or(DEFAULT_PORT)))
    }

    /// Sets the HTTP timeout.
    #[inline]
    #[must_use]
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Returns the base URL, e.g. `http://127.0.0.1:9222`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Returns the target list URL.
    #[must_use]
    pub fn list_url(&self) -> String {
        format!("{}/json/list", self.base_url())
    }

    /// Returns the browser version URL.
    #[must_use]
    pub fn version_url(&self) -> String {
        format!("{}/json/version", self.base_url())
    }
}

// ============================================================================
// SessionConfig
// ============================================================================

/// Session tuning options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long a command waits for its reply.
    pub command_timeout: Duration,

    /// Maximum number of commands awaiting a reply at once.
    pub max_pending: usize,

    /// Name given to isolated worlds created for iframe evaluation.
    pub world_name: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionConfig {
    /// Creates a config with default settings.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            max_pending: DEFAULT_MAX_PENDING,
            world_name: None,
        }
    }

    /// Sets the command timeout.
    #[inline]
    #[must_use]
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Sets the maximum number of pending commands.
    #[inline]
    #[must_use]
    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = max_pending;
        self
    }

    /// Sets the isolated world name.
    #[inline]
    #[must_use]
    pub fn with_world_name(mut self, name: impl Into<String>) -> Self {
        self.world_name = Some(name.into());
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero timeout or zero pending limit.
    pub fn validate(&self) -> Result<()> {
        if self.command_timeout.is_zero() {
            return Err(Error::config("Command timeout must be greater than zero"));
        }

        if self.max_pending == 0 {
            return Err(Error::config("Max pending requests must be greater than zero"));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
