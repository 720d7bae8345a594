//! Shared utilities for demos.
//!
//! Provides common functionality used across all demos:
//! - Command-line argument parsing
//! - Logging initialization
//! - Target lookup

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use anyhow::Context;
use devlog_cdp::{DebuggerEndpoint, HttpTargetSource, Target, TargetDirectory, TargetSelector};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Types
// ============================================================================

/// Command-line arguments for demos.
#[derive(Debug, Clone, Default)]
pub struct Args {
    pub debug: bool,
    pub json: bool,
    pub port: Option<u16>,
    pub target_id: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub count: Option<usize>,
    pub duration: Option<Duration>,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse() -> anyhow::Result<Self> {
        let mut args = Self::default();
        let mut iter = std::env::args().skip(1);

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--debug" => args.debug = true,
                "--json" => args.json = true,
                "--port" => args.port = Some(value(&mut iter, &arg)?.parse()?),
                "--id" => args.target_id = Some(value(&mut iter, &arg)?),
                "--url" => args.url = Some(value(&mut iter, &arg)?),
                "--title" => args.title = Some(value(&mut iter, &arg)?),
                "--count" => args.count = Some(value(&mut iter, &arg)?.parse()?),
                "--duration" => {
                    let secs: f64 = value(&mut iter, &arg)?.parse()?;
                    args.duration = Some(Duration::from_secs_f64(secs));
                }
                other => anyhow::bail!("unknown argument: {other}"),
            }
        }

        Ok(args)
    }

    /// Returns the endpoint to query.
    pub fn endpoint(&self) -> DebuggerEndpoint {
        self.port
            .map(DebuggerEndpoint::with_port_only)
            .unwrap_or_default()
    }

    /// Returns the target selector.
    pub fn selector(&self) -> TargetSelector {
        TargetSelector::from_query(
            self.target_id.as_deref(),
            self.url.as_deref(),
            self.title.as_deref(),
        )
    }
}

fn value(iter: &mut impl Iterator<Item = String>, flag: &str) -> anyhow::Result<String> {
    iter.next()
        .with_context(|| format!("{flag} requires a value"))
}

// ============================================================================
// Functions
// ============================================================================

/// Initialize tracing/logging.
pub fn init_logging(debug: bool) {
    let filter = if debug {
        "devlog_cdp=debug"
    } else {
        "devlog_cdp=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolves the selected target.
pub async fn find_target(args: &Args) -> anyhow::Result<Target> {
    let endpoint = args.endpoint();
    let source = HttpTargetSource::new(endpoint)?;

    let selector = args.selector();
    let target = TargetDirectory::find(&source, &selector)
        .await
        .with_context(|| format!("selecting {selector}"))?;

    eprintln!("[Target] {} - {}", target.title, target.url);
    Ok(target)
}
