//! Watch failed and erroring network requests.
//!
//! Demonstrates:
//! - Enabling Network reporting
//! - Correlating request lifecycles into watch records
//! - Filtering to failures and HTTP errors
//!
//! Start Chrome with `--remote-debugging-port=9222`, then:
//!   cargo run --example network_errors
//!   cargo run --example network_errors -- --title Dashboard --duration 60

mod common;

// ============================================================================
// Imports
// ============================================================================

use common::Args;
use devlog_cdp::{CaptureLimits, Session, WatchOptions};
use futures_util::StreamExt;

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = match Args::parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("[ERROR] {e}");
            std::process::exit(2);
        }
    };
    common::init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let target = common::find_target(&args).await?;

    let session = Session::new();
    session.connect(&target).await?;
    session.enable_network().await?;

    let options = WatchOptions::network().with_errors_only();
    let limits = CaptureLimits {
        max_events: args.count,
        duration: args.duration,
    };
    let mut events = limits.apply(session.watch_stream(options)?);

    eprintln!("[Watch] Waiting for failed requests (Ctrl+C to stop)");

    loop {
        tokio::select! {
            event = events.next() => {
                let Some(event) = event else { break };
                if args.json {
                    println!("{}", event.to_ndjson()?);
                } else {
                    println!("{}", event.to_pretty());
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    drop(events);
    session.disconnect().await;
    Ok(())
}
