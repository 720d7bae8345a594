//! Tail console output of a page.
//!
//! Demonstrates:
//! - Selecting a target from the debugger endpoint
//! - Enabling Runtime and Log reporting
//! - Streaming normalized log records with capture limits
//!
//! Start Chrome with `--remote-debugging-port=9222`, then:
//!   cargo run --example tail_console
//!   cargo run --example tail_console -- --url localhost:3000 --json
//!   cargo run --example tail_console -- --count 20 --duration 30

mod common;

// ============================================================================
// Imports
// ============================================================================

use common::Args;
use devlog_cdp::{CaptureLimits, Session, check_connection};
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
    if !check_connection(&args.endpoint()).await {
        anyhow::bail!(
            "no debugger at {}; start Chrome with --remote-debugging-port",
            args.endpoint().base_url()
        );
    }

    let target = common::find_target(&args).await?;

    let session = Session::new();
    session.connect(&target).await?;
    session.enable_logging().await?;

    let limits = CaptureLimits {
        max_events: args.count,
        duration: args.duration,
    };
    let mut logs = limits.apply(session.log_stream()?);

    loop {
        tokio::select! {
            event = logs.next() => {
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

    drop(logs);
    session.disconnect().await;
    Ok(())
}
