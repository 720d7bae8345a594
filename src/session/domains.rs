//! Domain enablement and page instrumentation.

// ============================================================================
// Imports
// ============================================================================

use tracing::debug;

use crate::error::Result;
use crate::events::{CLICK_MARKER, MESSAGE_MARKER};
use crate::protocol::{Command, LogCommand, NetworkCommand, PageCommand, RuntimeCommand};

use super::Session;

// ============================================================================
// Instrumentation Scripts
// ============================================================================

/// Builds the capture-phase click listener.
fn click_listener_script() -> String {
    format!(
        r"(function() {{
    if (window.__devlog_click_listener__) return;
    window.__devlog_click_listener__ = true;
    document.addEventListener('click', function(e) {{
        var t = e.target;
        var info = {{
            tag: t.tagName,
            id: t.id || null,
            className: t.className || null,
            href: t.href || null,
            text: (t.textContent || '').slice(0, 100).trim()
        }};
        console.log('{CLICK_MARKER}', JSON.stringify(info));
    }}, true);
}})();"
    )
}

/// Builds the `postMessage` listener.
fn message_listener_script() -> String {
    format!(
        r"(function() {{
    if (window.__devlog_message_listener__) return;
    window.__devlog_message_listener__ = true;
    window.addEventListener('message', function(e) {{
        var data = e.data;
        var dataStr;
        try {{
            dataStr = typeof data === 'string' ? data : JSON.stringify(data);
        }} catch (err) {{
            dataStr = String(data);
        }}
        console.log('{MESSAGE_MARKER}', e.origin, dataStr);
    }});
}})();"
    )
}

// ============================================================================
// Session - Domains
// ============================================================================

impl Session {
    /// Enables console, exception and browser log reporting.
    ///
    /// # Errors
    ///
    /// Returns an error if either `Runtime.enable` or `Log.enable` fails.
    pub async fn enable_logging(&self) -> Result<()> {
        self.execute(Command::Runtime(RuntimeCommand::Enable)).await?;
        self.execute(Command::Log(LogCommand::Enable)).await?;
        Ok(())
    }

    /// Disables console, exception and browser log reporting.
    ///
    /// # Errors
    ///
    /// Returns an error if either disable command fails.
    pub async fn disable_logging(&self) -> Result<()> {
        self.execute(Command::Log(LogCommand::Disable)).await?;
        self.execute(Command::Runtime(RuntimeCommand::Disable)).await?;
        Ok(())
    }

    /// Enables request lifecycle reporting.
    ///
    /// # Errors
    ///
    /// Returns an error if `Network.enable` fails.
    pub async fn enable_network(&self) -> Result<()> {
        self.execute(Command::Network(NetworkCommand::Enable)).await?;
        Ok(())
    }

    /// Disables request lifecycle reporting.
    ///
    /// # Errors
    ///
    /// Returns an error if `Network.disable` fails.
    pub async fn disable_network(&self) -> Result<()> {
        self.execute(Command::Network(NetworkCommand::Disable)).await?;
        Ok(())
    }

    /// Enables frame and navigation reporting.
    ///
    /// # Errors
    ///
    /// Returns an error if `Page.enable` fails.
    pub async fn enable_page(&self) -> Result<()> {
        self.execute(Command::Page(PageCommand::Enable)).await?;
        Ok(())
    }
}

// ============================================================================
// Session - Instrumentation
// ============================================================================

impl Session {
    /// Installs a page script that logs every click as a marked console message.
    ///
    /// Repeated calls are no-ops in the page.
    ///
    /// # Errors
    ///
    /// Returns an error if the evaluation fails.
    pub async fn inject_click_listener(&self) -> Result<()> {
        self.evaluate(click_listener_script(), None).await?;
        debug!("Click listener injected");
        Ok(())
    }

    /// Installs a page script that logs every `postMessage` as a marked
    /// console message.
    ///
    /// # Errors
    ///
    /// Returns an error if the evaluation fails.
    pub async fn inject_message_listener(&self) -> Result<()> {
        self.evaluate(message_listener_script(), None).await?;
        debug!("Message listener injected");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::{Value, json};

    use crate::transport::mock::MockBrowser;

    #[test]
    fn test_scripts_carry_markers_and_guards() {
        let click = click_listener_script();
        assert!(click.contains("'[DEVLOG_CLICK]'"));
        assert!(click.contains("window.__devlog_click_listener__ = true"));
        assert!(click.contains("}, true);"));

        let message = message_listener_script();
        assert!(message.contains("'[DEVLOG_MESSAGE]', e.origin, dataStr"));
        assert!(message.contains("if (window.__devlog_message_listener__) return;"));
    }

    #[tokio::test]
    async fn test_domain_helpers_track_state() {
        let mock = MockBrowser::serve(|peer| peer.answer_all(|_, _| json!({}))).await;

        let session = Session::new();
        session.connect(&mock.target()).await.expect("connect");

        session.enable_logging().await.expect("logging");
        session.enable_network().await.expect("network");
        session.enable_page().await.expect("page");
        assert_eq!(session.enabled_domains(), ["Log", "Network", "Page", "Runtime"]);

        session.disable_logging().await.expect("disable logging");
        session.disable_network().await.expect("disable network");
        assert_eq!(session.enabled_domains(), ["Page"]);

        session.disconnect().await;
        assert!(session.enabled_domains().is_empty());
        mock.finish().await;
    }

    #[tokio::test]
    async fn test_inject_listeners_evaluate_in_main_world() {
        let mock = MockBrowser::serve(|mut peer| async move {
            let mut expressions = Vec::new();
            for _ in 0..2 {
                let request = peer.next_request().await.expect("request");
                assert_eq!(request["method"], "Runtime.evaluate");
                assert!(request["params"].get("contextId").is_none());
                expressions.push(request["params"]["expression"].clone());

                let id = request["id"].as_u64().expect("id");
                peer.reply(id, json!({ "result": { "type": "undefined" } })).await;
            }

            assert!(
                expressions[0]
                    .as_str()
                    .is_some_and(|s| s.contains("addEventListener('click'"))
            );
            assert!(
                expressions[1]
                    .as_str()
                    .is_some_and(|s| s.contains("addEventListener('message'"))
            );
            peer.wait_closed().await;
        })
        .await;

        let session = Session::new();
        session.connect(&mock.target()).await.expect("connect");

        session.inject_click_listener().await.expect("click");
        session.inject_message_listener().await.expect("message");

        session.disconnect().await;
        mock.finish().await;
    }

    #[tokio::test]
    async fn test_inject_surfaces_script_errors() {
        let mock = MockBrowser::serve(|peer| {
            peer.answer_all(|_, _| {
                json!({
                    "result": { "type": "object", "subtype": "error" },
                    "exceptionDetails": { "text": "Uncaught", "exception": Value::Null }
                })
            })
        })
        .await;

        let session = Session::new();
        session.connect(&mock.target()).await.expect("connect");

        let err = session.inject_click_listener().await.expect_err("script error");
        assert_eq!(err.to_string(), "Script error: Uncaught");

        session.disconnect().await;
        mock.finish().await;
    }
}
