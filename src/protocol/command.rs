//! Command definitions organized by domain.
//!
//! Only the commands the capture core issues are modelled; anything else goes
//! through [`Session::invoke`](crate::Session::invoke) with raw params.
//!
//! # Command Domains
//!
//! | Domain | Commands |
//! |--------|----------|
//! | `Runtime` | `enable`, `disable`, `evaluate` |
//! | `Log` | `enable`, `disable` |
//! | `Network` | `enable`, `disable` |
//! | `Page` | `enable`, `getFrameTree`, `createIsolatedWorld` |

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::{ExecutionContextId, FrameId};

// ============================================================================
// Command Wrapper
// ============================================================================

/// All typed protocol commands organized by domain.
///
/// This enum wraps domain-specific command enums for unified serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Command {
    /// Runtime domain commands.
    Runtime(RuntimeCommand),
    /// Log domain commands.
    Log(LogCommand),
    /// Network domain commands.
    Network(NetworkCommand),
    /// Page domain commands.
    Page(PageCommand),
}

impl Command {
    /// Splits the command into its method name and params.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if params cannot be serialized.
    pub fn into_parts(self) -> Result<(String, Option<Value>)> {
        let mut value = serde_json::to_value(&self)?;

        let method = value
            .get("method")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::invalid_response("Command serialized without method"))?;
        let params = value.get_mut("params").map(Value::take);

        Ok((method, params))
    }
}

// ============================================================================
// Runtime Commands
// ============================================================================

/// Runtime domain commands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum RuntimeCommand {
    /// Start reporting console calls, exceptions and execution contexts.
    #[serde(rename = "Runtime.enable")]
    Enable,

    /// Stop reporting runtime events.
    #[serde(rename = "Runtime.disable")]
    Disable,

    /// Evaluate an expression.
    #[serde(rename = "Runtime.evaluate")]
    Evaluate {
        /// JavaScript source.
        expression: String,
        /// Context to evaluate in (main world when absent).
        #[serde(rename = "contextId", skip_serializing_if = "Option::is_none")]
        context_id: Option<ExecutionContextId>,
        /// Return the result serialized by value.
        #[serde(rename = "returnByValue")]
        return_by_value: bool,
        /// Await the result if it is a promise.
        #[serde(rename = "awaitPromise")]
        await_promise: bool,
    },
}

impl RuntimeCommand {
    /// Creates an evaluate command returning by value and awaiting promises.
    #[inline]
    #[must_use]
    pub fn evaluate(expression: impl Into<String>, context_id: Option<ExecutionContextId>) -> Self {
        Self::Evaluate {
            expression: expression.into(),
            context_id,
            return_by_value: true,
            await_promise: true,
        }
    }
}

// ============================================================================
// Log Commands
// ============================================================================

/// Log domain commands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum LogCommand {
    /// Start reporting browser log entries.
    #[serde(rename = "Log.enable")]
    Enable,

    /// Stop reporting browser log entries.
    #[serde(rename = "Log.disable")]
    Disable,
}

// ============================================================================
// Network Commands
// ============================================================================

/// Network domain commands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum NetworkCommand {
    /// Start reporting request lifecycle events.
    #[serde(rename = "Network.enable")]
    Enable,

    /// Stop reporting request lifecycle events.
    #[serde(rename = "Network.disable")]
    Disable,
}

// ============================================================================
// Page Commands
// ============================================================================

/// Page domain commands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum PageCommand {
    /// Start reporting frame events.
    #[serde(rename = "Page.enable")]
    Enable,

    /// Fetch the frame tree of the page.
    #[serde(rename = "Page.getFrameTree")]
    GetFrameTree,

    /// Create an isolated world scoped to a frame.
    #[serde(rename = "Page.createIsolatedWorld")]
    CreateIsolatedWorld {
        /// Frame to scope the world to.
        #[serde(rename = "frameId")]
        frame_id: FrameId,
        /// Optional world name shown in DevTools.
        #[serde(rename = "worldName", skip_serializing_if = "Option::is_none")]
        world_name: Option<String>,
        /// Grant universal access (the parameter name is misspelled upstream).
        #[serde(rename = "grantUniveralAccess")]
        grant_universal_access: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unit_command_has_no_params() {
        let (method, params) = Command::Runtime(RuntimeCommand::Enable)
            .into_parts()
            .expect("parts");
        assert_eq!(method, "Runtime.enable");
        assert!(params.is_none());

        let (method, _) = Command::Log(LogCommand::Disable).into_parts().expect("parts");
        assert_eq!(method, "Log.disable");
    }

    #[test]
    fn test_evaluate_params() {
        let command = Command::Runtime(RuntimeCommand::evaluate(
            "document.title",
            Some(ExecutionContextId::new(7)),
        ));
        let (method, params) = command.into_parts().expect("parts");

        assert_eq!(method, "Runtime.evaluate");
        assert_eq!(
            params,
            Some(json!({
                "expression": "document.title",
                "contextId": 7,
                "returnByValue": true,
                "awaitPromise": true
            }))
        );
    }

    #[test]
    fn test_evaluate_without_context_omits_it() {
        let (_, params) = Command::Runtime(RuntimeCommand::evaluate("1", None))
            .into_parts()
            .expect("parts");
        let params = params.expect("params");
        assert!(params.get("contextId").is_none());
    }

    #[test]
    fn test_create_isolated_world_params() {
        let command = Command::Page(PageCommand::CreateIsolatedWorld {
            frame_id: FrameId::new("F2"),
            world_name: None,
            grant_universal_access: true,
        });
        let (method, params) = command.into_parts().expect("parts");

        assert_eq!(method, "Page.createIsolatedWorld");
        assert_eq!(
            params,
            Some(json!({ "frameId": "F2", "grantUniveralAccess": true }))
        );
    }
}
