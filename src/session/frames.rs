//! Frame tree, iframe resolution and script evaluation.

// ============================================================================
// Imports
// ============================================================================

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::identifiers::{ExecutionContextId, FrameId};
use crate::protocol::{Command, ExecutionContext, PageCommand, ParsedEvent, RuntimeCommand, fields};

use super::Session;

// ============================================================================
// Frame
// ============================================================================

/// One frame of a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// Frame ID.
    #[serde(default)]
    pub id: FrameId,

    /// Parent frame ID, absent on the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<FrameId>,

    /// Document URL.
    #[serde(default)]
    pub url: String,

    /// Frame name attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Security origin.
    #[serde(default)]
    pub security_origin: String,

    /// Document MIME type.
    #[serde(default)]
    pub mime_type: String,
}

impl Frame {
    /// Returns `true` if this is a top-level frame.
    #[inline]
    #[must_use]
    pub fn is_main_frame(&self) -> bool {
        self.parent_id.is_none()
    }
}

// ============================================================================
// FrameTree
// ============================================================================

/// A frame and its descendants, as returned by `Page.getFrameTree`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameTree {
    /// This frame.
    #[serde(default)]
    pub frame: Frame,

    /// Child subtrees in document order.
    #[serde(default)]
    pub child_frames: Vec<FrameTree>,
}

impl FrameTree {
    /// Returns every non-root frame in depth-first pre-order.
    #[must_use]
    pub fn flatten(&self) -> Vec<&Frame> {
        let mut frames = Vec::new();
        for child in &self.child_frames {
            child.collect_into(&mut frames);
        }
        frames
    }

    /// Finds the first iframe matching `selector`.
    #[must_use]
    pub fn find(&self, selector: &IframeSelector) -> Option<&Frame> {
        let frames = self.flatten();

        match selector {
            IframeSelector::Index(index) => frames.get(*index).copied(),
            IframeSelector::UrlContains(needle) => {
                frames.into_iter().find(|f| f.url.contains(needle.as_str()))
            }
        }
    }

    fn collect_into<'a>(&'a self, frames: &mut Vec<&'a Frame>) {
        frames.push(&self.frame);
        for child in &self.child_frames {
            child.collect_into(frames);
        }
    }
}

// ============================================================================
// IframeSelector
// ============================================================================

/// Selects an iframe of the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IframeSelector {
    /// Position in the depth-first list of non-root frames.
    Index(usize),
    /// First frame whose URL contains the substring.
    UrlContains(String),
}

impl IframeSelector {
    /// Parses a textual selector.
    ///
    /// Text made only of ASCII digits is an index; anything else is a URL
    /// substring.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if !text.is_empty()
            && text.bytes().all(|b| b.is_ascii_digit())
            && let Ok(index) = text.parse()
        {
            return Self::Index(index);
        }
        Self::UrlContains(text.to_string())
    }
}

impl FromStr for IframeSelector {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<usize> for IframeSelector {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for IframeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "iframe #{index}"),
            Self::UrlContains(needle) => write!(f, "iframe with url containing '{needle}'"),
        }
    }
}

// ============================================================================
// Session - Frames
// ============================================================================

impl Session {
    /// Fetches the page's frame tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResponse`] if the reply has no usable tree.
    pub async fn frame_tree(&self) -> Result<FrameTree> {
        let mut result = self.execute(Command::Page(PageCommand::GetFrameTree)).await?;

        let tree = result
            .get_mut("frameTree")
            .map(Value::take)
            .ok_or_else(|| Error::invalid_response("Page.getFrameTree reply has no frameTree"))?;

        serde_json::from_value(tree)
            .map_err(|e| Error::invalid_response(format!("Malformed frame tree: {e}")))
    }

    /// Finds an iframe, or `None` if nothing matches.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame tree cannot be fetched.
    pub async fn find_iframe(&self, selector: &IframeSelector) -> Result<Option<Frame>> {
        let tree = self.frame_tree().await?;
        Ok(tree.find(selector).cloned())
    }

    /// Creates an isolated world in an iframe and returns its context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FrameNotFound`] if no iframe matches.
    pub async fn isolated_world(&self, selector: &IframeSelector) -> Result<ExecutionContextId> {
        let frame = self
            .find_iframe(selector)
            .await?
            .ok_or_else(|| Error::frame_not_found(selector.to_string()))?;

        let command = PageCommand::CreateIsolatedWorld {
            frame_id: frame.id.clone(),
            world_name: self.config().world_name.clone(),
            grant_universal_access: true,
        };
        let result = self.execute(Command::Page(command)).await?;

        let context_id = fields::opt_i64(&result, "executionContextId").ok_or_else(|| {
            Error::invalid_response("Page.createIsolatedWorld reply has no executionContextId")
        })?;

        debug!(frame_id = %frame.id, context_id, "Isolated world created");
        Ok(ExecutionContextId::new(context_id))
    }

    /// Evaluates JavaScript and returns the result by value.
    ///
    /// Without a selector the expression runs in the page's main world.
    /// With one, it runs in a fresh isolated world of the matching iframe.
    /// `undefined` results come back as `null`.
    ///
    /// # Errors
    ///
    /// - [`Error::FrameNotFound`] if the selector matches no iframe
    /// - [`Error::ScriptError`] if the expression throws
    pub async fn evaluate(
        &self,
        expression: impl Into<String>,
        iframe: Option<&IframeSelector>,
    ) -> Result<Value> {
        let context_id = match iframe {
            Some(selector) => Some(self.isolated_world(selector).await?),
            None => None,
        };

        let expression = expression.into();
        debug!(
            script_len = expression.len(),
            context_id = context_id.map(|id| id.as_i64()),
            "Evaluating script"
        );

        let mut result = self
            .execute(Command::Runtime(RuntimeCommand::evaluate(expression, context_id)))
            .await?;
        check_exception(&result)?;

        Ok(result
            .get_mut("result")
            .and_then(|r| r.get_mut("value"))
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    /// Collects execution contexts announced during `window`.
    ///
    /// Reads the shared event feed; other events received meanwhile are
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the session is not connected.
    pub async fn execution_contexts(&self, window: Duration) -> Result<Vec<ExecutionContext>> {
        let feed = self.events()?;
        let deadline = tokio::time::Instant::now() + window;
        let mut contexts = Vec::new();

        while let Ok(Some(event)) = tokio::time::timeout_at(deadline, feed.next()).await {
            if let ParsedEvent::ExecutionContextCreated(context) = event.parse() {
                contexts.push(context);
            }
        }

        Ok(contexts)
    }
}

/// Fails if an evaluation reply carries `exceptionDetails`.
fn check_exception(result: &Value) -> Result<()> {
    let Some(details) = result.get("exceptionDetails") else {
        return Ok(());
    };

    let message = details
        .get("exception")
        .and_then(|e| e.get("description"))
        .and_then(Value::as_str)
        .or_else(|| details.get("text").and_then(Value::as_str))
        .unwrap_or("Error");

    Err(Error::script_error(message))
}

// ============================================================================
// Tests
// ============================================================================
