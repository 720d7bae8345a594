//! Debuggable targets and selectors.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identifiers::TargetId;

// ============================================================================
// TargetType
// ============================================================================

/// Kind of a debuggable target.
///
/// Unrecognized kinds are preserved in [`TargetType::Other`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TargetType {
    /// A top-level tab.
    #[default]
    Page,
    /// An out-of-process iframe.
    Iframe,
    /// A dedicated worker.
    Worker,
    /// A service worker.
    ServiceWorker,
    /// A shared worker.
    SharedWorker,
    /// An extension background page.
    BackgroundPage,
    /// The browser itself.
    Browser,
    /// An embedded webview.
    Webview,
    /// Any other kind.
    Other(String),
}

impl TargetType {
    /// Returns the wire name of the kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Page => "page",
            Self::Iframe => "iframe",
            Self::Worker => "worker",
            Self::ServiceWorker => "service_worker",
            Self::SharedWorker => "shared_worker",
            Self::BackgroundPage => "background_page",
            Self::Browser => "browser",
            Self::Webview => "webview",
            Self::Other(other) => other,
        }
    }

    /// Returns `true` for top-level tabs.
    #[inline]
    #[must_use]
    pub fn is_page(&self) -> bool {
        matches!(self, Self::Page)
    }
}

impl From<String> for TargetType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "page" => Self::Page,
            "iframe" => Self::Iframe,
            "worker" => Self::Worker,
            "service_worker" => Self::ServiceWorker,
            "shared_worker" => Self::SharedWorker,
            "background_page" => Self::BackgroundPage,
            "browser" => Self::Browser,
            "webview" => Self::Webview,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for TargetType {
    #[inline]
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<TargetType> for String {
    fn from(value: TargetType) -> Self {
        match value {
            TargetType::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Target
// ============================================================================

/// A debuggable target as listed by `/json/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Target ID.
    pub id: TargetId,

    /// Page title.
    #[serde(default)]
    pub title: String,

    /// Current URL.
    #[serde(default)]
    pub url: String,

    /// Target kind.
    #[serde(rename = "type", default)]
    pub target_type: TargetType,

    /// WebSocket URL for a debugging session. Absent when another client is attached.
    #[serde(
        rename = "webSocketDebuggerUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub websocket_url: Option<String>,
}

impl Target {
    /// Returns `true` if this is a top-level tab.
    #[inline]
    #[must_use]
    pub fn is_page(&self) -> bool {
        self.target_type.is_page()
    }

    /// Returns `true` if a session can be opened to this target.
    #[inline]
    #[must_use]
    pub fn is_connectable(&self) -> bool {
        self.websocket_url.as_deref().is_some_and(|url| !url.is_empty())
    }

    /// Returns the identity attached to captured events.
    #[must_use]
    pub fn to_target_info(&self) -> TargetInfo {
        TargetInfo {
            id: self.id.to_string(),
            title: self.title.clone(),
            url: self.url.clone(),
        }
    }
}

// ============================================================================
// TargetInfo
// ============================================================================

/// Identity of the target an event came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetInfo {
    /// Target ID.
    pub id: String,
    /// Title when the session was opened.
    pub title: String,
    /// URL when the session was opened.
    pub url: String,
}

// ============================================================================
// TargetSelector
// ============================================================================

/// How to pick one target out of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TargetSelector {
    /// Exact target ID, any kind.
    Id(TargetId),
    /// First page whose URL contains the text.
    UrlContains(String),
    /// First page whose title contains the text.
    TitleContains(String),
    /// First page, else first target of any kind.
    #[default]
    FirstPage,
}

impl TargetSelector {
    /// Builds a selector from optional query fields.
    ///
    /// Precedence is id, then url, then title. Empty strings are ignored.
    #[must_use]
    pub fn from_query(id: Option<&str>, url: Option<&str>, title: Option<&str>) -> Self {
        let present = |value: Option<&str>| value.filter(|s| !s.is_empty()).map(str::to_string);

        if let Some(id) = present(id) {
            Self::Id(TargetId::new(id))
        } else if let Some(url) = present(url) {
            Self::UrlContains(url)
        } else if let Some(title) = present(title) {
            Self::TitleContains(title)
        } else {
            Self::FirstPage
        }
    }
}

impl fmt::Display for TargetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id '{id}'"),
            Self::UrlContains(url) => write!(f, "url contains '{url}'"),
            Self::TitleContains(title) => write!(f, "title contains '{title}'"),
            Self::FirstPage => f.write_str("first page"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_target_defaults() {
        let target: Target = serde_json::from_value(json!({ "id": "A" })).expect("parse");

        assert_eq!(target.id.as_str(), "A");
        assert_eq!(target.target_type, TargetType::Page);
        assert!(target.title.is_empty());
        assert!(!target.is_connectable());
    }

    #[test]
    fn test_target_type_round_trip() {
        let target: Target = serde_json::from_value(json!({
            "id": "W",
            "type": "service_worker",
            "webSocketDebuggerUrl": "ws://127.0.0.1:9222/devtools/page/W"
        }))
        .expect("parse");

        assert_eq!(target.target_type, TargetType::ServiceWorker);
        assert!(target.is_connectable());

        let value = serde_json::to_value(&target).expect("serialize");
        assert_eq!(value["type"], "service_worker");
    }

    #[test]
    fn test_unknown_target_type_preserved() {
        let kind = TargetType::from("auction_worklet");
        assert_eq!(kind, TargetType::Other("auction_worklet".to_string()));
        assert_eq!(kind.to_string(), "auction_worklet");
    }

    #[test]
    fn test_to_target_info() {
        let target = Target {
            id: TargetId::new("T1"),
            title: "Shop".to_string(),
            url: "https://shop.test/".to_string(),
            target_type: TargetType::Page,
            websocket_url: None,
        };

        let info = target.to_target_info();
        assert_eq!(info.id, "T1");
        assert_eq!(info.title, "Shop");
        assert_eq!(info.url, "https://shop.test/");
    }

    #[test]
    fn test_selector_from_query_precedence() {
        assert_eq!(
            TargetSelector::from_query(Some("X"), Some("foo"), Some("bar")),
            TargetSelector::Id(TargetId::new("X"))
        );
        assert_eq!(
            TargetSelector::from_query(None, Some("foo"), Some("bar")),
            TargetSelector::UrlContains("foo".to_string())
        );
        assert_eq!(
            TargetSelector::from_query(Some(""), None, Some("bar")),
            TargetSelector::TitleContains("bar".to_string())
        );
        assert_eq!(
            TargetSelector::from_query(None, None, None),
            TargetSelector::FirstPage
        );
    }
}
