//! Type-safe identifiers for protocol entities.
//!
//! Newtype wrappers keep command sequence numbers, target IDs, frame IDs and
//! network request IDs from being mixed up at compile time.
//!
//! | Type | Wire form | Source |
//! |------|-----------|--------|
//! | [`RequestId`] | integer | Allocated locally per command |
//! | [`TargetId`] | string | `/json/list` entries |
//! | [`FrameId`] | string | `Page` domain |
//! | [`NetworkRequestId`] | string | `Network` domain |
//! | [`ExecutionContextId`] | integer | `Runtime` domain |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// ============================================================================
// RequestId
// ============================================================================

/// Sequence number correlating a command with its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    /// Wraps a raw sequence number.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw sequence number.
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic allocator for [`RequestId`]s, starting at 1.
#[derive(Debug)]
pub(crate) struct RequestIdSequence(AtomicU64);

impl RequestIdSequence {
    pub(crate) const fn new() -> Self {
        Self(AtomicU64::new(1))
    }

    /// Returns the next unused ID.
    pub(crate) fn next(&self) -> RequestId {
        RequestId(self.0.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for RequestIdSequence {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// String Identifiers
// ============================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw identifier.
            #[inline]
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns `true` if the identifier is empty.
            #[inline]
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Identifier of a debuggable target (tab, iframe, worker).
    TargetId
);

string_id!(
    /// Identifier of a frame within a page.
    FrameId
);

string_id!(
    /// Identifier the `Network` domain assigns to a request lifecycle.
    ///
    /// Redirects reuse the identifier of the request they replace.
    NetworkRequestId
);

// ============================================================================
// ExecutionContextId
// ============================================================================

/// Identifier of a JavaScript execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionContextId(i64);

impl ExecutionContextId {
    /// Wraps a raw context ID.
    #[inline]
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw context ID.
    #[inline]
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ExecutionContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic_from_one() {
        let seq = RequestIdSequence::new();
        assert_eq!(seq.next(), RequestId::new(1));
        assert_eq!(seq.next(), RequestId::new(2));
        assert_eq!(seq.next().as_u64(), 3);
    }

    #[test]
    fn test_request_id_serializes_as_integer() {
        let json = serde_json::to_string(&RequestId::new(42)).expect("serialize");
        assert_eq!(json, "42");
    }

    #[test]
    fn test_string_ids_are_transparent() {
        let id = FrameId::new("F1");
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "\"F1\"");
        assert_eq!(id.to_string(), "F1");

        let parsed: NetworkRequestId = serde_json::from_str("\"1000.1\"").expect("parse");
        assert_eq!(parsed.as_str(), "1000.1");
        assert!(TargetId::default().is_empty());
    }
}
