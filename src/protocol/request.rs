//! Request and Response message types.
//!
//! Defines the wire format for commands sent to a target and the replies the
//! target sends back.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::identifiers::RequestId;

// ============================================================================
// Request
// ============================================================================

/// A command request from local end to the target.
///
/// # Format
///
/// ```json
/// { "id": 1, "method": "Domain.method", "params": { ... } }
/// ```
///
/// `params` is omitted when the command takes none.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    /// Sequence number for request/response correlation.
    pub id: RequestId,

    /// CDP method in `Domain.method` format.
    pub method: String,

    /// Command parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Request {
    /// Creates a new request.
    #[inline]
    #[must_use]
    pub fn new(id: RequestId, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            id,
            method: method.into(),
            params,
        }
    }
}

// ============================================================================
// Response
// ============================================================================

/// A command reply from the target.
///
/// # Format
///
/// Success:
/// ```json
/// { "id": 1, "result": { ... } }
/// ```
///
/// Error:
/// ```json
/// { "id": 1, "error": { "code": -32601, "message": "..." } }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    /// Matches the request `id`.
    pub id: RequestId,

    /// Result payload (if success).
    #[serde(default)]
    pub result: Option<Value>,

    /// Error payload (if error).
    #[serde(default)]
    pub error: Option<ResponseError>,
}

/// Error payload of a failed command.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResponseError {
    /// Remote error code.
    #[serde(default = "default_error_code")]
    pub code: i64,

    /// Remote error message.
    #[serde(default)]
    pub message: String,

    /// Optional extra detail.
    #[serde(default)]
    pub data: Option<Value>,
}

fn default_error_code() -> i64 {
    -1
}

impl Response {
    /// Returns `true` if this is an error reply.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Extracts the result payload, failing on error replies.
    ///
    /// A success reply without `result` yields an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] carrying the remote code and message.
    pub fn into_result(self) -> Result<Value> {
        match self.error {
            Some(error) => Err(Error::protocol(error.code, error.message)),
            None => Ok(self.result.unwrap_or_else(|| Value::Object(Map::new()))),
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
    fn test_request_serialization_omits_missing_params() {
        let request = Request::new(RequestId::new(1), "Runtime.enable", None);
        let json = serde_json::to_string(&request).expect("serialize");
        assert_eq!(json, r#"{"id":1,"method":"Runtime.enable"}"#);
    }

    #[test]
    fn test_request_serialization_with_params() {
        let request = Request::new(
            RequestId::new(3),
            "Runtime.evaluate",
            Some(json!({ "expression": "1 + 1" })),
        );
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["id"], 3);
        assert_eq!(value["params"]["expression"], "1 + 1");
    }

    #[test]
    fn test_success_response() {
        let response: Response =
            serde_json::from_str(r#"{"id": 2, "result": {"frameTree": {}}}"#).expect("parse");
        assert!(!response.is_error());
        let result = response.into_result().expect("success");
        assert!(result.get("frameTree").is_some());
    }

    #[test]
    fn test_success_response_without_result_is_empty_object() {
        let response: Response = serde_json::from_str(r#"{"id": 2}"#).expect("parse");
        assert_eq!(response.into_result().expect("success"), json!({}));
    }

    #[test]
    fn test_error_response() {
        let response: Response = serde_json::from_str(
            r#"{"id": 5, "error": {"code": -32601, "message": "'Foo.bar' wasn't found"}}"#,
        )
        .expect("parse");
        assert!(response.is_error());

        match response.into_result() {
            Err(Error::Protocol { code, message }) => {
                assert_eq!(code, -32601);
                assert_eq!(message, "'Foo.bar' wasn't found");
            }
            other => panic!("expected protocol error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_response_defaults() {
        let response: Response =
            serde_json::from_str(r#"{"id": 5, "error": {}}"#).expect("parse");
        let err = response.into_result().expect_err("error reply");
        assert_eq!(err.protocol_code(), Some(-1));
    }
}
