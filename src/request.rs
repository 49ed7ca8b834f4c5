//! Inbound request validation.
//!
//! The body is parsed into a generic JSON value first and then checked field
//! by field, so every malformed shape maps to a [`RelayError::BadRequest`]
//! with a caller-friendly message rather than a serde error.

use serde_json::{Map, Value};

use crate::error::RelayError;

const NOT_AN_OBJECT: &str =
    r#"Send JSON body like {"message":"...","previous_response_id":"..."}"#;
const BAD_MESSAGE: &str = "Field 'message' is required and must be a non-empty string.";
const BAD_PREVIOUS_ID: &str = "Field 'previous_response_id' must be a string if provided.";

/// A validated caller turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    /// Non-blank, kept verbatim.
    pub message: String,
    /// Continuation token from a previous reply. Never inspected.
    pub previous_response_id: Option<String>,
}

impl ChatRequest {
    /// Build a request from parts, applying the same message check as bodies.
    pub fn new(
        message: impl Into<String>,
        previous_response_id: Option<String>,
    ) -> Result<Self, RelayError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(RelayError::BadRequest(BAD_MESSAGE.to_string()));
        }
        Ok(Self {
            message,
            previous_response_id,
        })
    }

    /// Validate a raw request body.
    pub fn from_body(body: &[u8]) -> Result<Self, RelayError> {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => Self::from_object(map),
            _ => Err(RelayError::BadRequest(NOT_AN_OBJECT.to_string())),
        }
    }

    /// Validate an already-parsed JSON object.
    pub fn from_object(mut map: Map<String, Value>) -> Result<Self, RelayError> {
        let message = match map.remove("message") {
            Some(Value::String(s)) => s,
            _ => return Err(RelayError::BadRequest(BAD_MESSAGE.to_string())),
        };

        let previous_response_id = match map.remove("previous_response_id") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(_) => return Err(RelayError::BadRequest(BAD_PREVIOUS_ID.to_string())),
        };

        Self::new(message, previous_response_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bad_request(body: &str) -> String {
        match ChatRequest::from_body(body.as_bytes()) {
            Err(RelayError::BadRequest(msg)) => msg,
            other => panic!("expected BadRequest for {body:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_message_only() {
        let req = ChatRequest::from_body(br#"{"message":"hello"}"#).unwrap();
        assert_eq!(req.message, "hello");
        assert_eq!(req.previous_response_id, None);
    }

    #[test]
    fn test_message_kept_verbatim() {
        let req = ChatRequest::from_body(br#"{"message":"  spaced \"quoted\"\n"}"#).unwrap();
        assert_eq!(req.message, "  spaced \"quoted\"\n");
    }

    #[test]
    fn test_previous_id_string_and_null() {
        let req =
            ChatRequest::from_body(br#"{"message":"hi","previous_response_id":"resp_9"}"#)
                .unwrap();
        assert_eq!(req.previous_response_id.as_deref(), Some("resp_9"));

        let req =
            ChatRequest::from_body(br#"{"message":"hi","previous_response_id":null}"#).unwrap();
        assert_eq!(req.previous_response_id, None);
    }

    #[test]
    fn test_non_object_bodies_rejected() {
        for body in ["[]", r#""hello""#, "42", "null", "", "{not json"] {
            assert_eq!(bad_request(body), NOT_AN_OBJECT);
        }
    }

    #[test]
    fn test_bad_message_rejected() {
        for body in [
            "{}",
            r#"{"message":""}"#,
            r#"{"message":"   \t\n"}"#,
            r#"{"message":42}"#,
            r#"{"message":null}"#,
            r#"{"message":["a"]}"#,
        ] {
            assert_eq!(bad_request(body), BAD_MESSAGE);
        }
    }

    #[test]
    fn test_bad_previous_id_rejected() {
        for body in [
            r#"{"message":"hi","previous_response_id":7}"#,
            r#"{"message":"hi","previous_response_id":{"id":"x"}}"#,
            r#"{"message":"hi","previous_response_id":false}"#,
        ] {
            assert_eq!(bad_request(body), BAD_PREVIOUS_ID);
        }
    }

    #[test]
    fn test_new_rejects_blank_message() {
        assert!(matches!(
            ChatRequest::new(" ", None),
            Err(RelayError::BadRequest(_))
        ));
        assert_eq!(
            ChatRequest::new("hi", Some("resp_1".into())).unwrap(),
            ChatRequest {
                message: "hi".into(),
                previous_response_id: Some("resp_1".into()),
            }
        );
    }

    #[test]
    fn test_extra_fields_ignored() {
        let req = ChatRequest::from_body(br#"{"message":"hi","user":"bob"}"#).unwrap();
        assert_eq!(req.message, "hi");
    }
}
