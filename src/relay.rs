//! The chat turn pipeline shared by the HTTP server and the `ask` command.
//!
//! ```text
//! body ──▶ ChatRequest ──▶ ResponsesRequest ──▶ POST /v1/responses
//!                                                      │
//! ChatReply ◀── extract_text ◀── ResponsesReply ◀──────┘
//! ```

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::client::ResponsesClient;
use crate::config::RelaySettings;
use crate::error::RelayError;
use crate::extract::{extract_text, unwrap_answer_tag, ResponsesReply};
use crate::payload::ResponsesRequest;
use crate::request::ChatRequest;

/// What the caller gets back for one turn.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatReply {
    /// Token to send as `previous_response_id` on the next turn.
    pub previous_response_id: Option<String>,
    pub text: Option<String>,
    /// Raw upstream reply, only when `server.include_debug` is on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Value>,
}

/// Resolved settings plus a pooled HTTP client. Cheap to clone.
#[derive(Clone)]
pub struct Relay {
    settings: Arc<RelaySettings>,
    client: ResponsesClient,
}

impl Relay {
    /// Build a relay around resolved settings.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Configuration`] if the HTTP client cannot be
    /// constructed.
    pub fn new(settings: RelaySettings) -> Result<Self, RelayError> {
        let client = ResponsesClient::new(&settings)?;
        Ok(Self {
            settings: Arc::new(settings),
            client,
        })
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    /// Validate a raw body and run it through [`Relay::chat`].
    pub async fn handle_body(&self, body: &[u8]) -> Result<ChatReply, RelayError> {
        let request = ChatRequest::from_body(body)?;
        self.chat(&request).await
    }

    /// Run one validated turn against the completion service.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, RelayError> {
        let payload = ResponsesRequest::build(&self.settings, request);

        tracing::info!(
            model = %payload.model,
            message_chars = request.message.chars().count(),
            continued = payload.previous_response_id.is_some(),
            "relaying chat turn"
        );

        let raw = self.client.create_response(&payload).await?;
        let debug = self.settings.include_debug.then(|| Value::Object(raw.clone()));
        let reply = ResponsesReply::from_map(raw);

        let mut text = extract_text(&reply);
        if self.settings.answer_tag {
            text = text.map(|t| unwrap_answer_tag(&t).to_string());
        }

        tracing::info!(
            response_id = reply.id.as_deref().unwrap_or("-"),
            has_text = text.is_some(),
            "chat turn complete"
        );

        Ok(ChatReply {
            previous_response_id: reply.id,
            text,
            debug,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reply_without_debug_omits_field() {
        let reply = ChatReply {
            previous_response_id: Some("resp_1".into()),
            text: None,
            debug: None,
        };
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({ "previous_response_id": "resp_1", "text": null })
        );
    }

    #[test]
    fn test_reply_with_debug_passes_raw_through() {
        let reply = ChatReply {
            previous_response_id: None,
            text: Some("hi".into()),
            debug: Some(json!({ "id": null, "output": [] })),
        };
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["debug"], json!({ "id": null, "output": [] }));
        assert_eq!(value["previous_response_id"], Value::Null);
    }
}
