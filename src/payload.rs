//! Outbound payload for the OpenAI Responses API.
//!
//! Shape of the body sent to `POST /v1/responses`:
//!
//! ```json
//! {
//!   "model": "gpt-5.2-2025-12-11",
//!   "instructions": "<system prompt>",
//!   "input": [{ "role": "user", "content": "<message>" }],
//!   "tools": [{ "type": "file_search", "vector_store_ids": ["vs_..."] }],
//!   "include": ["file_search_call.results"],
//!   "previous_response_id": "resp_..."
//! }
//! ```
//!
//! `include` and `previous_response_id` are left out entirely when unused.

use serde::Serialize;

use crate::config::RelaySettings;
use crate::request::ChatRequest;

/// `include` entry that makes the API echo retrieved chunks.
pub const FILE_SEARCH_RESULTS: &str = "file_search_call.results";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResponsesRequest {
    pub model: String,
    pub instructions: String,
    pub input: Vec<InputMessage>,
    pub tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InputMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tool {
    FileSearch { vector_store_ids: Vec<String> },
}

impl ResponsesRequest {
    /// Assemble the request body for one turn.
    ///
    /// The message and a non-empty continuation token are forwarded
    /// verbatim. `include` asks for search results only when
    /// `include_search_results` is set.
    pub fn build(settings: &RelaySettings, request: &ChatRequest) -> Self {
        let include = if settings.include_search_results {
            vec![FILE_SEARCH_RESULTS.to_string()]
        } else {
            Vec::new()
        };

        Self {
            model: settings.model.clone(),
            instructions: settings.instructions.clone(),
            input: vec![InputMessage {
                role: "user".to_string(),
                content: request.message.clone(),
            }],
            tools: vec![Tool::FileSearch {
                vector_store_ids: vec![settings.vector_store_id.clone()],
            }],
            include,
            previous_response_id: request
                .previous_response_id
                .clone()
                .filter(|id| !id.is_empty()),
        }
    }
}
