//! HTTP client for the OpenAI Responses API.
//!
//! One `POST` per chat turn with bearer auth and a JSON body. The timeout is
//! enforced by `reqwest`. There is no retry loop: a failed call
//! fails the chat request.
//!
//! | Outcome | Error |
//! |---------|-------|
//! | connect failure, timeout, body read failure | [`RelayError::Transport`] |
//! | HTTP status >= 400 | [`RelayError::RemoteService`] |
//! | 2xx/3xx body that is not a JSON object | [`RelayError::InvalidResponse`] |
//!
//! Redirects are not followed. A 3xx reply is classified like any other
//! status below 400, so its body has to be the JSON object itself.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::{Map, Value};
use std::time::Instant;

use crate::config::RelaySettings;
use crate::error::RelayError;
use crate::payload::ResponsesRequest;

/// Pooled client bound to one endpoint and API key. Cheap to clone.
#[derive(Clone)]
pub struct ResponsesClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl ResponsesClient {
    /// Build a client from resolved settings.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Configuration`] if `reqwest` cannot build the
    /// client (e.g. the TLS backend fails to initialise).
    pub fn new(settings: &RelaySettings) -> Result<Self, RelayError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| RelayError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
        })
    }

    /// Send `payload` and return the response object as-is.
    pub async fn create_response(
        &self,
        payload: &ResponsesRequest,
    ) -> Result<Map<String, Value>, RelayError> {
        let started = Instant::now();

        let response = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;

        tracing::debug!(
            status = status.as_u16(),
            bytes = raw.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "responses API call finished"
        );

        parse_reply(status.as_u16(), &raw)
    }
}

/// Classify a finished upstream exchange.
fn parse_reply(status: u16, raw: &str) -> Result<Map<String, Value>, RelayError> {
    let parsed = serde_json::from_str::<Value>(raw).ok();

    if status >= 400 {
        // Re-encode parsed JSON compactly; fall back to the raw text.
        let body = match &parsed {
            Some(v @ (Value::Object(_) | Value::Array(_))) => v.to_string(),
            _ => raw.to_string(),
        };
        return Err(RelayError::RemoteService { status, body });
    }

    match parsed {
        Some(Value::Object(map)) => Ok(map),
        _ => Err(RelayError::InvalidResponse(raw.to_string())),
    }
}
