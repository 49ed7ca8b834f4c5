//! Assistant text extraction from Responses API replies.
//!
//! The reply schema is loosely documented and shifts between API versions,
//! so [`ResponsesReply`] is a tolerant typed view: every field is optional,
//! items or content blocks that do not fit the expected shape are dropped
//! one by one, and decoding the view never fails.
//!
//! Precedence used by [`extract_text`]:
//!
//! 1. a non-empty top-level `output_text` string;
//! 2. otherwise the `text` of each `output_text` block inside each
//!    `message` item of `output`, joined with `\n` in order;
//! 3. otherwise `None`.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// The parts of a Responses API reply the relay reads.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct ResponsesReply {
    /// Continuation token for the next turn.
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    /// Pre-aggregated text some API versions include.
    #[serde(default, deserialize_with = "lenient")]
    pub output_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    Message {
        #[serde(default, deserialize_with = "lenient_seq")]
        content: Vec<ContentBlock>,
    },
    /// `file_search_call`, `reasoning`, and anything newer.
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    OutputText { text: String },
    #[serde(other)]
    Other,
}

impl ResponsesReply {
    /// Build the view from a reply object, consuming it.
    ///
    /// Never fails: every field is lenient, so only a non-object could be
    /// rejected and the signature rules that out.
    pub fn from_map(map: Map<String, Value>) -> Self {
        serde_json::from_value(Value::Object(map)).unwrap_or_default()
    }
}

/// Decode `T`, or `None` if the value has any other shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Decode an array, dropping elements that do not decode as `T`.
/// Anything that is not an array becomes an empty list.
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Pull the assistant's answer out of a reply.
///
/// `None` is a valid outcome (e.g. the model only called tools) and is
/// surfaced to the caller as `"text": null`.
pub fn extract_text(reply: &ResponsesReply) -> Option<String> {
    if let Some(text) = reply.output_text.as_deref().filter(|t| !t.is_empty()) {
        return Some(text.to_string());
    }

    let texts: Vec<&str> = reply
        .output
        .iter()
        .filter_map(|item| match item {
            OutputItem::Message { content } => Some(content),
            OutputItem::Other => None,
        })
        .flatten()
        .filter_map(|block| match block {
            ContentBlock::OutputText { text } => Some(text.as_str()),
            ContentBlock::Other => None,
        })
        .collect();

    if texts.is_empty() {
        None
    } else {
        Some(texts.join("\n"))
    }
}

/// Return the trimmed body of the first `<answer>...</answer>` pair, or the
/// whole text when there is no complete pair.
pub fn unwrap_answer_tag(text: &str) -> &str {
    const OPEN: &str = "<answer>";
    const CLOSE: &str = "</answer>";

    let Some(start) = text.find(OPEN).map(|i| i + OPEN.len()) else {
        return text;
    };
    match text[start..].find(CLOSE) {
        Some(len) => text[start..start + len].trim(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply(value: Value) -> ResponsesReply {
        match value {
            Value::Object(map) => ResponsesReply::from_map(map),
            other => panic!("test reply must be an object, got {other}"),
        }
    }

    fn message(texts: &[&str]) -> Value {
        let content: Vec<Value> = texts
            .iter()
            .map(|t| json!({ "type": "output_text", "text": t, "annotations": [] }))
            .collect();
        json!({ "type": "message", "role": "assistant", "content": content })
    }

    #[test]
    fn test_top_level_text_wins() {
        let r = reply(json!({
            "id": "resp_1",
            "output_text": "aggregated",
            "output": [message(&["ignored"])]
        }));
        assert_eq!(extract_text(&r).as_deref(), Some("aggregated"));
        assert_eq!(r.id.as_deref(), Some("resp_1"));
    }

    #[test]
    fn test_empty_top_level_text_falls_through() {
        let r = reply(json!({ "output_text": "", "output": [message(&["from items"])] }));
        assert_eq!(extract_text(&r).as_deref(), Some("from items"));
    }

    #[test]
    fn test_joins_message_items_in_order() {
        let r = reply(json!({ "output": [message(&["A"]), message(&["B"])] }));
        assert_eq!(extract_text(&r).as_deref(), Some("A\nB"));
    }

    #[test]
    fn test_joins_blocks_within_one_item() {
        let r = reply(json!({ "output": [message(&["one", "two"]), message(&["three"])] }));
        assert_eq!(extract_text(&r).as_deref(), Some("one\ntwo\nthree"));
    }

    #[test]
    fn test_skips_tool_calls_and_odd_shapes() {
        let r = reply(json!({
            "id": "resp_2",
            "output": [
                { "type": "file_search_call", "id": "fs_1", "results": [{ "text": "chunk" }] },
                "not an object",
                42,
                { "no_type": true, "content": [{ "type": "output_text", "text": "x" }] },
                { "type": "message", "content": "not a list" },
                { "type": "message" },
                { "type": "message", "content": [
                    { "type": "refusal", "refusal": "no" },
                    { "type": "output_text", "text": 5 },
                    { "type": "output_text" },
                    "str",
                    { "type": "output_text", "text": "kept" }
                ]}
            ]
        }));
        assert_eq!(extract_text(&r).as_deref(), Some("kept"));
        assert_eq!(r.id.as_deref(), Some("resp_2"));
    }

    #[test]
    fn test_nothing_usable_is_none() {
        let r = reply(json!({
            "id": "resp_3",
            "output": [
                { "type": "reasoning", "summary": [] },
                { "type": "message", "content": [{ "type": "output_text", "text": null }] }
            ]
        }));
        assert_eq!(extract_text(&r), None);
    }

    #[test]
    fn test_wrong_typed_top_level_fields_are_ignored() {
        let r = reply(json!({ "id": 17, "output_text": ["a"], "output": { "a": 1 } }));
        assert_eq!(r, ResponsesReply::default());
        assert_eq!(extract_text(&r), None);
    }

    #[test]
    fn test_answer_tag_unwrapped() {
        let text = "<quotes>\n[1] q\n</quotes>\n<answer>\nThe answer [1].\n</answer>";
        assert_eq!(unwrap_answer_tag(text), "The answer [1].");
    }

    #[test]
    fn test_answer_tag_absent_or_unclosed_keeps_text() {
        assert_eq!(unwrap_answer_tag("plain"), "plain");
        assert_eq!(unwrap_answer_tag("<answer> open"), "<answer> open");
    }
}
