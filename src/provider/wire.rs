//! Request bodies and response decoding for both API dialects.
//!
//! Everything here is pure so the status/body handling can be tested
//! without a socket. [`interpret_response`] is the shared rule for turning a
//! status code plus raw body into either parsed JSON or a [`ProviderError`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ProviderError;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// `POST /api/generate` body for the local dialect.
#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
    /// `0` asks the service to unload the model right after answering.
    pub keep_alive: u32,
}

impl<'a> GenerateRequest<'a> {
    pub fn new(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            prompt,
            stream: false,
            keep_alive: 0,
        }
    }
}

/// One chat message.
#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

/// `POST /v1/chat/completions` body for the OpenAI-compatible dialect.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f32,
}

impl<'a> ChatRequest<'a> {
    /// Single user turn carrying the whole prompt.
    pub fn new(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.7,
        }
    }
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Apply the shared status rule to a finished response.
///
/// * 2xx: the body must parse as JSON, otherwise [`ProviderError::Parse`].
/// * anything else: [`ProviderError::Protocol`] with `error.message`, then
///   `message`, then the bare status code as the message. A body that is not
///   JSON at all yields `"Request Failed. Status Code: <code>"`.
pub fn interpret_response(status: u16, body: &str) -> Result<Value, ProviderError> {
    if (200..300).contains(&status) {
        return serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()));
    }

    match serde_json::from_str::<Value>(body) {
        Ok(value) => Err(ProviderError::Protocol(error_message(&value, status))),
        Err(_) => Err(ProviderError::Protocol(format!(
            "Request Failed. Status Code: {status}"
        ))),
    }
}

fn error_message(value: &Value, status: u16) -> String {
    value
        .pointer("/error/message")
        .and_then(non_empty_str)
        .or_else(|| value.get("message").and_then(non_empty_str))
        .map(str::to_string)
        .unwrap_or_else(|| status.to_string())
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

/// Trimmed `response` field of a local generation reply.
pub fn generate_text(value: Value) -> Result<String, ProviderError> {
    let reply: GenerateResponse =
        serde_json::from_value(value).map_err(|e| ProviderError::Parse(e.to_string()))?;
    Ok(reply.response.trim().to_string())
}

/// Trimmed `choices[0].message.content`.
///
/// An empty `choices` list, a choice without a message and null content all
/// yield an empty string. A body without a `choices` array is not a chat
/// reply at all (some proxies answer 200 with an error object) and is a
/// [`ProviderError::Parse`].
pub fn chat_text(value: Value) -> Result<String, ProviderError> {
    let reply: ChatResponse =
        serde_json::from_value(value).map_err(|e| ProviderError::Parse(e.to_string()))?;
    Ok(reply
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .map(|content| content.trim().to_string())
        .unwrap_or_default())
}

/// Model names from `GET /api/tags`; a missing list is empty.
pub fn tag_names(value: Value) -> Result<Vec<String>, ProviderError> {
    let tags: TagsResponse =
        serde_json::from_value(value).map_err(|e| ProviderError::Parse(e.to_string()))?;
    Ok(tags.models.into_iter().map(|m| m.name).collect())
}

/// Model ids from `GET /v1/models`.
pub fn model_ids(value: Value) -> Result<Vec<String>, ProviderError> {
    let models: ModelsResponse =
        serde_json::from_value(value).map_err(|e| ProviderError::Parse(e.to_string()))?;
    Ok(models.data.into_iter().map(|m| m.id).collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // --- interpret_response -------------------------------------------------

    #[test]
    fn success_status_parses_json() {
        let value = interpret_response(200, r#"{"response":"hi"}"#).unwrap();
        assert_eq!(value["response"], "hi");
    }

    #[test]
    fn success_status_with_garbage_is_parse_error() {
        let err = interpret_response(200, "<html>").unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn nested_error_message_wins() {
        let body = r#"{"error":{"message":"invalid_api_key"},"message":"flat"}"#;
        let err = interpret_response(401, body).unwrap_err();
        match err {
            ProviderError::Protocol(msg) => assert_eq!(msg, "invalid_api_key"),
            other => panic!("expected Protocol, got {other:?}"),
        }
    }

    #[test]
    fn flat_message_used_when_no_nested_error() {
        let err = interpret_response(404, r#"{"message":"model not found"}"#).unwrap_err();
        match err {
            ProviderError::Protocol(msg) => assert_eq!(msg, "model not found"),
            other => panic!("expected Protocol, got {other:?}"),
        }
    }

    #[test]
    fn status_code_used_when_json_has_no_message() {
        let err = interpret_response(500, r#"{"detail":"boom"}"#).unwrap_err();
        match err {
            ProviderError::Protocol(msg) => assert_eq!(msg, "500"),
            other => panic!("expected Protocol, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_error_body_reports_status() {
        let err = interpret_response(502, "Bad Gateway").unwrap_err();
        match err {
            ProviderError::Protocol(msg) => assert_eq!(msg, "Request Failed. Status Code: 502"),
            other => panic!("expected Protocol, got {other:?}"),
        }
    }

    // --- extractors ---------------------------------------------------------

    #[test]
    fn generate_text_is_trimmed() {
        let text = generate_text(json!({ "response": " Bonjour " })).unwrap();
        assert_eq!(text, "Bonjour");
    }

    #[test]
    fn generate_without_response_field_is_parse_error() {
        assert!(matches!(
            generate_text(json!({ "done": true })),
            Err(ProviderError::Parse(_))
        ));
    }

    #[test]
    fn chat_text_reads_first_choice() {
        let value = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "  Hola  " } },
                { "message": { "role": "assistant", "content": "ignored" } }
            ]
        });
        assert_eq!(chat_text(value).unwrap(), "Hola");
    }

    #[test]
    fn chat_text_missing_pieces_are_empty() {
        assert_eq!(chat_text(json!({ "choices": [] })).unwrap(), "");
        assert_eq!(chat_text(json!({ "choices": [{}] })).unwrap(), "");
        assert_eq!(chat_text(json!({ "choices": [{ "message": {} }] })).unwrap(), "");
        assert_eq!(
            chat_text(json!({ "choices": [{ "message": { "content": null } }] })).unwrap(),
            ""
        );
    }

    #[test]
    fn chat_body_without_choices_array_is_parse_error() {
        for body in [
            json!({}),
            json!({ "error": { "message": "quota exceeded" } }),
            json!({ "choices": "garbage" }),
            json!({ "choices": null }),
        ] {
            let result = chat_text(body.clone());
            assert!(matches!(result, Err(ProviderError::Parse(_))), "{body} gave {result:?}");
        }
    }

    #[test]
    fn tag_names_tolerates_missing_list() {
        assert!(tag_names(json!({})).unwrap().is_empty());
        let names = tag_names(json!({ "models": [{ "name": "llama3" }, { "name": "qwen2.5:3b" }] }))
            .unwrap();
        assert_eq!(names, vec!["llama3", "qwen2.5:3b"]);
    }

    #[test]
    fn model_ids_requires_data() {
        assert!(model_ids(json!({})).is_err());
        let ids = model_ids(json!({ "data": [{ "id": "gpt-4o-mini", "object": "model" }] })).unwrap();
        assert_eq!(ids, vec!["gpt-4o-mini"]);
    }

    // --- request bodies -----------------------------------------------------

    #[test]
    fn generate_request_shape() {
        let body = serde_json::to_value(GenerateRequest::new("llama3", "hi")).unwrap();
        assert_eq!(
            body,
            json!({ "model": "llama3", "prompt": "hi", "stream": false, "keep_alive": 0 })
        );
    }

    #[test]
    fn chat_request_shape() {
        let body = serde_json::to_value(ChatRequest::new("gpt-4o-mini", "hi")).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"], json!([{ "role": "user", "content": "hi" }]));
        let temperature = body["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
    }
}
