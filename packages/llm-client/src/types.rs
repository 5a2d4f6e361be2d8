//! Wire types for `POST /chat/completions`.

use serde::{Deserialize, Serialize};

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Reply format constraint (`response_format` in the request body).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    /// The reply is a single JSON object.
    JsonObject,
}

/// Request body. Unset knobs are left out so the provider's defaults apply.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model name without the provider prefix, e.g. `deepseek-chat`
    pub model: String,

    pub messages: Vec<Message>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
            response_format: None,
        }
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Ask for a single JSON object reply.
    pub fn json_mode(mut self) -> Self {
        self.response_format = Some(ResponseFormat::JsonObject);
        self
    }
}

/// The first choice of a completion, flattened.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,

    /// `stop`, `length`, ...
    pub finish_reason: Option<String>,

    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// The model hit its output token limit before finishing.
    pub fn is_truncated(&self) -> bool {
        self.finish_reason.as_deref() == Some("length")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Response body as sent by the provider.
#[derive(Debug, Deserialize)]
pub(crate) struct CompletionBody {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: ReplyMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// `content` is null when the model only produced tool calls or was filtered.
#[derive(Debug, Deserialize)]
pub(crate) struct ReplyMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Longest prefix of `s` that fits in `max_bytes` without splitting a character.
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let end = (0..=max_bytes)
        .rev()
        .find(|&i| s.is_char_boundary(i))
        .unwrap_or(0);
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_roles_serialize_lowercase() {
        let value = serde_json::to_value(Message::system("Return JSON")).unwrap();
        assert_eq!(value, json!({"role": "system", "content": "Return JSON"}));
        assert_eq!(Message::user("hi").role, Role::User);
        assert_eq!(Message::assistant("[]").role, Role::Assistant);
    }

    #[test]
    fn test_unset_knobs_are_omitted() {
        let body = serde_json::to_value(ChatRequest::new("deepseek-chat")).unwrap();
        assert!(body.get("temperature").is_none());
        assert!(body.get("max_tokens").is_none());
        assert!(body.get("response_format").is_none());

        let body = serde_json::to_value(
            ChatRequest::new("deepseek-chat")
                .temperature(0.1)
                .max_tokens(4000)
                .json_mode(),
        )
        .unwrap();
        assert_eq!(body["max_tokens"], 4000);
        assert_eq!(body["response_format"], json!({"type": "json_object"}));
    }

    #[test]
    fn test_null_content_parses() {
        let body: CompletionBody = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": null}, "finish_reason": "length"}]
        }))
        .unwrap();
        assert!(body.choices[0].message.content.is_none());
        assert!(body.usage.is_none());
    }

    #[test]
    fn test_truncate_to_char_boundary() {
        // 'ä' spans bytes 12..14
        let text = "Opintojakso ä ö";
        assert_eq!(truncate_to_char_boundary(text, 13), "Opintojakso ");
        assert_eq!(truncate_to_char_boundary(text, 100), text);
    }
}
