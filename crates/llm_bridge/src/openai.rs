//! OpenAI-compatible chat-completion client

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Configuration for the chat endpoint
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the OpenAI-compatible server
    /// (default: http://localhost:2911/v1)
    pub base_url: String,
    /// API key; local servers ignore it but the header must be present
    pub api_key: String,
    /// Per-request timeout in seconds (default: 60)
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:2911/v1".to_string(),
            api_key: "not-needed".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Chat-completion API client
pub struct ChatClient {
    config: ApiConfig,
    client: reqwest::Client,
}

impl ChatClient {
    /// Create a new client with a per-request timeout
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Create a client with default configuration
    pub fn default_client() -> Result<Self> {
        Self::new(ApiConfig::default())
    }

    /// Send a chat-completion request
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("chat endpoint error ({status}): {body}");
        }

        let chat_response: ChatResponse = response.json().await?;
        Ok(chat_response)
    }
}

/// Chat-completion request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
    /// JSON-constrained decoding hint; omitted entirely when `None` so
    /// servers that reject the field never see it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// A chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Response-format hint (`{"type": "json_object"}`)
#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            kind: "json_object".to_string(),
        }
    }
}

/// Chat-completion response body
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

impl ChatResponse {
    /// Text payload of the first choice, if any
    pub fn text(&self) -> Option<&str> {
        self.choices.first()?.message.content.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_config_default() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, "http://localhost:2911/v1");
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_request_serialization_with_format_hint() {
        let request = ChatRequest {
            model: "Llama-3.1-8B-Instruct".to_string(),
            messages: vec![ChatMessage::user("grade this")],
            temperature: 0.0,
            max_tokens: 800,
            response_format: Some(ResponseFormat::json_object()),
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"response_format\":{\"type\":\"json_object\"}"));
        assert!(json.contains("\"max_tokens\":800"));
    }

    #[test]
    fn test_request_serialization_omits_absent_format_hint() {
        let request = ChatRequest {
            model: "Llama-3.1-8B-Instruct".to_string(),
            messages: vec![ChatMessage::user("grade this")],
            temperature: 0.0,
            max_tokens: 800,
            response_format: None,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("response_format"));
    }

    #[test]
    fn test_response_text_extraction() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "{}"}}]}"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text(), Some("{}"));

        let empty: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert_eq!(empty.text(), None);

        let null_content: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap();
        assert_eq!(null_content.text(), None);
    }
}
