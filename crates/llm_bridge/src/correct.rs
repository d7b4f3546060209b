//! Text-correction model
//!
//! Optional post-OCR cleanup pass (spelling, diacritics) over the same chat
//! endpoint. Blank input is returned unchanged without a network call.

use async_trait::async_trait;

use grader_core::pipeline::TextCorrector;

use crate::openai::{ChatClient, ChatMessage, ChatRequest};

const SYSTEM_PROMPT: &str =
    "You correct OCR transcription errors. Output only the corrected text, nothing else.";
const MAX_TOKENS: u32 = 800;

/// Cleans up OCR'd answer text via the chat endpoint.
pub struct CorrectionModel {
    client: ChatClient,
    model: String,
}

impl CorrectionModel {
    pub fn new(client: ChatClient, model: String) -> Self {
        Self { client, model }
    }
}

/// Deterministic correction prompt for one answer span.
pub fn build_prompt(text: &str) -> String {
    format!(
        "Fix OCR mistakes in the text below: misread characters, broken words, \
missing diacritics. Preserve the wording and meaning; do not add or remove \
content. Return only the corrected text.\n\nTEXT:\n{text}"
    )
}

#[async_trait]
impl TextCorrector for CorrectionModel {
    async fn correct(&self, text: &str) -> anyhow::Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(build_prompt(text)),
            ],
            temperature: 0.0,
            max_tokens: MAX_TOKENS,
            response_format: None,
        };

        let response = self.client.chat(&request).await?;
        match response.text() {
            Some(corrected) if !corrected.trim().is_empty() => {
                Ok(corrected.trim().to_string())
            }
            // No usable candidate: keep the input
            _ => Ok(text.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grader_core::pipeline::TextCorrector as _;

    #[test]
    fn test_prompt_embeds_text() {
        let prompt = build_prompt("teh answr");
        assert!(prompt.contains("TEXT:\nteh answr"));
    }

    #[tokio::test]
    async fn test_blank_input_skips_network() {
        // No server is running on this port; blank input must not touch it.
        let model = CorrectionModel::new(
            ChatClient::default_client().unwrap(),
            "any-model".to_string(),
        );
        assert_eq!(model.correct("   ").await.unwrap(), "   ");
        assert_eq!(model.correct("").await.unwrap(), "");
    }
}
