//! Grading model
//!
//! Builds the deterministic grading prompt, calls the chat endpoint with
//! JSON-constrained decoding, and retries once without the constraint when
//! the server rejects the request. The text payload goes through
//! `grader_core::validate` before anything downstream sees it.

use async_trait::async_trait;

use grader_core::pipeline::Grader;
use grader_core::validate::validate;
use grader_core::{GraderError, GradingRecord};

use crate::openai::{ChatClient, ChatMessage, ChatRequest, ResponseFormat};

const SYSTEM_PROMPT: &str = "You are a grading engine that outputs strict JSON only.";
const MAX_TOKENS: u32 = 800;

/// Scores student answers via the chat endpoint.
pub struct GradingModel {
    client: ChatClient,
    model: String,
    temperature: f64,
}

impl GradingModel {
    pub fn new(client: ChatClient, model: String) -> Self {
        Self {
            client,
            model,
            temperature: 0.0,
        }
    }

    fn request(&self, prompt: &str, constrained: bool) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)],
            temperature: self.temperature,
            max_tokens: MAX_TOKENS,
            response_format: constrained.then(ResponseFormat::json_object),
        }
    }
}

/// Deterministic instruction prompt for one question.
pub fn build_prompt(question: &str, answer_key: &str, student_text: &str, max_score: f64) -> String {
    format!(
        r#"You are an automated grading system.
Grade the student's answer STRICTLY based on the answer key.
Do NOT use outside knowledge.

QUESTION:
{question}

ANSWER KEY:
{answer_key}

STUDENT ANSWER:
{student_text}

RULES:
- Score from 0 to {max_score}.
- Correctness levels: correct, partially_correct, incorrect.
- Match meaning, not wording.
- Return STRICT JSON only.

JSON FORMAT:
{{
  "score": <float>,
  "max_score": <float>,
  "correctness": "correct | partially_correct | incorrect",
  "matched_points": [...],
  "missing_points": [...],
  "feedback": "short constructive suggestion"
}}"#
    )
}

#[async_trait]
impl Grader for GradingModel {
    async fn grade(
        &self,
        question: &str,
        answer_key: &str,
        student_text: &str,
        max_score: f64,
    ) -> Result<GradingRecord, GraderError> {
        let prompt = build_prompt(question, answer_key, student_text, max_score);

        // First attempt asks for JSON-constrained decoding; some servers
        // reject the response_format field outright, so any request-level
        // failure triggers one retry with identical messages and sampling.
        let response = match self.client.chat(&self.request(&prompt, true)).await {
            Ok(response) => response,
            Err(first) => {
                tracing::debug!(error = %first,
                    "constrained request failed; retrying without response_format");
                self.client
                    .chat(&self.request(&prompt, false))
                    .await
                    .map_err(|second| {
                        GraderError::GradingUnavailable(format!(
                            "both attempts failed: {first}; retry: {second}"
                        ))
                    })?
            }
        };

        let content = response.text().ok_or_else(|| {
            GraderError::GradingUnavailable("response carried no text payload".to_string())
        })?;

        validate(content, max_score)
    }
}
