//! LLM bridge for the grading endpoint
//!
//! Talks to an OpenAI-compatible chat-completion server (llama.cpp, vLLM,
//! or the hosted APIs) and implements the `grader_core` collaborator
//! traits: [`GradingModel`] scores answers against the reference key,
//! [`CorrectionModel`] cleans up OCR text.

pub mod correct;
pub mod grading;
pub mod openai;

pub use correct::CorrectionModel;
pub use grading::GradingModel;
pub use openai::{ApiConfig, ChatClient};
