//! Core types for the grading pipeline

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Identifier of a question on the answer sheet ("1", "2", ...)
///
/// Derived from a detected header token during segmentation, or from the
/// question-set configuration. Non-empty, unique per answer set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub String);

impl QuestionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The identifier every sheet starts under before any header is seen.
impl Default for QuestionId {
    fn default() -> Self {
        Self("1".to_string())
    }
}

impl std::fmt::Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-question answer text, keyed in first-seen order
pub type AnswerMap = IndexMap<QuestionId, String>;

/// The three grading outcomes the model may assign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Correctness {
    Correct,
    PartiallyCorrect,
    Incorrect,
}

impl Correctness {
    /// Parse one of the enumerated wire values
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "correct" => Some(Self::Correct),
            "partially_correct" => Some(Self::PartiallyCorrect),
            "incorrect" => Some(Self::Incorrect),
            _ => None,
        }
    }
}

/// A validated grading result for a single question
///
/// Always the product of [`crate::validate::validate`] or of the
/// orchestrator's degraded-record recovery; never constructed from raw
/// model output directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingRecord {
    /// Points awarded (0.0 when the model omitted the field)
    pub score: f64,
    /// Maximum points for this question
    pub max_score: f64,
    /// Outcome classification
    pub correctness: Correctness,
    /// Answer-key points the student covered
    pub matched_points: Vec<String>,
    /// Answer-key points the student missed
    pub missing_points: Vec<String>,
    /// Free-form feedback (may be empty)
    pub feedback: String,
}

impl GradingRecord {
    /// Zero-score record used when grading a question fails entirely
    pub fn failed(max_score: f64, reason: impl std::fmt::Display) -> Self {
        Self {
            score: 0.0,
            max_score,
            correctness: Correctness::Incorrect,
            matched_points: Vec::new(),
            missing_points: Vec::new(),
            feedback: format!("Grading failed: {reason}"),
        }
    }
}

/// Final report for one pipeline run
///
/// Built once per run, persisted to the results directory, then returned to
/// the caller. Immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingReport {
    pub student_answers: AnswerMap,
    pub grading: IndexMap<QuestionId, GradingRecord>,
    /// Sum of per-question scores, rounded to 2 decimals
    pub total_score: f64,
    /// Sum of per-question max scores, rounded to 2 decimals
    pub max_total_score: f64,
}

/// Recognized text lines from one OCR pass, in reading order
///
/// This is also the schema of the on-disk OCR result cache file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrOutput {
    #[serde(default)]
    pub rec_texts: Vec<String>,
}

/// Round to 2 decimal places, as used for report totals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
