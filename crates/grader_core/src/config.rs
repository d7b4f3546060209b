//! Question set and answer key configuration
//!
//! Both files are read-only JSON objects mapping question ids to text:
//! `questions.json` drives which questions get graded (in file order);
//! `answer_key.json` supplies the reference answers, with missing entries
//! defaulting to an empty reference.

use indexmap::IndexMap;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::GraderError;
use crate::types::QuestionId;

#[derive(Debug, Clone)]
pub struct GradingConfig {
    /// QuestionId -> question text, in file order
    pub questions: IndexMap<QuestionId, String>,
    /// QuestionId -> reference answer text
    pub answer_key: HashMap<QuestionId, String>,
}

impl GradingConfig {
    /// Load `questions.json` and `answer_key.json` from `configs_dir`.
    ///
    /// Fatal on any missing or unparseable file: no partial grading happens
    /// without configuration.
    pub fn load(configs_dir: &Path) -> Result<Self, GraderError> {
        let questions = read_map(&configs_dir.join("questions.json"))?;
        let answer_key: HashMap<QuestionId, String> =
            read_map(&configs_dir.join("answer_key.json"))?
                .into_iter()
                .collect();
        Ok(Self {
            questions,
            answer_key,
        })
    }

    /// Reference answer for a question; empty when the key has no entry.
    pub fn reference_answer(&self, qid: &QuestionId) -> &str {
        self.answer_key.get(qid).map(String::as_str).unwrap_or("")
    }
}

fn read_map(path: &PathBuf) -> Result<IndexMap<QuestionId, String>, GraderError> {
    let body = fs::read_to_string(path).map_err(|e| GraderError::ConfigLoad {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&body).map_err(|e| GraderError::ConfigLoad {
        path: path.clone(),
        reason: e.to_string(),
    })
}
