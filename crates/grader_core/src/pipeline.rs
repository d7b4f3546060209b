//! Run orchestrator
//!
//! Sequences one grading run end to end: preprocess image -> OCR (with the
//! filesystem cache) -> segmentation -> optional text correction ->
//! per-question grading -> aggregation -> persistence.
//!
//! Collaborators are injected rather than constructed here so the whole run
//! can be exercised with fakes. Per-question grading failures never abort a
//! run; they become zero-score records whose feedback names the failure.

use async_trait::async_trait;
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::GradingConfig;
use crate::error::GraderError;
use crate::ocr::{OcrCache, OcrEngine};
use crate::preprocess;
use crate::segment::{self, HeaderRule, NumericHeaderRule};
use crate::types::{round2, GradingRecord, GradingReport, OcrOutput};

/// Points per question. Fixed across all questions; changing it is a code
/// change, not configuration.
pub const DEFAULT_MAX_SCORE: f64 = 10.0;

/// Name of the persisted report inside the results directory
const REPORT_FILE: &str = "result.json";

/// Scores one student answer against the reference key.
#[async_trait]
pub trait Grader: Send + Sync {
    async fn grade(
        &self,
        question: &str,
        answer_key: &str,
        student_text: &str,
        max_score: f64,
    ) -> Result<GradingRecord, GraderError>;
}

/// Optional post-OCR text cleanup (spelling/diacritics restoration).
#[async_trait]
pub trait TextCorrector: Send + Sync {
    async fn correct(&self, text: &str) -> anyhow::Result<String>;
}

/// How OCR lines become answer spans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OcrMode {
    /// Partition lines by detected question headers
    #[default]
    Grouped,
    /// Fold all text into a single span under the default question
    Raw,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub ocr_mode: OcrMode,
    pub configs_dir: PathBuf,
    pub results_dir: PathBuf,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            ocr_mode: OcrMode::Grouped,
            configs_dir: PathBuf::from("configs"),
            results_dir: PathBuf::from("results"),
        }
    }
}

/// One-shot grading pipeline over injected collaborators.
///
/// Holds no state across runs; every [`Pipeline::run`] is independent.
pub struct Pipeline<'a> {
    ocr: &'a dyn OcrEngine,
    grader: &'a dyn Grader,
    corrector: Option<&'a dyn TextCorrector>,
    header_rule: &'a dyn HeaderRule,
}

impl<'a> Pipeline<'a> {
    pub fn new(ocr: &'a dyn OcrEngine, grader: &'a dyn Grader) -> Self {
        Self {
            ocr,
            grader,
            corrector: None,
            header_rule: &NumericHeaderRule,
        }
    }

    pub fn with_corrector(mut self, corrector: &'a dyn TextCorrector) -> Self {
        self.corrector = Some(corrector);
        self
    }

    pub fn with_header_rule(mut self, rule: &'a dyn HeaderRule) -> Self {
        self.header_rule = rule;
        self
    }

    /// Grade one answer-sheet image and persist the report.
    ///
    /// Fatal errors (image, config, persistence, live OCR) propagate;
    /// grading failures are folded into degraded records per question.
    pub async fn run(
        &self,
        image_path: &Path,
        options: &PipelineOptions,
    ) -> Result<GradingReport, GraderError> {
        tracing::info!(image = %image_path.display(), "starting grading run");
        let image = preprocess::load_and_preprocess(image_path)?;

        let ocr_output = self.recognize_lines(image_path, &image, &options.results_dir)?;
        tracing::info!(lines = ocr_output.rec_texts.len(), "recognized text lines");

        let mut answers = match options.ocr_mode {
            OcrMode::Grouped => segment::segment(&ocr_output.rec_texts, self.header_rule),
            OcrMode::Raw => segment::flatten(&ocr_output.rec_texts),
        };

        if let Some(corrector) = self.corrector {
            for (qid, text) in answers.iter_mut() {
                if text.trim().is_empty() {
                    continue;
                }
                match corrector.correct(text).await {
                    Ok(corrected) => *text = corrected,
                    Err(e) => {
                        tracing::warn!(question = %qid, error = %e,
                            "text correction failed; keeping OCR text");
                    }
                }
            }
        }

        let config = GradingConfig::load(&options.configs_dir)?;

        let mut grading = IndexMap::new();
        let mut total_score = 0.0;
        let mut max_total_score = 0.0;

        // Iterate the question set, not the answer map: unanswered questions
        // still get graded (against empty text), stray spans are ignored.
        for (qid, question_text) in &config.questions {
            let student_text = answers.get(qid).map(String::as_str).unwrap_or("");
            max_total_score += DEFAULT_MAX_SCORE;

            let record = match self
                .grader
                .grade(
                    question_text,
                    config.reference_answer(qid),
                    student_text,
                    DEFAULT_MAX_SCORE,
                )
                .await
            {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(question = %qid, error = %e,
                        "grading failed; recording zero score");
                    GradingRecord::failed(DEFAULT_MAX_SCORE, e)
                }
            };

            total_score += record.score;
            grading.insert(qid.clone(), record);
        }

        let report = GradingReport {
            student_answers: answers,
            grading,
            total_score: round2(total_score),
            max_total_score: round2(max_total_score),
        };

        let report_path = persist_report(&report, &options.results_dir)?;
        tracing::info!(report = %report_path.display(),
            total = report.total_score, "grading run complete");
        Ok(report)
    }

    /// Two-tier OCR: a saved result file for this image wins over a live
    /// engine call; fresh results are stored for the next run.
    fn recognize_lines(
        &self,
        image_path: &Path,
        image: &image::GrayImage,
        results_dir: &Path,
    ) -> Result<OcrOutput, GraderError> {
        let cache = OcrCache::new(results_dir);
        if let Some(saved) = cache.lookup(image_path) {
            return Ok(saved);
        }
        let fresh = self.ocr.recognize(image).map_err(GraderError::Ocr)?;
        cache.store(image_path, &fresh)?;
        Ok(fresh)
    }
}

fn persist_report(report: &GradingReport, results_dir: &Path) -> Result<PathBuf, GraderError> {
    fs::create_dir_all(results_dir).map_err(|source| GraderError::Io {
        path: results_dir.to_path_buf(),
        source,
    })?;
    let path = results_dir.join(REPORT_FILE);
    let body = serde_json::to_vec_pretty(report).map_err(|e| GraderError::Io {
        path: path.clone(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })?;
    fs::write(&path, body).map_err(|source| GraderError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
