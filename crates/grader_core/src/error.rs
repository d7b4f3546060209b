//! Error taxonomy for the grading pipeline
//!
//! Fatal errors (`ImageLoad`, `ConfigLoad`, `Io`) abort the run and reach
//! the CLI boundary unmodified. Per-question errors (`MalformedResponse`,
//! `GradingUnavailable`) are recovered by the orchestrator into degraded
//! zero-score records and never abort the run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraderError {
    /// Source image missing or unreadable
    #[error("could not load image {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The grading endpoint returned a payload that does not satisfy the
    /// grading-record schema
    #[error("malformed grading response: {0}")]
    MalformedResponse(String),

    /// Both request attempts failed, or the response carried no text payload
    #[error("grading endpoint unavailable: {0}")]
    GradingUnavailable(String),

    /// Live text recognition failed
    #[error("text recognition failed: {0}")]
    Ocr(anyhow::Error),

    /// Question set or answer key missing/unparseable
    #[error("could not load configuration {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    /// Filesystem failure writing the OCR cache or the final report
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GraderError {
    /// True for errors the orchestrator folds into a degraded record
    /// instead of aborting the run.
    pub fn is_per_question(&self) -> bool {
        matches!(
            self,
            GraderError::MalformedResponse(_) | GraderError::GradingUnavailable(_)
        )
    }
}
