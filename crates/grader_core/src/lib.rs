//! Core pipeline for essaygrade
//!
//! This crate provides the data structures and processing logic for turning
//! a scanned essay answer sheet into a graded report: image preprocessing,
//! OCR line extraction with a filesystem result cache, answer segmentation
//! by question, grading-result validation, and the run orchestrator.
//!
//! Network access (the grading endpoint) lives behind the [`Grader`] and
//! [`TextCorrector`] traits and is implemented by the `llm_bridge` crate.

pub mod config;
pub mod error;
pub mod ocr;
pub mod pipeline;
pub mod preprocess;
pub mod segment;
pub mod types;
pub mod validate;

pub use error::GraderError;
pub use pipeline::{Grader, OcrMode, Pipeline, PipelineOptions, TextCorrector};
pub use types::*;
