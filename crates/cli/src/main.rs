//! essaygrade CLI
//!
//! Grades a scanned essay answer sheet: OCR -> segmentation by question ->
//! scoring against the answer key via the grading endpoint. Prints the
//! final report as JSON; grading failures inside the run become zero-score
//! records, so only image/config/filesystem problems exit non-zero.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use grader_core::ocr::TesseractOcr;
use grader_core::{OcrMode, Pipeline, PipelineOptions};
use llm_bridge::{ApiConfig, ChatClient, CorrectionModel, GradingModel};

#[derive(Parser)]
#[command(name = "essaygrade")]
#[command(about = "Grade scanned essay answers against an answer key", long_about = None)]
#[command(version, long_version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ", env!("BUILT_TIME_UTC"), " on ", env!("BUILT_HOST"), ")"
))]
struct Cli {
    /// Path to the essay image (jpg/png)
    #[arg(short, long)]
    input: PathBuf,

    /// OCR language: en or vi
    #[arg(long, default_value = "en")]
    ocr_lang: String,

    /// Base URL of the OpenAI-compatible grading endpoint
    #[arg(long, default_value = "http://localhost:2911/v1")]
    api_url: String,

    /// Model name exposed by the grading endpoint
    #[arg(long, default_value = "Llama-3.1-8B-Instruct")]
    model: String,

    /// Group answers by question headers, or keep the raw full text
    #[arg(long, value_enum, default_value_t = OcrModeArg::Grouped)]
    ocr_mode: OcrModeArg,

    /// Optional OCR text-correction pass after recognition
    #[arg(long, value_enum, default_value_t = CorrectorArg::None)]
    corrector: CorrectorArg,

    /// Model used for the correction pass
    #[arg(long, default_value = "Llama-3.1-8B-Instruct")]
    correction_model: String,

    /// Directory holding questions.json and answer_key.json
    #[arg(long, default_value = "configs")]
    configs_dir: PathBuf,

    /// Directory for OCR result files and the final report
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OcrModeArg {
    Grouped,
    Raw,
}

impl From<OcrModeArg> for OcrMode {
    fn from(mode: OcrModeArg) -> Self {
        match mode {
            OcrModeArg::Grouped => OcrMode::Grouped,
            OcrModeArg::Raw => OcrMode::Raw,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CorrectorArg {
    None,
    Llm,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let ocr = TesseractOcr::new(&cli.ocr_lang);
    let api = ApiConfig {
        base_url: cli.api_url.clone(),
        ..ApiConfig::default()
    };
    let grader = GradingModel::new(ChatClient::new(api.clone())?, cli.model.clone());
    let corrector = match cli.corrector {
        CorrectorArg::None => None,
        CorrectorArg::Llm => Some(CorrectionModel::new(
            ChatClient::new(api)?,
            cli.correction_model.clone(),
        )),
    };

    let mut pipeline = Pipeline::new(&ocr, &grader);
    if let Some(corrector) = corrector.as_ref() {
        pipeline = pipeline.with_corrector(corrector);
    }

    let options = PipelineOptions {
        ocr_mode: cli.ocr_mode.into(),
        configs_dir: cli.configs_dir,
        results_dir: cli.results_dir,
    };

    let report = pipeline.run(&cli.input, &options).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
