//! OCR engine and filesystem result cache
//!
//! Text recognition runs through Tesseract (via leptess) behind the
//! [`OcrEngine`] trait so the pipeline can be exercised with fakes. Results
//! are a flat list of recognized lines in reading order.
//!
//! [`OcrCache`] is the two-tier "prefer saved JSON, else compute and store"
//! policy: a previously saved `<image-basename>*_res.json` in the results
//! directory (newest by modification time) wins over a live OCR call.

use anyhow::{Context, Result};
use image::GrayImage;
use leptess::LepTess;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::GraderError;
use crate::types::OcrOutput;

/// Text recognition over a preprocessed answer-sheet image.
pub trait OcrEngine {
    fn recognize(&self, image: &GrayImage) -> Result<OcrOutput>;
}

/// Tesseract-backed OCR engine.
pub struct TesseractOcr {
    lang: String,
}

impl TesseractOcr {
    /// `lang` uses the CLI's short codes ("en", "vi"); anything else is
    /// passed to Tesseract verbatim.
    pub fn new(lang: &str) -> Self {
        let lang = match lang {
            "en" => "eng",
            "vi" => "vie",
            other => other,
        };
        Self { lang: lang.to_string() }
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &GrayImage) -> Result<OcrOutput> {
        let mut tesseract = LepTess::new(None, &self.lang)
            .context("Failed to initialize Tesseract. Is Tesseract installed?")?;

        // leptess wants image data in a standard container format
        let mut png_bytes = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut png_bytes);
        image
            .write_to(&mut cursor, image::ImageFormat::Png)
            .context("Failed to encode image as PNG")?;

        tesseract
            .set_image_from_mem(&png_bytes)
            .context("Failed to load image into Tesseract")?;

        let text = tesseract
            .get_utf8_text()
            .context("Failed to extract text from image")?;

        let rec_texts = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        Ok(OcrOutput { rec_texts })
    }
}

/// Filesystem cache of OCR results, keyed by image base name.
pub struct OcrCache {
    results_dir: PathBuf,
}

impl OcrCache {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }

    /// Return the newest saved result for `image_path`, if any.
    ///
    /// Candidates are files named `<image-basename>*_res.json` in the
    /// results directory; the most recently modified wins. Unreadable or
    /// empty candidates count as a miss, never as an error.
    pub fn lookup(&self, image_path: &Path) -> Option<OcrOutput> {
        let base = image_path.file_stem()?.to_str()?.to_string();
        let entries = fs::read_dir(&self.results_dir).ok()?;

        let mut newest: Option<(SystemTime, PathBuf)> = None;
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !(name.starts_with(&base) && name.ends_with("_res.json")) {
                continue;
            }
            let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
                continue;
            };
            if newest.as_ref().map_or(true, |(when, _)| modified > *when) {
                newest = Some((modified, entry.path()));
            }
        }

        let (_, path) = newest?;
        let body = fs::read_to_string(&path).ok()?;
        let output: OcrOutput = serde_json::from_str(&body).ok()?;
        if output.rec_texts.is_empty() {
            return None;
        }
        tracing::info!(cache = %path.display(), "using saved OCR result");
        Some(output)
    }

    /// Persist a fresh OCR result as `<image-basename>_res.json`.
    pub fn store(&self, image_path: &Path, output: &OcrOutput) -> Result<PathBuf, GraderError> {
        fs::create_dir_all(&self.results_dir).map_err(|source| GraderError::Io {
            path: self.results_dir.clone(),
            source,
        })?;

        let base = image_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("ocr");
        let path = self.results_dir.join(format!("{base}_res.json"));

        let body = serde_json::to_vec_pretty(output).map_err(|e| GraderError::Io {
            path: path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;
        fs::write(&path, body).map_err(|source| GraderError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}
