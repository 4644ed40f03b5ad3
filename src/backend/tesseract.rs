//! Recognition engine: the `tesseract` command-line binary.
//!
//! Each page image is written once to a temporary PNG and handed to
//! tesseract twice: once for plain text (`stdout`) and once for token-level data
//! (`stdout tsv`). Only the TSV call feeds confidence.
//!
//! TSV columns:
//! `level page_num block_num par_num line_num word_num left top width height conf text`.
//! Structural rows (page/block/paragraph/line) carry `conf = -1`; the
//! aggregator drops them together with any other non-positive value.

use super::{PageRecognition, Recognizer, Token};
use crate::config::ExtractionConfig;
use crate::error::{tesseract_install_hint, ExtractError};
use image::{DynamicImage, ImageFormat};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;
use tracing::debug;

const TSV_COLUMNS: usize = 12;
const CONF_COLUMN: usize = 10;
const TEXT_COLUMN: usize = 11;

/// Drives the `tesseract` binary as a subprocess.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: String,
    language: String,
    psm: Option<u8>,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract", "eng", None)
    }
}

impl TesseractCli {
    pub fn new(binary: impl Into<String>, language: impl Into<String>, psm: Option<u8>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
            psm,
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(
            config.tesseract_binary.clone(),
            config.language.clone(),
            config.page_segmentation_mode,
        )
    }

    /// Resolve the binary against `PATH` (or check an explicit path).
    pub fn locate(&self) -> Result<PathBuf, ExtractError> {
        which::which(&self.binary).map_err(|_| ExtractError::RecognizerUnavailable {
            binary: self.binary.clone(),
            hint: tesseract_install_hint(),
        })
    }

    /// Write `image` to a temporary PNG that lives as long as the handle.
    fn stage(&self, image: &DynamicImage) -> Result<NamedTempFile, ExtractError> {
        let tmp = tempfile::Builder::new()
            .prefix("pdf2txt-page-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| ExtractError::Internal(format!("tempfile: {e}")))?;

        image
            .save_with_format(tmp.path(), ImageFormat::Png)
            .map_err(|e| ExtractError::Internal(format!("Failed to write page image: {e}")))?;
        Ok(tmp)
    }

    /// Run `exe` on an already staged page image, returning its stdout.
    ///
    /// Failures carry `page: 0`; the OCR stage re-wraps them with the real
    /// page number.
    fn run(&self, exe: &Path, image_path: &Path, extra: &[&str]) -> Result<String, ExtractError> {
        let mut cmd = Command::new(exe);
        cmd.arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language);
        if let Some(psm) = self.psm {
            cmd.arg("--psm").arg(psm.to_string());
        }
        cmd.args(extra);

        debug!("Running {:?}", cmd);
        let output = cmd.output().map_err(|e| ExtractError::RecognitionFailed {
            page: 0,
            detail: format!("Failed to run {}: {}", exe.display(), e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::RecognitionFailed {
                page: 0,
                detail: format!("{} exited with {}: {}", self.binary, output.status, stderr.trim()),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Recognizer for TesseractCli {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn ensure_available(&self) -> Result<(), ExtractError> {
        let path = self.locate()?;
        debug!("Using tesseract at {}", path.display());
        Ok(())
    }

    fn recognize_text(&self, image: &DynamicImage) -> Result<String, ExtractError> {
        let exe = self.locate()?;
        let page = self.stage(image)?;
        self.run(&exe, page.path(), &[])
    }

    fn recognize_tokens(&self, image: &DynamicImage) -> Result<Vec<Token>, ExtractError> {
        let exe = self.locate()?;
        let page = self.stage(image)?;
        Ok(parse_tsv(&self.run(&exe, page.path(), &["tsv"])?))
    }

    fn recognize_page(&self, image: &DynamicImage) -> Result<PageRecognition, ExtractError> {
        let exe = self.locate()?;
        let page = self.stage(image)?;
        let tokens = parse_tsv(&self.run(&exe, page.path(), &["tsv"])?);
        let text = self.run(&exe, page.path(), &[])?;
        Ok(PageRecognition { text, tokens })
    }
}

/// Parse tesseract TSV output into tokens.
///
/// Malformed rows are skipped. Fractional confidences (tesseract ≥ 4
/// prints e.g. `96.063751`) are truncated toward zero.
pub fn parse_tsv(tsv: &str) -> Vec<Token> {
    tsv.lines()
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split('\t').collect();
            if cols.len() < TSV_COLUMNS {
                return None;
            }
            let conf = cols[CONF_COLUMN].trim().parse::<f64>().ok()?;
            Some(Token::new(cols[TEXT_COLUMN], conf.trunc() as i32))
        })
        .collect()
}
