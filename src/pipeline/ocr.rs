//! OCR strategy: rasterise every page and run the recognition engine.
//!
//! ## Confidence
//!
//! Per page, token confidences ≤ 0 are dropped (engine sentinel for "not
//! computable") and the rest are averaged. The document confidence is the
//! mean of those page means, so every page weighs the same whatever its
//! token count. Pages with no usable confidence contribute no data point;
//! if no page does, the document confidence is 0.
//!
//! ## Failure policy
//!
//! | Failure | Outcome |
//! |---------|---------|
//! | engine binary missing | `Err(RecognizerUnavailable)`, fatal |
//! | input file missing | `Err(FileNotFound)`, fatal |
//! | rasterisation fails | `Ok` degraded: empty text, confidence 0 |
//! | recognition fails on a page | `Err(RecognitionFailed)`, aborts the run |

use crate::backend::{PageRecognition, Rasterizer, Recognizer, Token};
use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::output::PageReport;
use crate::pipeline::assemble;
use std::path::Path;
use tracing::{debug, info, warn};

/// Result of an OCR attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrOutput {
    pub text: String,
    pub confidence: f64,
    pub pages: Vec<PageReport>,
    /// Set when rasterisation failed and the output is the empty,
    /// zero-confidence placeholder.
    pub degraded: Option<String>,
}

impl OcrOutput {
    fn degraded(reason: String) -> Self {
        Self {
            text: String::new(),
            confidence: 0.0,
            pages: Vec::new(),
            degraded: Some(reason),
        }
    }
}

/// Mean of the positive token confidences, or `None` if there are none.
pub fn page_confidence(tokens: &[Token]) -> Option<f64> {
    let usable: Vec<i32> = tokens
        .iter()
        .map(|t| t.confidence)
        .filter(|&c| c > 0)
        .collect();
    if usable.is_empty() {
        return None;
    }
    let sum: i64 = usable.iter().map(|&c| c as i64).sum();
    Some(sum as f64 / usable.len() as f64)
}

/// Unweighted mean of the per-page means; 0.0 when no page has one.
pub fn aggregate_confidence(page_confidences: &[Option<f64>]) -> f64 {
    let values: Vec<f64> = page_confidences.iter().flatten().copied().collect();
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Attach the page number to a recognizer error.
fn page_error(page: usize, err: ExtractError) -> ExtractError {
    match err {
        ExtractError::RecognizerUnavailable { .. } => err,
        ExtractError::RecognitionFailed { detail, .. } => {
            ExtractError::RecognitionFailed { page, detail }
        }
        other => ExtractError::RecognitionFailed {
            page,
            detail: other.to_string(),
        },
    }
}

/// Diagnostic for a failed rasterisation.
///
/// Load errors (pdfium missing, password, corrupt file) already carry their
/// own remediation; only a render failure gets the DPI hint.
fn rasterisation_diagnostic(err: &ExtractError) -> String {
    match err {
        ExtractError::RasterisationFailed { .. } => format!(
            "Error converting PDF to images: {err}\n\
Check that the page renders at the requested DPI (try --dpi 200)."
        ),
        _ => format!("Error converting PDF to images: {err}"),
    }
}

/// Run OCR over every page of `path`.
pub fn extract_with_ocr(
    rasterizer: &dyn Rasterizer,
    recognizer: &dyn Recognizer,
    path: &Path,
    config: &ExtractionConfig,
) -> Result<OcrOutput, ExtractError> {
    recognizer.ensure_available()?;

    if !path.is_file() {
        return Err(ExtractError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    info!("Converting PDF to images at {} DPI", config.dpi);
    let images = match rasterizer.rasterize(path, config.dpi) {
        Ok(images) => images,
        Err(e) => {
            warn!("Rasterisation failed, returning empty result: {}", e);
            return Ok(OcrOutput::degraded(rasterisation_diagnostic(&e)));
        }
    };

    let total = images.len();
    let mut texts = Vec::with_capacity(total);
    let mut pages = Vec::with_capacity(total);

    for (i, image) in images.iter().enumerate() {
        let page_num = i + 1;
        info!("Processing page {} of {}", page_num, total);
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(page_num, total);
        }

        let PageRecognition { text, tokens } = recognizer
            .recognize_page(image)
            .map_err(|e| page_error(page_num, e))?;

        let confidence = page_confidence(&tokens);
        let chars = text.chars().count();
        debug!(
            "Page {}: {} tokens, {} chars, confidence {:?}",
            page_num,
            tokens.len(),
            chars,
            confidence
        );
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_complete(page_num, total, chars, confidence);
        }

        texts.push(text);
        pages.push(PageReport {
            page_num,
            chars,
            confidence,
        });
    }

    let page_confidences: Vec<Option<f64>> = pages.iter().map(|p| p.confidence).collect();
    let confidence = aggregate_confidence(&page_confidences);
    info!(
        "{} finished {} pages, confidence {:.1}%",
        recognizer.name(),
        total,
        confidence
    );

    Ok(OcrOutput {
        text: assemble::join_pages(&texts),
        confidence,
        pages,
        degraded: None,
    })
}
