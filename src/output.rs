//! Output types: the terminal value of an extraction run.

use crate::config::ExtractionConfig;
use serde::{Deserialize, Serialize};

/// Message attached to every direct (non-OCR) extraction.
pub const DIRECT_MESSAGE: &str = "Text extracted directly from PDF (no OCR needed).";

/// Classifier verdict for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Carries an embedded text layer worth reading directly.
    TextBearing,
    /// Scanned or otherwise text-less; needs OCR.
    ImageBearing,
}

/// Which strategy produced the final text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Text layer read directly.
    Direct,
    /// Classified image-bearing, OCR ran first.
    Ocr,
    /// Classified text-bearing, direct extraction failed, OCR ran instead.
    OcrFallback,
}

impl ExtractionMethod {
    pub fn ocr_used(self) -> bool {
        !matches!(self, ExtractionMethod::Direct)
    }
}

/// Trust tier derived from `(ocr_used, confidence)`.
///
/// | Tier | Condition | Exit status |
/// |------|-----------|-------------|
/// | `Assumed` | OCR not used (confidence fixed at 100) | 0 |
/// | `High` | confidence ≥ low threshold | 0 |
/// | `Low` | failing ≤ confidence < low threshold | 0 |
/// | `Failing` | confidence < failing threshold | 2 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    Assumed,
    High,
    Low,
    Failing,
}

impl ConfidenceTier {
    /// Place a result into its tier using the configured boundaries.
    ///
    /// Lower bounds are inclusive: exactly 70.0 is `High`, exactly 50.0 is
    /// `Low`.
    pub fn classify(ocr_used: bool, confidence: f64, config: &ExtractionConfig) -> Self {
        if !ocr_used {
            ConfidenceTier::Assumed
        } else if confidence < config.failing_confidence_threshold {
            ConfidenceTier::Failing
        } else if confidence < config.low_confidence_threshold {
            ConfidenceTier::Low
        } else {
            ConfidenceTier::High
        }
    }

    /// `true` when the caller should review the text manually.
    pub fn needs_review(self) -> bool {
        matches!(self, ConfidenceTier::Low | ConfidenceTier::Failing)
    }

    /// Process exit status for this tier.
    pub fn exit_code(self) -> u8 {
        match self {
            ConfidenceTier::Failing => 2,
            _ => 0,
        }
    }

    /// Human-readable trust statement for a result in this tier.
    pub fn message(self, confidence: f64) -> String {
        match self {
            ConfidenceTier::Assumed => DIRECT_MESSAGE.to_string(),
            ConfidenceTier::High => {
                format!("OCR completed successfully with {confidence:.1}% confidence.")
            }
            ConfidenceTier::Low | ConfidenceTier::Failing => format!(
                "OCR confidence is low ({confidence:.1}%). The document appears to be a scanned \
image with reduced text quality. Please verify extracted content for accuracy."
            ),
        }
    }
}

/// Per-page summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageReport {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Character count of the page text (marker excluded).
    pub chars: usize,
    /// Mean token confidence for the page; OCR path only.
    pub confidence: Option<f64>,
}

/// The result of one extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Page blocks in physical order, each preceded by `--- Page N ---`,
    /// joined by a blank line.
    pub text: String,
    /// 100.0 when OCR was not used; otherwise the mean of per-page means.
    pub confidence: f64,
    pub ocr_used: bool,
    /// Trust statement derived from [`ConfidenceTier`].
    pub message: String,
    pub kind: DocumentKind,
    pub method: ExtractionMethod,
    pub tier: ConfidenceTier,
    pub pages: Vec<PageReport>,
    /// Failures swallowed along the way (fallback reason, degraded OCR).
    pub diagnostics: Vec<String>,
    pub duration_ms: u64,
}

impl ExtractionResult {
    /// Process exit status for this result (0 or 2).
    pub fn exit_code(&self) -> u8 {
        self.tier.exit_code()
    }

    /// `true` when the text should be manually verified.
    pub fn needs_review(&self) -> bool {
        self.tier.needs_review()
    }
}
