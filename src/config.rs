//! Configuration types for PDF text extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. The classifier window and the
//! confidence tier boundaries live here rather than as constants so they can
//! be tuned per deployment without touching the pipeline.

use crate::error::ExtractError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Lowest accepted rasterisation DPI.
pub const MIN_DPI: u32 = 72;
/// Highest accepted rasterisation DPI.
pub const MAX_DPI: u32 = 600;

/// Configuration for a single extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_pdf2txt::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .dpi(300)
///     .language("eng+fra")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Rasterisation DPI for the OCR path. Range: 72–600. Default: 300.
    ///
    /// Higher DPI trades latency for recognition accuracy; 300 is the usual
    /// sweet spot for tesseract on scanned office documents.
    pub dpi: u32,

    /// Number of leading pages the classifier probes. Default: 3.
    pub probe_pages: usize,

    /// Minimum trimmed character count across the probed pages for a
    /// document to count as text-bearing. Default: 100.
    pub min_text_chars: usize,

    /// OCR confidence below this value produces the low-confidence
    /// advisory. Default: 70.0.
    pub low_confidence_threshold: f64,

    /// OCR confidence below this value makes the run exit with status 2.
    /// Default: 50.0.
    pub failing_confidence_threshold: f64,

    /// Tesseract language(s), e.g. `"eng"` or `"eng+deu"`. Default: `"eng"`.
    pub language: String,

    /// Tesseract page segmentation mode (`--psm`). `None` keeps the engine
    /// default.
    pub page_segmentation_mode: Option<u8>,

    /// Name or path of the tesseract binary. Default: `"tesseract"`.
    pub tesseract_binary: String,

    /// Explicit pdfium library file. If None, tries `./` then the system
    /// library search path.
    pub pdfium_library_path: Option<PathBuf>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Optional per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            probe_pages: 3,
            min_text_chars: 100,
            low_confidence_threshold: 70.0,
            failing_confidence_threshold: 50.0,
            language: "eng".to_string(),
            page_segmentation_mode: None,
            tesseract_binary: "tesseract".to_string(),
            pdfium_library_path: None,
            password: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("dpi", &self.dpi)
            .field("probe_pages", &self.probe_pages)
            .field("min_text_chars", &self.min_text_chars)
            .field("low_confidence_threshold", &self.low_confidence_threshold)
            .field(
                "failing_confidence_threshold",
                &self.failing_confidence_threshold,
            )
            .field("language", &self.language)
            .field("page_segmentation_mode", &self.page_segmentation_mode)
            .field("tesseract_binary", &self.tesseract_binary)
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(MIN_DPI, MAX_DPI);
        self
    }

    pub fn probe_pages(mut self, n: usize) -> Self {
        self.config.probe_pages = n;
        self
    }

    pub fn min_text_chars(mut self, n: usize) -> Self {
        self.config.min_text_chars = n;
        self
    }

    pub fn low_confidence_threshold(mut self, t: f64) -> Self {
        self.config.low_confidence_threshold = t;
        self
    }

    pub fn failing_confidence_threshold(mut self, t: f64) -> Self {
        self.config.failing_confidence_threshold = t;
        self
    }

    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.language = lang.into();
        self
    }

    pub fn page_segmentation_mode(mut self, psm: u8) -> Self {
        self.config.page_segmentation_mode = Some(psm);
        self
    }

    pub fn tesseract_binary(mut self, binary: impl Into<String>) -> Self {
        self.config.tesseract_binary = binary.into();
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if c.dpi < MIN_DPI || c.dpi > MAX_DPI {
            return Err(ExtractError::InvalidConfig(format!(
                "DPI must be {MIN_DPI}–{MAX_DPI}, got {}",
                c.dpi
            )));
        }
        if c.probe_pages == 0 {
            return Err(ExtractError::InvalidConfig(
                "Classifier must probe at least 1 page".into(),
            ));
        }
        for (name, t) in [
            ("low confidence threshold", c.low_confidence_threshold),
            ("failing confidence threshold", c.failing_confidence_threshold),
        ] {
            if !(0.0..=100.0).contains(&t) {
                return Err(ExtractError::InvalidConfig(format!(
                    "{name} must be within 0–100, got {t}"
                )));
            }
        }
        if c.failing_confidence_threshold > c.low_confidence_threshold {
            return Err(ExtractError::InvalidConfig(format!(
                "failing threshold ({}) must not exceed low threshold ({})",
                c.failing_confidence_threshold, c.low_confidence_threshold
            )));
        }
        if c.language.trim().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        if c.tesseract_binary.trim().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "tesseract binary must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = ExtractionConfig::default();
        assert_eq!(c.dpi, 300);
        assert_eq!(c.probe_pages, 3);
        assert_eq!(c.min_text_chars, 100);
        assert_eq!(c.low_confidence_threshold, 70.0);
        assert_eq!(c.failing_confidence_threshold, 50.0);
        assert_eq!(c.language, "eng");
        assert_eq!(c.tesseract_binary, "tesseract");
    }

    #[test]
    fn dpi_is_clamped() {
        let c = ExtractionConfig::builder().dpi(10).build().unwrap();
        assert_eq!(c.dpi, MIN_DPI);
        let c = ExtractionConfig::builder().dpi(5000).build().unwrap();
        assert_eq!(c.dpi, MAX_DPI);
    }

    #[test]
    fn zero_probe_pages_rejected() {
        let err = ExtractionConfig::builder().probe_pages(0).build().unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let err = ExtractionConfig::builder()
            .low_confidence_threshold(40.0)
            .failing_confidence_threshold(60.0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("must not exceed"), "got: {err}");
    }

    #[test]
    fn out_of_range_threshold_rejected() {
        assert!(ExtractionConfig::builder()
            .low_confidence_threshold(120.0)
            .build()
            .is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let c = ExtractionConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }
}
