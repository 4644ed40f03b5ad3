//! Error types for the edgequake-pdf2txt library.
//!
//! A single [`ExtractError`] covers every failure the pipeline can observe,
//! but the orchestrator treats the variants very differently:
//!
//! * **Fatal**: input and configuration errors ([`ExtractError::is_input`],
//!   [`ExtractError::is_configuration`]) and per-page recognition failures.
//!   These are returned as `Err` from [`crate::Extractor::run`] and map to
//!   exit status 1 in the CLI.
//!
//! * **Swallowed**: text-layer failures (corrupt PDF, password, pdfium
//!   binding) become a classification signal or trigger the one-time
//!   fallback to OCR; rasterisation failures degrade the OCR attempt to an
//!   empty, zero-confidence result. Both are recorded in
//!   [`crate::output::ExtractionResult::diagnostics`] instead of propagated.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the edgequake-pdf2txt library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    // ── Configuration errors ──────────────────────────────────────────────
    /// The recognition engine host binary could not be located.
    #[error("OCR engine '{binary}' is not installed or not on PATH.\n{hint}")]
    RecognizerUnavailable { binary: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Text-layer errors ─────────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install libpdfium system-wide."
    )]
    PdfiumBindingFailed(String),

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// Text could not be read from a specific page.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextLayerFailed { page: usize, detail: String },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// pdfium could not rasterise a page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── Recognition errors ────────────────────────────────────────────────
    /// The recognition engine ran but failed on a page.
    #[error("OCR failed on page {page}: {detail}")]
    RecognitionFailed { page: usize, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output text file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    /// `true` for usage errors detected before any processing.
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            ExtractError::FileNotFound { .. } | ExtractError::PermissionDenied { .. }
        )
    }

    /// `true` for environment/configuration errors that no fallback can fix.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ExtractError::RecognizerUnavailable { .. } | ExtractError::InvalidConfig(_)
        )
    }
}

/// Remediation hint shown when the `tesseract` binary is missing.
pub(crate) fn tesseract_install_hint() -> String {
    "Install with: apt install tesseract-ocr  (macOS: brew install tesseract)\n\
Or point --tesseract / TESSERACT_BIN at an existing binary."
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizer_unavailable_display_carries_hint() {
        let e = ExtractError::RecognizerUnavailable {
            binary: "tesseract".into(),
            hint: tesseract_install_hint(),
        };
        let msg = e.to_string();
        assert!(msg.contains("tesseract"), "got: {msg}");
        assert!(msg.contains("apt install tesseract-ocr"), "got: {msg}");
        assert!(e.is_configuration());
        assert!(!e.is_input());
    }

    #[test]
    fn file_not_found_is_input_error() {
        let e = ExtractError::FileNotFound {
            path: PathBuf::from("/nope.pdf"),
        };
        assert!(e.is_input());
        assert!(!e.is_configuration());
        assert!(e.to_string().contains("/nope.pdf"));
    }

    #[test]
    fn recognition_failed_display() {
        let e = ExtractError::RecognitionFailed {
            page: 3,
            detail: "exit status 1".into(),
        };
        assert!(e.to_string().contains("page 3"));
        assert!(e.to_string().contains("exit status 1"));
    }

    #[test]
    fn output_write_failed_keeps_source() {
        use std::error::Error as _;
        let e = ExtractError::OutputWriteFailed {
            path: PathBuf::from("/ro/out.txt"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("/ro/out.txt"));
    }
}
