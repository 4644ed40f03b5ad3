//! # edgequake-pdf2txt
//!
//! Extract plain text from a PDF of unknown provenance, choosing between the
//! embedded text layer and OCR, and report how far the result can be trusted.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     file must exist and be readable
//!  ├─ 2. Classify  ≥100 chars in the first 3 pages' text layer?
//!  ├─ 3a. Direct   read every page's text layer (pdfium)
//!  ├─ 3b. OCR      rasterise at 300 DPI (pdfium) → tesseract per page
//!  │               (also the one-time fallback when 3a fails)
//!  └─ 4. Done      "--- Page N ---" blocks + confidence + trust message
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2txt::{extract, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let result = extract("trust_document.pdf", &ExtractionConfig::default()).await?;
//!     eprintln!("{}", result.message);
//!     println!("{}", result.text);
//!     std::process::exit(result.exit_code() as i32);
//! }
//! ```
//!
//! ## Confidence
//!
//! | Path | `confidence` | `exit_code()` |
//! |------|--------------|---------------|
//! | direct text layer | 100.0 (assumed) | 0 |
//! | OCR, ≥ 70 | mean of per-page means | 0 |
//! | OCR, 50 – 70 | same, with a low-confidence advisory | 0 |
//! | OCR, < 50 | same, with a low-confidence advisory | 2 |
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2txt` binary (clap + anyhow + tracing-subscriber + indicatif + serde_json) |
//!
//! ## Runtime requirements
//!
//! * libpdfium, found in `./`, on the system library path, or via
//!   `PDFIUM_LIB_PATH` / [`ExtractionConfigBuilder::pdfium_library_path`].
//! * The `tesseract` binary on `PATH` (only needed when OCR runs).

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{
    PageRecognition, PdfiumBackend, Rasterizer, Recognizer, TesseractCli, TextLayer, Token,
};
pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use error::ExtractError;
pub use extract::{classify, extract, extract_blocking, extract_to_file, Extractor};
pub use output::{ConfidenceTier, DocumentKind, ExtractionMethod, ExtractionResult, PageReport};
pub use pipeline::classify::{Classification, ProbeOutcome};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
