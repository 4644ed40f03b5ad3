//! Extraction orchestrator and public entry points.
//!
//! ## State machine
//!
//! ```text
//! Start ──▶ Classifying ──TextBearing──▶ DirectAttempt ──ok──▶ Done
//!                 │                            │
//!                 │ImageBearing                │err (once)
//!                 ▼                            ▼
//!             OcrAttempt ◀─────────────────────┘
//!                 │
//!                 └──────────────▶ Done   (success or degraded)
//! ```
//!
//! [`Stage::next`] is the entire transition table. `DirectAttempt` is only
//! reachable from `Classifying` and `OcrAttempt` only leads to `Done`, so
//! a run falls back at most once and OCR never retries itself.
//!
//! ## Blocking vs. async
//!
//! [`Extractor::run`] is synchronous: pages are processed strictly in order
//! and pdfium/tesseract calls block. The async entry points move the whole
//! run onto tokio's blocking pool with `spawn_blocking` so callers inside a
//! runtime never stall a worker thread.

use crate::backend::{PdfiumBackend, Rasterizer, Recognizer, TesseractCli, TextLayer};
use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::output::{ConfidenceTier, DocumentKind, ExtractionMethod, ExtractionResult, PageReport};
use crate::pipeline::classify::{self, Classification, ProbeOutcome};
use crate::pipeline::{direct, input, ocr};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Confidence reported whenever OCR was not used.
pub const ASSUMED_CONFIDENCE: f64 = 100.0;

/// What a finished strategy hands to `Done`.
#[derive(Debug)]
struct Outcome {
    kind: DocumentKind,
    method: ExtractionMethod,
    text: String,
    confidence: f64,
    pages: Vec<PageReport>,
}

/// Orchestrator states.
#[derive(Debug)]
enum Stage {
    Start,
    Classifying,
    DirectAttempt,
    OcrAttempt {
        kind: DocumentKind,
        method: ExtractionMethod,
    },
    Done(Outcome),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "Start",
            Stage::Classifying => "Classifying",
            Stage::DirectAttempt => "DirectAttempt",
            Stage::OcrAttempt { .. } => "OcrAttempt",
            Stage::Done(_) => "Done",
        };
        f.write_str(name)
    }
}

impl Stage {
    /// Execute this stage and return its successor.
    fn next(self, run: &mut Run<'_>) -> Result<Stage, ExtractError> {
        match self {
            Stage::Start => Ok(Stage::Classifying),

            Stage::Classifying => {
                let c = run.classify();
                Ok(match c.kind {
                    DocumentKind::TextBearing => Stage::DirectAttempt,
                    DocumentKind::ImageBearing => Stage::OcrAttempt {
                        kind: DocumentKind::ImageBearing,
                        method: ExtractionMethod::Ocr,
                    },
                })
            }

            Stage::DirectAttempt => match run.direct() {
                Ok(outcome) => Ok(Stage::Done(outcome)),
                Err(e) => {
                    run.fall_back(&e);
                    Ok(Stage::OcrAttempt {
                        kind: DocumentKind::TextBearing,
                        method: ExtractionMethod::OcrFallback,
                    })
                }
            },

            Stage::OcrAttempt { kind, method } => run.ocr(kind, method).map(Stage::Done),

            done @ Stage::Done(_) => Ok(done),
        }
    }
}

/// Per-invocation state threaded through the stages.
struct Run<'a> {
    extractor: &'a Extractor,
    path: &'a Path,
    diagnostics: Vec<String>,
}

impl Run<'_> {
    fn config(&self) -> &ExtractionConfig {
        &self.extractor.config
    }

    fn classify(&mut self) -> Classification {
        let c = classify::classify(self.extractor.text_layer.as_ref(), self.path, self.config());
        if let ProbeOutcome::Failed(ref reason) = c.probe {
            self.diagnostics
                .push(format!("Text layer unreadable, using OCR: {reason}"));
        }
        match c.kind {
            DocumentKind::ImageBearing => info!("Detected image-based PDF. Running OCR..."),
            DocumentKind::TextBearing => {
                info!("Detected text-based PDF. Extracting text directly...")
            }
        }
        if let Some(ref cb) = self.config().progress_callback {
            cb.on_classified(c.kind);
        }
        c
    }

    fn direct(&mut self) -> Result<Outcome, ExtractError> {
        let out = direct::extract_direct(
            self.extractor.text_layer.as_ref(),
            self.path,
            self.config(),
        )?;
        Ok(Outcome {
            kind: DocumentKind::TextBearing,
            method: ExtractionMethod::Direct,
            text: out.text,
            confidence: ASSUMED_CONFIDENCE,
            pages: out.pages,
        })
    }

    fn fall_back(&mut self, err: &ExtractError) {
        let reason = format!("Direct extraction failed: {err}. Falling back to OCR...");
        warn!("{}", reason);
        if let Some(ref cb) = self.config().progress_callback {
            cb.on_fallback(&reason);
        }
        self.diagnostics.push(reason);
    }

    fn ocr(&mut self, kind: DocumentKind, method: ExtractionMethod) -> Result<Outcome, ExtractError> {
        let out = ocr::extract_with_ocr(
            self.extractor.rasterizer.as_ref(),
            self.extractor.recognizer.as_ref(),
            self.path,
            self.config(),
        )?;
        if let Some(reason) = out.degraded {
            self.diagnostics.push(reason);
        }
        Ok(Outcome {
            kind,
            method,
            text: out.text,
            confidence: out.confidence,
            pages: out.pages,
        })
    }
}

/// Drives one document through classification, extraction and tiering.
///
/// Holds no per-document state; one `Extractor` can process any number of
/// documents, one at a time or from several threads.
#[derive(Clone)]
pub struct Extractor {
    config: ExtractionConfig,
    text_layer: Arc<dyn TextLayer>,
    rasterizer: Arc<dyn Rasterizer>,
    recognizer: Arc<dyn Recognizer>,
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extractor")
            .field("config", &self.config)
            .field("recognizer", &self.recognizer.name())
            .finish()
    }
}

impl Extractor {
    /// Production collaborators: pdfium for the text layer and rasterising,
    /// the `tesseract` binary for recognition.
    pub fn new(config: ExtractionConfig) -> Self {
        let pdfium = Arc::new(PdfiumBackend::from_config(&config));
        let tesseract = Arc::new(TesseractCli::from_config(&config));
        Self {
            text_layer: pdfium.clone(),
            rasterizer: pdfium,
            recognizer: tesseract,
            config,
        }
    }

    /// Inject collaborators (alternative engines, test doubles).
    pub fn with_backends(
        config: ExtractionConfig,
        text_layer: Arc<dyn TextLayer>,
        rasterizer: Arc<dyn Rasterizer>,
        recognizer: Arc<dyn Recognizer>,
    ) -> Self {
        Self {
            config,
            text_layer,
            rasterizer,
            recognizer,
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Classify a document without extracting it.
    pub fn classify(&self, path: impl AsRef<Path>) -> Result<Classification, ExtractError> {
        let path = input::resolve_local(path)?;
        Ok(classify::classify(self.text_layer.as_ref(), &path, &self.config))
    }

    /// Extract text from the PDF at `path`.
    ///
    /// # Errors
    /// Returns `Err` only for fatal conditions:
    /// - input file missing or unreadable
    /// - recognition engine unavailable (when OCR is attempted)
    /// - recognition failure on a page
    ///
    /// Text-layer failures and rasterisation failures are not errors; they
    /// show up in [`ExtractionResult::diagnostics`].
    pub fn run(&self, path: impl AsRef<Path>) -> Result<ExtractionResult, ExtractError> {
        let start = Instant::now();
        let path = input::resolve_local(path)?;
        info!("Starting extraction: {}", path.display());
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_extraction_start(&path);
        }

        let mut run = Run {
            extractor: self,
            path: &path,
            diagnostics: Vec::new(),
        };

        let mut stage = Stage::Start;
        let outcome = loop {
            let from = stage.to_string();
            stage = match stage.next(&mut run)? {
                Stage::Done(outcome) => {
                    debug!("{} → Done", from);
                    break outcome;
                }
                next => {
                    debug!("{} → {}", from, next);
                    next
                }
            };
        };

        let result = self.finish(outcome, run.diagnostics, start);
        info!(
            "Extraction complete: {:?}, {} pages, confidence {:.1}%",
            result.method,
            result.pages.len(),
            result.confidence
        );
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_extraction_complete(&result);
        }
        Ok(result)
    }

    /// Run, then persist the text to `output` when it is non-empty.
    ///
    /// The file is written atomically (temp file + rename) and overwritten
    /// if present. Nothing is written when the run errors or yields no text.
    pub fn run_to_file(
        &self,
        path: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<ExtractionResult, ExtractError> {
        let result = self.run(path)?;
        if !result.text.is_empty() {
            write_text(output.as_ref(), &result.text)?;
            info!("Output written to: {}", output.as_ref().display());
        } else {
            warn!("No text extracted; not writing {}", output.as_ref().display());
        }
        Ok(result)
    }

    /// `Done`: apply the confidence invariant and tier policy.
    fn finish(&self, outcome: Outcome, diagnostics: Vec<String>, start: Instant) -> ExtractionResult {
        let ocr_used = outcome.method.ocr_used();
        let confidence = if ocr_used {
            outcome.confidence
        } else {
            ASSUMED_CONFIDENCE
        };
        let tier = ConfidenceTier::classify(ocr_used, confidence, &self.config);

        ExtractionResult {
            text: outcome.text,
            confidence,
            ocr_used,
            message: tier.message(confidence),
            kind: outcome.kind,
            method: outcome.method,
            tier,
            pages: outcome.pages,
            diagnostics,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Write `text` to `path` as UTF-8 via a sibling temp file and rename.
fn write_text(path: &Path, text: &str) -> Result<(), ExtractError> {
    let write_err = |source| ExtractError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut tmp: OsString = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp_path = PathBuf::from(tmp);

    std::fs::write(&tmp_path, text.as_bytes()).map_err(write_err)?;
    std::fs::rename(&tmp_path, path).map_err(write_err)?;
    Ok(())
}

// ── Convenience entry points ─────────────────────────────────────────────

/// Extract text from a PDF using the production backends.
///
/// Runs the blocking pipeline on tokio's blocking pool.
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdf2txt::{extract, ExtractionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let result = extract("scanned_will.pdf", &ExtractionConfig::default()).await?;
/// println!("{}\n\n{}", result.message, result.text);
/// # Ok(())
/// # }
/// ```
pub async fn extract(
    input: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionResult, ExtractError> {
    let path = input.as_ref().to_path_buf();
    let extractor = Extractor::new(config.clone());
    tokio::task::spawn_blocking(move || extractor.run(&path))
        .await
        .map_err(|e| ExtractError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Extract and persist the text to `output` (see [`Extractor::run_to_file`]).
pub async fn extract_to_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionResult, ExtractError> {
    let path = input.as_ref().to_path_buf();
    let output = output.as_ref().to_path_buf();
    let extractor = Extractor::new(config.clone());
    tokio::task::spawn_blocking(move || extractor.run_to_file(&path, &output))
        .await
        .map_err(|e| ExtractError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Synchronous wrapper around [`extract`] for callers without a runtime.
pub fn extract_blocking(
    input: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionResult, ExtractError> {
    Extractor::new(config.clone()).run(input)
}

/// Classify a PDF as text- or image-bearing without extracting it.
///
/// Does not require the recognition engine.
pub async fn classify(
    input: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<Classification, ExtractError> {
    let path = input.as_ref().to_path_buf();
    let extractor = Extractor::new(config.clone());
    tokio::task::spawn_blocking(move || extractor.classify(&path))
        .await
        .map_err(|e| ExtractError::Internal(format!("Classification task panicked: {}", e)))?
}
