//! External collaborators behind narrow traits.
//!
//! The pipeline never talks to pdfium or tesseract directly; it drives these
//! three traits. Production implementations live in [`pdfium`] and
//! [`tesseract`]; tests substitute in-memory fakes.
//!
//! ```text
//! TextLayer   open(path) → page texts           (pdfium)
//! Rasterizer  rasterize(path, dpi) → images     (pdfium)
//! Recognizer  image → text / (token, conf)*     (tesseract binary)
//! ```

pub mod pdfium;
pub mod tesseract;

use crate::error::ExtractError;
use image::DynamicImage;
use std::path::Path;

pub use self::pdfium::PdfiumBackend;
pub use self::tesseract::TesseractCli;

/// Reads the embedded text layer of a PDF.
pub trait TextLayer: Send + Sync {
    /// Return the text of the first `limit` pages (all pages when `None`),
    /// in page order. Pages without a text layer yield an empty string.
    fn page_texts(&self, path: &Path, limit: Option<usize>) -> Result<Vec<String>, ExtractError>;
}

/// Converts a PDF into page images.
pub trait Rasterizer: Send + Sync {
    /// Render every page at `dpi`, in page order.
    fn rasterize(&self, path: &Path, dpi: u32) -> Result<Vec<DynamicImage>, ExtractError>;
}

/// One recognised token and the engine's confidence in it.
///
/// Confidence is an integer in 0–100; values ≤ 0 mean the engine could
/// not compute one (structural rows, empty boxes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub confidence: i32,
}

impl Token {
    pub fn new(text: impl Into<String>, confidence: i32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Optical character recognition over a single page image.
pub trait Recognizer: Send + Sync {
    /// Short engine identifier used in logs.
    fn name(&self) -> &str;

    /// Check that the engine can run in the current environment.
    ///
    /// Called fresh on every OCR attempt so environment changes between
    /// runs are observed.
    fn ensure_available(&self) -> Result<(), ExtractError>;

    /// Plain recognised text for the image.
    fn recognize_text(&self, image: &DynamicImage) -> Result<String, ExtractError>;

    /// Token-level recognition data for the image.
    fn recognize_tokens(&self, image: &DynamicImage) -> Result<Vec<Token>, ExtractError>;

    /// Both recognition passes over one page: tokens first, then text.
    ///
    /// Engines that must stage the image (e.g. on disk) override this to
    /// stage it once for both passes.
    fn recognize_page(&self, image: &DynamicImage) -> Result<PageRecognition, ExtractError> {
        let tokens = self.recognize_tokens(image)?;
        let text = self.recognize_text(image)?;
        Ok(PageRecognition { text, tokens })
    }
}

/// Output of [`Recognizer::recognize_page`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecognition {
    pub text: String,
    pub tokens: Vec<Token>,
}
