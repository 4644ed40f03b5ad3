//! Progress-callback trait for extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to observe
//! the run: the classification verdict, an eventual fallback, and per-page
//! OCR progress. OCR on a long scanned document can take minutes, so the
//! CLI uses these events to drive a progress bar.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf2txt::{ExtractionProgressCallback, ExtractionConfig};
//! use std::sync::Arc;
//!
//! struct Logger;
//!
//! impl ExtractionProgressCallback for Logger {
//!     fn on_page_complete(&self, page_num: usize, total: usize, chars: usize, _conf: Option<f64>) {
//!         eprintln!("page {page_num}/{total}: {chars} chars");
//!     }
//! }
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(Arc::new(Logger) as Arc<dyn ExtractionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::{DocumentKind, ExtractionResult};
use std::path::Path;
use std::sync::Arc;

/// Called by the extraction pipeline as it progresses.
///
/// Pages are processed strictly in order on a single thread, so events
/// arrive in page order. The trait is still `Send + Sync` because the async
/// entry points move the run onto tokio's blocking pool.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once, after input validation and before classification.
    fn on_extraction_start(&self, path: &Path) {
        let _ = path;
    }

    /// Called with the classifier verdict.
    fn on_classified(&self, kind: DocumentKind) {
        let _ = kind;
    }

    /// Called when direct extraction failed and the run falls back to OCR.
    fn on_fallback(&self, reason: &str) {
        let _ = reason;
    }

    /// Called before a page is extracted.
    ///
    /// # Arguments
    /// * `page_num`   : 1-indexed page number
    /// * `total_pages`: total pages in the document
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called after a page is extracted.
    ///
    /// `confidence` is the page's mean token confidence on the OCR path,
    /// `None` on the direct path or when the engine reported no usable
    /// confidence for the page.
    fn on_page_complete(
        &self,
        page_num: usize,
        total_pages: usize,
        chars: usize,
        confidence: Option<f64>,
    ) {
        let _ = (page_num, total_pages, chars, confidence);
    }

    /// Called once with the final result.
    fn on_extraction_complete(&self, result: &ExtractionResult) {
        let _ = result;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        pages: AtomicUsize,
        fallbacks: AtomicUsize,
        kinds: Mutex<Vec<DocumentKind>>,
    }

    impl ExtractionProgressCallback for TrackingCallback {
        fn on_classified(&self, kind: DocumentKind) {
            self.kinds.lock().unwrap().push(kind);
        }

        fn on_fallback(&self, _reason: &str) {
            self.fallbacks.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_complete(&self, _p: usize, _t: usize, _c: usize, _conf: Option<f64>) {
            self.pages.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_extraction_start(Path::new("a.pdf"));
        cb.on_classified(DocumentKind::ImageBearing);
        cb.on_fallback("xref broken");
        cb.on_page_start(1, 2);
        cb.on_page_complete(1, 2, 42, Some(91.5));
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_classified(DocumentKind::TextBearing);
        tracker.on_fallback("boom");
        tracker.on_page_complete(1, 1, 10, None);

        assert_eq!(tracker.pages.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.fallbacks.load(Ordering::SeqCst), 1);
        assert_eq!(*tracker.kinds.lock().unwrap(), vec![DocumentKind::TextBearing]);
    }
}
