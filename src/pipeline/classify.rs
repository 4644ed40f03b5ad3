//! Mode classification: does this PDF carry a usable text layer?
//!
//! The classifier reads the text layer of the first few pages (default 3)
//! and counts the characters of the trimmed concatenation. At or above the
//! threshold (default 100) the document is [`DocumentKind::TextBearing`];
//! below it, or when the probe itself fails, it is
//! [`DocumentKind::ImageBearing`].
//!
//! The probe failure is an explicit [`ProbeOutcome::Failed`] branch that
//! folds into `ImageBearing`: a document we cannot parse is routed to OCR,
//! the slower path that works on any renderable page. A short but genuine
//! text PDF may be misrouted to OCR too; that costs time, not text.

use crate::backend::TextLayer;
use crate::config::ExtractionConfig;
use crate::output::DocumentKind;
use std::path::Path;
use tracing::{debug, warn};

/// What the text-layer probe saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Probe succeeded; `chars` is the trimmed character count across the
    /// probed pages.
    Text { pages: usize, chars: usize },
    /// The text layer could not be read at all.
    Failed(String),
}

/// Classifier verdict plus the evidence behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: DocumentKind,
    pub probe: ProbeOutcome,
}

impl Classification {
    fn from_probe(probe: ProbeOutcome, min_text_chars: usize) -> Self {
        let kind = match &probe {
            ProbeOutcome::Text { chars, .. } if *chars >= min_text_chars => {
                DocumentKind::TextBearing
            }
            ProbeOutcome::Text { .. } | ProbeOutcome::Failed(_) => DocumentKind::ImageBearing,
        };
        Self { kind, probe }
    }
}

/// Read the text layer of at most `config.probe_pages` leading pages.
pub fn probe(layer: &dyn TextLayer, path: &Path, config: &ExtractionConfig) -> ProbeOutcome {
    match layer.page_texts(path, Some(config.probe_pages)) {
        Ok(texts) => {
            let joined: String = texts.concat();
            ProbeOutcome::Text {
                pages: texts.len(),
                chars: joined.trim().chars().count(),
            }
        }
        Err(e) => ProbeOutcome::Failed(e.to_string()),
    }
}

/// Classify a document as text- or image-bearing. Never fails.
pub fn classify(layer: &dyn TextLayer, path: &Path, config: &ExtractionConfig) -> Classification {
    let classification = Classification::from_probe(probe(layer, path, config), config.min_text_chars);

    match &classification.probe {
        ProbeOutcome::Text { pages, chars } => debug!(
            "Probe read {} chars over {} pages (threshold {}) → {:?}",
            chars, pages, config.min_text_chars, classification.kind
        ),
        ProbeOutcome::Failed(reason) => {
            warn!("Text-layer probe failed, treating as image-bearing: {}", reason)
        }
    }

    classification
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use std::sync::Mutex;

    struct FakeLayer {
        pages: Result<Vec<String>, String>,
        seen_limit: Mutex<Option<Option<usize>>>,
    }

    impl FakeLayer {
        fn ok(pages: &[&str]) -> Self {
            Self {
                pages: Ok(pages.iter().map(|s| s.to_string()).collect()),
                seen_limit: Mutex::new(None),
            }
        }

        fn failing(msg: &str) -> Self {
            Self {
                pages: Err(msg.to_string()),
                seen_limit: Mutex::new(None),
            }
        }
    }

    impl TextLayer for FakeLayer {
        fn page_texts(&self, _path: &Path, limit: Option<usize>) -> Result<Vec<String>, ExtractError> {
            *self.seen_limit.lock().unwrap() = Some(limit);
            match &self.pages {
                Ok(pages) => Ok(pages
                    .iter()
                    .take(limit.unwrap_or(usize::MAX))
                    .cloned()
                    .collect()),
                Err(msg) => Err(ExtractError::CorruptPdf {
                    path: "x.pdf".into(),
                    detail: msg.clone(),
                }),
            }
        }
    }

    fn run(layer: &FakeLayer) -> Classification {
        classify(layer, Path::new("x.pdf"), &ExtractionConfig::default())
    }

    #[test]
    fn exactly_threshold_is_text_bearing() {
        let page = "a".repeat(100);
        let c = run(&FakeLayer::ok(&[&page]));
        assert_eq!(c.kind, DocumentKind::TextBearing);
    }

    #[test]
    fn one_below_threshold_is_image_bearing() {
        let page = "a".repeat(99);
        let c = run(&FakeLayer::ok(&[&page]));
        assert_eq!(c.kind, DocumentKind::ImageBearing);
        assert_eq!(c.probe, ProbeOutcome::Text { pages: 1, chars: 99 });
    }

    #[test]
    fn surrounding_whitespace_does_not_count() {
        let page = format!("   \n{}\n\t  ", "b".repeat(99));
        assert_eq!(run(&FakeLayer::ok(&[&page])).kind, DocumentKind::ImageBearing);
    }

    #[test]
    fn only_first_three_pages_are_probed() {
        let layer = FakeLayer::ok(&["", "", "", &"z".repeat(500)]);
        let c = run(&layer);
        assert_eq!(c.kind, DocumentKind::ImageBearing);
        assert_eq!(*layer.seen_limit.lock().unwrap(), Some(Some(3)));
    }

    #[test]
    fn text_spread_over_pages_is_summed() {
        let p = "w".repeat(40);
        let c = run(&FakeLayer::ok(&[&p, &p, &p]));
        assert_eq!(c.kind, DocumentKind::TextBearing);
    }

    #[test]
    fn probe_failure_collapses_to_image_bearing() {
        let c = run(&FakeLayer::failing("bad xref"));
        assert_eq!(c.kind, DocumentKind::ImageBearing);
        assert!(matches!(c.probe, ProbeOutcome::Failed(ref m) if m.contains("bad xref")));
    }

    #[test]
    fn empty_document_is_image_bearing() {
        assert_eq!(run(&FakeLayer::ok(&[])).kind, DocumentKind::ImageBearing);
    }

    #[test]
    fn thresholds_are_configurable() {
        let config = ExtractionConfig::builder()
            .probe_pages(1)
            .min_text_chars(5)
            .build()
            .unwrap();
        let layer = FakeLayer::ok(&["hello", ""]);
        let c = classify(&layer, Path::new("x.pdf"), &config);
        assert_eq!(c.kind, DocumentKind::TextBearing);
        assert_eq!(*layer.seen_limit.lock().unwrap(), Some(Some(1)));
    }
}
