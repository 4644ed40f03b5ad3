//! Direct strategy: read every page's embedded text layer.
//!
//! Any failure is returned to the orchestrator, which treats it as the
//! trigger for its single fallback to OCR. No confidence is computed here;
//! a text layer is taken at face value.

use crate::backend::TextLayer;
use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::output::PageReport;
use crate::pipeline::assemble;
use std::path::Path;
use tracing::info;

/// Text and per-page summary from a direct extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectOutput {
    pub text: String,
    pub pages: Vec<PageReport>,
}

/// Read the full text layer and assemble it with page markers.
pub fn extract_direct(
    layer: &dyn TextLayer,
    path: &Path,
    config: &ExtractionConfig,
) -> Result<DirectOutput, ExtractError> {
    let texts = layer.page_texts(path, None)?;
    let total = texts.len();
    info!("Read text layer of {} pages", total);

    let pages = texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let report = PageReport {
                page_num: i + 1,
                chars: text.chars().count(),
                confidence: None,
            };
            if let Some(ref cb) = config.progress_callback {
                cb.on_page_complete(report.page_num, total, report.chars, None);
            }
            report
        })
        .collect();

    Ok(DirectOutput {
        text: assemble::join_pages(&texts),
        pages,
    })
}
