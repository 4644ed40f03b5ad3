//! End-to-end tests for edgequake-pdf2txt against real PDFs.
//!
//! These use files in `./test_cases/` and need libpdfium plus the
//! `tesseract` binary. They are gated behind `E2E_ENABLED` so they do not
//! run in CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 LD_LIBRARY_PATH=. cargo test --test e2e -- --nocapture
//!
//! Expected fixtures:
//!   test_cases/born_digital.pdf   text layer on every page
//!   test_cases/scanned.pdf        image-only pages with legible print

use edgequake_pdf2txt::{
    classify, extract, extract_to_file, DocumentKind, ExtractionConfig, ExtractionMethod,
};
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

/// Skip this test if E2E_ENABLED is not set *or* no PDF file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP: test file not found: {}", p.display());
            return;
        }
        p
    }};
}

fn assert_page_markers(text: &str, pages: usize, context: &str) {
    let mut last = 0;
    for n in 1..=pages {
        let marker = format!("--- Page {n} ---");
        let pos = text
            .find(&marker)
            .unwrap_or_else(|| panic!("[{context}] missing {marker:?}"));
        assert!(pos >= last, "[{context}] {marker:?} out of order");
        last = pos;
    }
}

// ── Born-digital ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_born_digital_is_extracted_directly() {
    let pdf = e2e_skip_unless_ready!(test_cases_dir().join("born_digital.pdf"));

    let result = extract(&pdf, &ExtractionConfig::default()).await.unwrap();
    println!("{}", result.message);

    assert_eq!(result.kind, DocumentKind::TextBearing);
    assert_eq!(result.method, ExtractionMethod::Direct);
    assert!(!result.ocr_used);
    assert_eq!(result.confidence, 100.0);
    assert_eq!(result.exit_code(), 0);
    assert!(!result.text.trim().is_empty());
    assert_page_markers(&result.text, result.pages.len(), "born_digital");
}

#[tokio::test]
async fn test_classify_born_digital() {
    let pdf = e2e_skip_unless_ready!(test_cases_dir().join("born_digital.pdf"));
    let c = classify(&pdf, &ExtractionConfig::default()).await.unwrap();
    println!("{:?}", c.probe);
    assert_eq!(c.kind, DocumentKind::TextBearing);
}

// ── Scanned ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_scanned_goes_through_ocr() {
    let pdf = e2e_skip_unless_ready!(test_cases_dir().join("scanned.pdf"));

    let result = extract(&pdf, &ExtractionConfig::default()).await.unwrap();
    println!(
        "{} (tier {:?}, {} ms)",
        result.message, result.tier, result.duration_ms
    );

    assert_eq!(result.kind, DocumentKind::ImageBearing);
    assert!(result.ocr_used);
    assert!((0.0..=100.0).contains(&result.confidence));
    assert_page_markers(&result.text, result.pages.len(), "scanned");
}

#[tokio::test]
async fn test_scanned_to_file_matches_result() {
    let pdf = e2e_skip_unless_ready!(test_cases_dir().join("scanned.pdf"));
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("extracted_text.txt");

    let config = ExtractionConfig::builder().dpi(200).build().unwrap();
    let result = extract_to_file(&pdf, &out, &config).await.unwrap();

    if result.text.is_empty() {
        assert!(!out.exists());
    } else {
        assert_eq!(std::fs::read_to_string(&out).unwrap(), result.text);
    }
}

#[tokio::test]
async fn test_repeated_extraction_is_stable() {
    let pdf = e2e_skip_unless_ready!(test_cases_dir().join("born_digital.pdf"));
    let config = ExtractionConfig::default();
    let a = extract(&pdf, &config).await.unwrap();
    let b = extract(&pdf, &config).await.unwrap();
    assert_eq!(a.text, b.text);
}

// ── Always-on ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_file_is_an_input_error() {
    let err = extract(test_cases_dir().join("does_not_exist.pdf"), &ExtractionConfig::default())
        .await
        .unwrap_err();
    assert!(err.is_input(), "got: {err}");
}
