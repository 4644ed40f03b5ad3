//! CLI binary for edgequake-pdf2txt.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig`, prints the trust message and text, and turns the
//! confidence tier into the process exit status.
//!
//! Exit status: 0 success, 1 usage/configuration error, 2 OCR confidence
//! below the failing threshold.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf2txt::{
    extract, extract_to_file, DocumentKind, ExtractionConfig, ExtractionProgressCallback,
    ExtractionResult, ProbeOutcome, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner while classifying, then a page bar
/// once the page count is known.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
        })
    }

    /// Switch to the page-bar style once `total` is known.
    fn activate_bar(&self, total: usize) {
        if self.bar.length() == Some(total as u64) {
            return;
        }
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Extracting");
        self.bar.reset_eta();
    }

    /// Remove the bar so an error message lands on a clean line.
    fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

/// Spinner text while the chosen strategy warms up.
fn spinner_message(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::TextBearing => "reading text layer…",
        DocumentKind::ImageBearing => "rasterising…",
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_classified(&self, kind: DocumentKind) {
        let line = match kind {
            DocumentKind::TextBearing => "Detected text-based PDF. Extracting text directly…",
            DocumentKind::ImageBearing => "Detected image-based PDF. Running OCR…",
        };
        self.bar.println(format!("{} {}", cyan("◆"), bold(line)));
        self.bar.set_message(spinner_message(kind));
    }

    fn on_fallback(&self, reason: &str) {
        self.bar.println(format!("{} {}", yellow("⚠"), reason));
    }

    fn on_page_start(&self, page_num: usize, total: usize) {
        self.activate_bar(total);
        if let Ok(mut times) = self.start_times.lock() {
            times.insert(page_num, Instant::now());
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, chars: usize, confidence: Option<f64>) {
        self.activate_bar(total);
        let elapsed_ms = self
            .start_times
            .lock()
            .ok()
            .and_then(|mut t| t.remove(&page_num))
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        let conf = match confidence {
            Some(c) => format!("{c:>5.1}%"),
            None => "   — ".to_string(),
        };

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<12}  {}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{chars:>6} chars")),
            conf,
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_extraction_complete(&self, _result: &ExtractionResult) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract to stdout (trust message, then text)
  pdf2txt scanned_will.pdf

  # Extract to a file
  pdf2txt trust_document.pdf extracted_text.txt
  pdf2txt trust_document.pdf -o extracted_text.txt

  # Only report whether the PDF has a usable text layer
  pdf2txt --classify-only contract.pdf

  # Full result record as JSON
  pdf2txt --json scanned_will.pdf > result.json

  # Faster, lower-quality OCR in German
  pdf2txt --dpi 200 --language deu brief.pdf

EXIT STATUS:
  0  success (direct extraction, or OCR confidence ≥ 50%)
  1  missing input file or OCR engine not installed
  2  OCR used and confidence < 50%

ENVIRONMENT VARIABLES:
  PDF2TXT_DPI           Rasterisation DPI for OCR (default 300)
  PDF2TXT_LANGUAGE      Tesseract language(s), e.g. eng+fra
  TESSERACT_BIN         Tesseract binary name or path
  PDFIUM_LIB_PATH       Path to an existing libpdfium
  RUST_LOG              Log filter (overrides --verbose / --quiet)

SETUP:
  apt install tesseract-ocr          (macOS: brew install tesseract)
  libpdfium from https://github.com/bblanchon/pdfium-binaries
"#;

/// Extract plain text from PDFs, with OCR fallback and a confidence signal.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2txt",
    version,
    about = "Extract plain text from PDFs, with OCR fallback and a confidence signal",
    long_about = "Extract machine-readable text from any PDF. Born-digital documents are read \
from their text layer; scanned documents are rasterised and run through tesseract. OCR results \
carry a confidence score and the exit status reflects how far the text can be trusted.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input PDF file.
    input: PathBuf,

    /// Write extracted text to this file instead of stdout.
    #[arg(conflicts_with = "output")]
    output_file: Option<PathBuf>,

    /// Write extracted text to this file instead of stdout.
    #[arg(short, long, env = "PDF2TXT_OUTPUT")]
    output: Option<PathBuf>,

    /// Rasterisation DPI for OCR (72–600).
    #[arg(long, env = "PDF2TXT_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Tesseract language(s), e.g. eng or eng+deu.
    #[arg(short, long, env = "PDF2TXT_LANGUAGE", default_value = "eng")]
    language: String,

    /// Tesseract page segmentation mode (0–13).
    #[arg(long, env = "PDF2TXT_PSM", value_parser = clap::value_parser!(u8).range(0..=13))]
    psm: Option<u8>,

    /// Tesseract binary name or path.
    #[arg(long, env = "TESSERACT_BIN", default_value = "tesseract")]
    tesseract: String,

    /// Path to the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2TXT_PASSWORD")]
    password: Option<String>,

    /// Pages the classifier probes for a text layer.
    #[arg(long, env = "PDF2TXT_PROBE_PAGES", default_value_t = 3)]
    probe_pages: usize,

    /// Characters required in the probed pages to skip OCR.
    #[arg(long, env = "PDF2TXT_MIN_TEXT_CHARS", default_value_t = 100)]
    min_text_chars: usize,

    /// Output the full result record as JSON instead of plain text.
    #[arg(long, env = "PDF2TXT_JSON")]
    json: bool,

    /// Only classify the PDF (text- or image-bearing), do not extract.
    #[arg(long)]
    classify_only: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2TXT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2TXT_VERBOSE")]
    verbose: bool,

    /// Suppress everything except the text and errors.
    #[arg(short, long, env = "PDF2TXT_QUIET")]
    quiet: bool,
}

impl Cli {
    fn output_path(&self) -> Option<&Path> {
        self.output.as_deref().or(self.output_file.as_deref())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar already narrates the run; keep library INFO logs
    // out of its way unless --verbose.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.classify_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress = show_progress.then(CliProgressCallback::new);
    let outcome = run(&cli, progress.clone()).await;
    if let Err(ref e) = outcome {
        if let Some(ref p) = progress {
            p.clear();
        }
        eprintln!("{} {:#}", red("✘"), e);
    }
    ExitCode::from(exit_status(&outcome))
}

/// Process exit status: the result's own code, or 1 for any error.
fn exit_status(outcome: &Result<u8>) -> u8 {
    match outcome {
        Ok(code) => *code,
        Err(_) => EXIT_FAILURE,
    }
}

const EXIT_FAILURE: u8 = 1;

const LOW_CONFIDENCE_ADVISORY: &str = "WARNING: Low OCR confidence. Manual review recommended.";

async fn run(cli: &Cli, progress: Option<Arc<CliProgressCallback>>) -> Result<u8> {
    let progress = progress.map(|p| p as ProgressCallback);
    let config = build_config(cli, progress)?;

    // ── Classify-only mode ───────────────────────────────────────────────
    if cli.classify_only {
        let c = edgequake_pdf2txt::classify(&cli.input, &config)
            .await
            .context("Failed to classify PDF")?;
        let (pages, chars, failure) = match &c.probe {
            ProbeOutcome::Text { pages, chars } => (Some(*pages), Some(*chars), None),
            ProbeOutcome::Failed(reason) => (None, None, Some(reason.clone())),
        };

        if cli.json {
            let value = serde_json::json!({
                "file": cli.input,
                "kind": c.kind,
                "probed_pages": pages,
                "chars": chars,
                "probe_error": failure,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&value).context("Failed to serialise classification")?
            );
        } else {
            println!("File:          {}", cli.input.display());
            println!("Kind:          {:?}", c.kind);
            if let (Some(p), Some(n)) = (pages, chars) {
                println!("Probed pages:  {}", p);
                println!("Characters:    {}", n);
            }
            if let Some(reason) = failure {
                println!("Probe error:   {}", reason);
            }
        }
        return Ok(0);
    }

    // ── Run extraction ───────────────────────────────────────────────────
    let result = match cli.output_path() {
        Some(path) => extract_to_file(&cli.input, path, &config)
            .await
            .context("Extraction failed")?,
        None => extract(&cli.input, &config)
            .await
            .context("Extraction failed")?,
    };

    if !cli.quiet {
        for note in &result.diagnostics {
            eprintln!("{} {}", yellow("⚠"), note);
        }
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialise result")?;
        println!("{json}");
    } else {
        let to_file = cli.output_path();
        write_result(&mut io::stdout().lock(), &result, to_file.is_some())
            .context("Failed to write to stdout")?;
        if let (Some(path), false) = (to_file, cli.quiet) {
            report_output_file(&result, path);
        }
    }

    Ok(result.exit_code())
}

/// Stdout: the trust message, the advisory when review is needed, then the
/// text unless it went to a file. Plain text only; colour stays on stderr.
fn write_result(out: &mut impl Write, result: &ExtractionResult, to_file: bool) -> io::Result<()> {
    writeln!(out, "{}", result.message)?;
    if result.needs_review() {
        writeln!(out, "\n{LOW_CONFIDENCE_ADVISORY}")?;
    }
    if to_file {
        return Ok(());
    }

    let rule = "=".repeat(60);
    writeln!(out, "\n{rule}\nEXTRACTED TEXT:\n{rule}")?;
    out.write_all(result.text.as_bytes())?;
    if !result.text.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Stderr summary when the text was persisted (or why it was not).
fn report_output_file(result: &ExtractionResult, path: &Path) {
    if result.text.is_empty() {
        eprintln!("{} No text extracted; {} was not written", red("✘"), path.display());
    } else {
        eprintln!(
            "{}  {} pages  {}ms  →  {}",
            if result.needs_review() { yellow("⚠") } else { green("✔") },
            result.pages.len(),
            result.duration_ms,
            bold(&path.display().to_string()),
        );
    }
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .dpi(cli.dpi)
        .language(cli.language.clone())
        .tesseract_binary(cli.tesseract.clone())
        .probe_pages(cli.probe_pages)
        .min_text_chars(cli.min_text_chars);

    if let Some(psm) = cli.psm {
        builder = builder.page_segmentation_mode(psm);
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_library_path(lib.clone());
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn positional_output_is_accepted() {
        let cli = Cli::try_parse_from(["pdf2txt", "in.pdf", "out.txt"]).unwrap();
        assert_eq!(cli.output_path(), Some(Path::new("out.txt")));
    }

    #[test]
    fn flag_output_is_accepted() {
        let cli = Cli::try_parse_from(["pdf2txt", "in.pdf", "-o", "out.txt"]).unwrap();
        assert_eq!(cli.output_path(), Some(Path::new("out.txt")));
    }

    #[test]
    fn defaults_map_to_config() {
        let cli = Cli::try_parse_from(["pdf2txt", "in.pdf"]).unwrap();
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.dpi, 300);
        assert_eq!(config.probe_pages, 3);
        assert_eq!(config.min_text_chars, 100);
        assert_eq!(config.language, "eng");
        assert!(cli.output_path().is_none());
    }

    #[test]
    fn dpi_out_of_range_is_rejected() {
        assert!(Cli::try_parse_from(["pdf2txt", "--dpi", "20", "in.pdf"]).is_err());
    }

    // ── Stdout layout and exit status ────────────────────────────────────

    use edgequake_pdf2txt::{ConfidenceTier, ExtractionMethod};

    fn result_at(ocr_used: bool, confidence: f64) -> ExtractionResult {
        let tier = ConfidenceTier::classify(ocr_used, confidence, &ExtractionConfig::default());
        ExtractionResult {
            text: "--- Page 1 ---\nIn witness whereof".to_string(),
            confidence,
            ocr_used,
            message: tier.message(confidence),
            kind: if ocr_used {
                DocumentKind::ImageBearing
            } else {
                DocumentKind::TextBearing
            },
            method: if ocr_used {
                ExtractionMethod::Ocr
            } else {
                ExtractionMethod::Direct
            },
            tier,
            pages: Vec::new(),
            diagnostics: Vec::new(),
            duration_ms: 0,
        }
    }

    fn stdout_of(result: &ExtractionResult, to_file: bool) -> String {
        let mut buf = Vec::new();
        write_result(&mut buf, result, to_file).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn banner() -> String {
        let rule = "=".repeat(60);
        format!("{rule}\nEXTRACTED TEXT:\n{rule}")
    }

    #[test]
    fn low_confidence_stdout_is_message_advisory_then_text() {
        let out = stdout_of(&result_at(true, 61.3), false);
        assert_eq!(
            out,
            format!(
                "OCR confidence is low (61.3%). The document appears to be a scanned image with \
reduced text quality. Please verify extracted content for accuracy.\n\
\n{LOW_CONFIDENCE_ADVISORY}\n\
\n{}\n--- Page 1 ---\nIn witness whereof\n",
                banner()
            )
        );
        assert!(!out.contains('\x1b'), "stdout must carry no ANSI escapes: {out:?}");
    }

    #[test]
    fn high_confidence_stdout_has_no_advisory() {
        let out = stdout_of(&result_at(true, 90.0), false);
        assert_eq!(
            out,
            format!(
                "OCR completed successfully with 90.0% confidence.\n\n{}\n--- Page 1 ---\nIn witness whereof\n",
                banner()
            )
        );
    }

    #[test]
    fn direct_stdout_has_assumed_message() {
        let out = stdout_of(&result_at(false, 100.0), false);
        assert!(out.starts_with("Text extracted directly from PDF (no OCR needed).\n\n"));
        assert!(!out.contains("WARNING"));
        assert!(out.ends_with("In witness whereof\n"));
    }

    #[test]
    fn output_file_keeps_text_off_stdout() {
        assert_eq!(
            stdout_of(&result_at(true, 90.0), true),
            "OCR completed successfully with 90.0% confidence.\n"
        );

        let out = stdout_of(&result_at(true, 42.0), true);
        assert!(out.starts_with("OCR confidence is low (42.0%)"));
        assert!(out.ends_with(&format!("\n\n{LOW_CONFIDENCE_ADVISORY}\n")));
        assert!(!out.contains("EXTRACTED TEXT") && !out.contains('\x1b'));
    }

    #[test]
    fn exit_status_follows_tier_and_errors() {
        assert_eq!(exit_status(&Ok(result_at(false, 100.0).exit_code())), 0);
        assert_eq!(exit_status(&Ok(result_at(true, 50.0).exit_code())), 0);
        assert_eq!(exit_status(&Ok(result_at(true, 49.9).exit_code())), 2);
        assert_eq!(exit_status(&Err(anyhow::anyhow!("tesseract not found"))), 1);
    }

    #[tokio::test]
    async fn missing_input_exits_1_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("extracted_text.txt");
        let cli = Cli::try_parse_from([
            std::ffi::OsStr::new("pdf2txt"),
            dir.path().join("absent.pdf").as_os_str(),
            out.as_os_str(),
        ])
        .unwrap();

        let outcome = run(&cli, None).await;
        assert!(outcome.is_err());
        assert_eq!(exit_status(&outcome), 1);
        assert!(!out.exists());
    }

    #[test]
    fn spinner_message_matches_strategy() {
        assert_eq!(spinner_message(DocumentKind::TextBearing), "reading text layer…");
        assert_eq!(spinner_message(DocumentKind::ImageBearing), "rasterising…");
    }
}
