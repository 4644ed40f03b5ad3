//! Pipeline stages for PDF text extraction.
//!
//! Each submodule implements exactly one step; the orchestrator in
//! [`crate::extract`] wires them into a fixed state machine.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ classify ──┬──▶ direct ──┬──▶ assemble
//! (path)    (≤3 pages) │    (text)   │ fail
//!                      │             ▼
//!                      └──────────▶ ocr ──▶ assemble
//!                                 (raster + tesseract)
//! ```
//!
//! 1. [`input`]    validate the user-supplied path
//! 2. [`classify`] probe the text layer, decide text- vs image-bearing
//! 3. [`direct`]   read the embedded text of every page
//! 4. [`ocr`]      rasterise and recognise every page, aggregate confidence
//! 5. [`assemble`] `--- Page N ---` markers, blank-line joins

pub mod assemble;
pub mod classify;
pub mod direct;
pub mod input;
pub mod ocr;
