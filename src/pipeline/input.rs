//! Input validation: make sure the path names a readable file before any
//! collaborator is touched.

use crate::error::ExtractError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate that `path` exists and is readable.
///
/// Content is not inspected: a non-PDF file passes here, fails the
/// classifier probe, and ends as a degraded OCR result.
pub fn resolve_local(path: impl AsRef<Path>) -> Result<PathBuf, ExtractError> {
    let path = path.as_ref().to_path_buf();

    if !path.is_file() {
        return Err(ExtractError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ExtractError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(ExtractError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}
