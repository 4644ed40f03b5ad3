//! pdfium-backed text layer and rasteriser.
//!
//! ## Binding per call
//!
//! A fresh [`Pdfium`] is bound for every document operation instead of
//! being cached in a global. Each run observes the library that is present
//! *now*. A missing library surfaces as [`ExtractError::PdfiumBindingFailed`]
//! rather than a panic, so the classifier can treat it as "probe failed".
//!
//! ## DPI → scale
//!
//! PDF user space is 72 units per inch, so rendering at `dpi` means scaling
//! each page by `dpi / 72`.

use super::{Rasterizer, TextLayer};
use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Text layer and rasteriser backed by the pdfium C++ library.
#[derive(Debug, Clone, Default)]
pub struct PdfiumBackend {
    library_path: Option<PathBuf>,
    password: Option<String>,
}

impl PdfiumBackend {
    pub fn new(library_path: Option<PathBuf>, password: Option<String>) -> Self {
        Self {
            library_path,
            password,
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.pdfium_library_path.clone(), config.password.clone())
    }

    /// Bind to pdfium: explicit path if configured, else `./`, else the
    /// system library.
    fn bind(&self) -> Result<Pdfium, ExtractError> {
        let bindings = match &self.library_path {
            Some(path) => Pdfium::bind_to_library(path),
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|e| ExtractError::PdfiumBindingFailed(format!("{:?}", e)))?;

        Ok(Pdfium::new(bindings))
    }

    fn load<'a>(&'a self, pdfium: &'a Pdfium, path: &Path) -> Result<PdfDocument<'a>, ExtractError> {
        let password = self.password.as_deref();
        pdfium.load_pdf_from_file(path, password).map_err(|e| {
            let err_str = format!("{:?}", e);
            if err_str.contains("Password") || err_str.contains("password") {
                if password.is_some() {
                    ExtractError::WrongPassword {
                        path: path.to_path_buf(),
                    }
                } else {
                    ExtractError::PasswordRequired {
                        path: path.to_path_buf(),
                    }
                }
            } else {
                ExtractError::CorruptPdf {
                    path: path.to_path_buf(),
                    detail: err_str,
                }
            }
        })
    }
}

impl TextLayer for PdfiumBackend {
    fn page_texts(&self, path: &Path, limit: Option<usize>) -> Result<Vec<String>, ExtractError> {
        let pdfium = self.bind()?;
        let document = self.load(&pdfium, path)?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        let wanted = limit.map_or(total_pages, |n| n.min(total_pages));
        debug!("Reading text layer of {}/{} pages", wanted, total_pages);

        let mut texts = Vec::with_capacity(wanted);
        for idx in 0..wanted {
            let page = pages
                .get(idx as u16)
                .map_err(|e| ExtractError::TextLayerFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                })?;

            let text = page.text().map_err(|e| ExtractError::TextLayerFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?;

            texts.push(text.all());
        }

        Ok(texts)
    }
}

impl Rasterizer for PdfiumBackend {
    fn rasterize(&self, path: &Path, dpi: u32) -> Result<Vec<DynamicImage>, ExtractError> {
        let pdfium = self.bind()?;
        let document = self.load(&pdfium, path)?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        info!("Rasterising {} pages at {} DPI", total_pages, dpi);

        let render_config = PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / 72.0);

        let mut images = Vec::with_capacity(total_pages);
        for idx in 0..total_pages {
            let page = pages
                .get(idx as u16)
                .map_err(|e| ExtractError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                })?;

            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                ExtractError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );
            images.push(image);
        }

        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_copies_library_and_password() {
        let config = ExtractionConfig::builder()
            .pdfium_library_path("/opt/pdfium/libpdfium.so")
            .password("s3cret")
            .build()
            .unwrap();
        let backend = PdfiumBackend::from_config(&config);
        assert_eq!(
            backend.library_path.as_deref(),
            Some(Path::new("/opt/pdfium/libpdfium.so"))
        );
        assert_eq!(backend.password.as_deref(), Some("s3cret"));
    }

    #[test]
    fn missing_library_is_an_error_not_a_panic() {
        let backend = PdfiumBackend::new(
            Some(PathBuf::from("/definitely/not/libpdfium.so")),
            None,
        );
        let err = backend
            .page_texts(Path::new("/tmp/whatever.pdf"), Some(1))
            .unwrap_err();
        assert!(matches!(err, ExtractError::PdfiumBindingFailed(_)), "got: {err}");
    }
}
