//! PDF rasterisation: render every page to a `DynamicImage` via pdfium.
//!
//! Pages render at `config.dpi` (72 PDF points per inch, so the scale factor
//! is `dpi / 72`), with `max_rendered_pixels` capping either edge. An A0
//! poster at 300 DPI would otherwise need a 14 000 × 10 000 px bitmap.

use crate::config::CropConfig;
use crate::error::AutocropError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an explicit pdfium library to load.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind to pdfium.
///
/// Resolution order: `PDFIUM_LIB_PATH`, a library in the working directory,
/// then the system library search path.
pub fn bind_pdfium() -> Result<Pdfium, AutocropError> {
    let bindings = match std::env::var_os(PDFIUM_LIB_PATH_ENV) {
        Some(path) => Pdfium::bind_to_library(PathBuf::from(path)),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| AutocropError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// Rasterise all pages of a PDF, in page order.
pub fn render_pages(
    pdf_path: &Path,
    config: &CropConfig,
) -> Result<Vec<DynamicImage>, AutocropError> {
    let pdfium = bind_pdfium()?;
    let password = config.password.as_deref();

    let document = pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                AutocropError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                AutocropError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            AutocropError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let max_pixels = config.max_rendered_pixels as i32;
    let render_config = PdfRenderConfig::new()
        .scale_page_by_factor(config.dpi as f32 / 72.0)
        .set_maximum_width(max_pixels)
        .set_maximum_height(max_pixels);

    let mut results = Vec::with_capacity(pages.len() as usize);

    for (idx, page) in pages.iter().enumerate() {
        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            AutocropError::RasterisationFailed {
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

        results.push(image);
    }

    Ok(results)
}
