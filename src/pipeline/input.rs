//! Input resolution: validate the user-supplied path and load page images.
//!
//! A PDF is rasterised page by page through [`super::render`]; anything else
//! is decoded with the `image` crate as a single page. The PDF check looks at
//! the extension first and falls back to the `%PDF` magic bytes, so a PDF
//! saved without an extension still renders instead of failing to decode.

use crate::config::CropConfig;
use crate::error::AutocropError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What kind of document the input path holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Pdf,
    Image,
}

/// A validated input file.
#[derive(Debug, Clone)]
pub struct InputDocument {
    pub path: PathBuf,
    pub kind: InputKind,
}

/// Check if the path carries a `.pdf` extension (any case).
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Validate that `path` exists and is readable, and classify it.
pub fn resolve_input(path: impl AsRef<Path>) -> Result<InputDocument, AutocropError> {
    let path = path.as_ref().to_path_buf();

    if !path.exists() {
        return Err(AutocropError::FileNotFound { path });
    }

    let mut magic = [0u8; 4];
    match std::fs::File::open(&path) {
        Ok(mut f) => {
            // Short files simply fail the magic check.
            if f.read_exact(&mut magic).is_err() {
                magic = [0; 4];
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(AutocropError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(AutocropError::FileNotFound { path });
        }
    }

    let kind = if has_pdf_extension(&path) || &magic == b"%PDF" {
        InputKind::Pdf
    } else {
        InputKind::Image
    };

    debug!("Resolved input {} as {:?}", path.display(), kind);
    Ok(InputDocument { path, kind })
}

/// Load every page of `doc` as an image, in page order.
pub fn load_pages(
    doc: &InputDocument,
    config: &CropConfig,
) -> Result<Vec<DynamicImage>, AutocropError> {
    match doc.kind {
        InputKind::Pdf => {
            info!("Input is a PDF. Rasterising pages at {} DPI", config.dpi);
            let pages = super::render::render_pages(&doc.path, config)?;
            if pages.is_empty() {
                return Err(AutocropError::NoPages {
                    path: doc.path.clone(),
                });
            }
            info!("Extracted {} page image(s) to process", pages.len());
            Ok(pages)
        }
        InputKind::Image => {
            let image = image::open(&doc.path).map_err(|e| AutocropError::DecodeFailed {
                path: doc.path.clone(),
                detail: e.to_string(),
            })?;
            debug!(
                "Decoded {} → {}x{} px",
                doc.path.display(),
                image.width(),
                image.height()
            );
            Ok(vec![image])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_has_pdf_extension() {
        assert!(has_pdf_extension(Path::new("scan.pdf")));
        assert!(has_pdf_extension(Path::new("SCAN.PDF")));
        assert!(has_pdf_extension(Path::new("dir/a.b.Pdf")));
        assert!(!has_pdf_extension(Path::new("scan.png")));
        assert!(!has_pdf_extension(Path::new("pdf")));
        assert!(!has_pdf_extension(Path::new("")));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = resolve_input("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, AutocropError::FileNotFound { .. }));
    }

    #[test]
    fn png_resolves_as_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        RgbImage::from_pixel(8, 8, Rgb([255, 255, 255]))
            .save(&path)
            .unwrap();

        let doc = resolve_input(&path).unwrap();
        assert_eq!(doc.kind, InputKind::Image);
    }

    #[test]
    fn pdf_magic_without_extension_resolves_as_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan");
        std::fs::write(&path, b"%PDF-1.7\n%%EOF\n").unwrap();

        let doc = resolve_input(&path).unwrap();
        assert_eq!(doc.kind, InputKind::Pdf);
    }

    #[test]
    fn undecodable_image_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"not really a jpeg").unwrap();

        let doc = resolve_input(&path).unwrap();
        let err = load_pages(&doc, &CropConfig::default()).unwrap_err();
        assert!(matches!(err, AutocropError::DecodeFailed { .. }));
    }

    #[test]
    fn image_loads_as_single_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        RgbImage::from_pixel(40, 30, Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let doc = resolve_input(&path).unwrap();
        let pages = load_pages(&doc, &CropConfig::default()).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!((pages[0].width(), pages[0].height()), (40, 30));
    }
}
