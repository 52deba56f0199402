//! Error types for the autocrop library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`AutocropError`] is **fatal**: the run cannot proceed (missing input,
//!   undecodable image, pdfium unavailable, output not writable). Returned
//!   as `Err(AutocropError)` from the top-level `crop*` functions. Outputs
//!   already written stay on disk.
//!
//! * [`OcrError`] is **non-fatal**: OCR failed for one orientation candidate.
//!   The detector logs it and moves on to the next candidate, so a flaky OCR
//!   call never loses a sub-image.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the autocrop library.
#[derive(Debug, Error)]
pub enum AutocropError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file is not a PDF and could not be decoded as an image.
    #[error("Could not decode image '{path}': {detail}")]
    DecodeFailed { path: PathBuf, detail: String },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// The PDF opened but yielded no page images.
    #[error("PDF '{path}' has no pages to process")]
    NoPages { path: PathBuf },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDF input needs the pdfium shared library. You can:\n\
  • Place libpdfium next to the working directory.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium.\n\
  • Install pdfium system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    // ── OCR errors ────────────────────────────────────────────────────────
    /// The OCR executable could not be run at all.
    #[error("OCR engine '{program}' is not available: {detail}\nInstall tesseract or point --tesseract at it.")]
    OcrUnavailable { program: PathBuf, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write an output JPEG.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The JPEG encoder rejected the image.
    #[error("Failed to encode '{path}' as JPEG: {detail}")]
    EncodeFailed { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A non-fatal OCR failure for a single orientation candidate.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The OCR process could not be spawned.
    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The OCR process ran but exited unsuccessfully.
    #[error("OCR exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    /// The strip image could not be staged for the OCR process.
    #[error("could not prepare OCR input: {0}")]
    Staging(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_display() {
        let e = AutocropError::FileNotFound {
            path: PathBuf::from("scan.png"),
        };
        let msg = e.to_string();
        assert!(msg.contains("scan.png"), "got: {msg}");
    }

    #[test]
    fn rasterisation_failed_display() {
        let e = AutocropError::RasterisationFailed {
            page: 3,
            detail: "bitmap alloc".into(),
        };
        assert!(e.to_string().contains("page 3"));
        assert!(e.to_string().contains("bitmap alloc"));
    }

    #[test]
    fn output_write_failed_keeps_source() {
        use std::error::Error as _;

        let e = AutocropError::OutputWriteFailed {
            path: PathBuf::from("final_image_1.jpg"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert!(e.to_string().contains("final_image_1.jpg"));
        assert!(e.source().is_some());
    }

    #[test]
    fn ocr_unavailable_mentions_program() {
        let e = AutocropError::OcrUnavailable {
            program: PathBuf::from("/opt/tess"),
            detail: "No such file".into(),
        };
        assert!(e.to_string().contains("/opt/tess"));
    }

    #[test]
    fn ocr_failed_display() {
        let e = OcrError::Failed {
            status: "exit status: 1".into(),
            stderr: "Error opening data file".into(),
        };
        assert!(e.to_string().contains("exit status: 1"));
        assert!(e.to_string().contains("data file"));
    }

    /// No wildcard arm: every variant must be classified here.
    fn names_a_file(e: &AutocropError) -> bool {
        match e {
            AutocropError::FileNotFound { .. }
            | AutocropError::PermissionDenied { .. }
            | AutocropError::DecodeFailed { .. }
            | AutocropError::CorruptPdf { .. }
            | AutocropError::PasswordRequired { .. }
            | AutocropError::WrongPassword { .. }
            | AutocropError::NoPages { .. }
            | AutocropError::OcrUnavailable { .. }
            | AutocropError::OutputWriteFailed { .. }
            | AutocropError::EncodeFailed { .. } => true,
            AutocropError::RasterisationFailed { .. }
            | AutocropError::PdfiumBindingFailed(_)
            | AutocropError::InvalidConfig(_) => false,
        }
    }

    #[test]
    fn every_variant_is_a_concrete_failure() {
        assert!(names_a_file(&AutocropError::NoPages {
            path: PathBuf::from("empty.pdf"),
        }));
        assert!(!names_a_file(&AutocropError::InvalidConfig(
            "dpi out of range".into()
        )));
    }
}
