//! # autocrop
//!
//! Pull the individual pictures out of a scanned page or PDF, turn each one
//! upright, and save it as its own JPEG.
//!
//! ## Pipeline Overview
//!
//! ```text
//! scan.pdf / scan.png
//!  │
//!  ├─ 1. Input    validate the path; PDF pages rasterised via pdfium
//!  ├─ 2. Segment  threshold + external contours → one box per picture
//!  ├─ 3. Orient   try 0/90/180/270°, OCR any dark header bar on top
//!  └─ 4. Write    rotate, trim white margins, final_image_<n>.jpg
//! ```
//!
//! A picture is considered upright when a dark bar with light text runs
//! along its top edge. Pictures without such a bar are written unrotated.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use autocrop::{crop, CropConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CropConfig::builder().output_dir("crops").build()?;
//!     let output = crop("album-page.pdf", &config)?;
//!     for image in &output.images {
//!         println!("{} ← page {} ({}°)", image.path.display(), image.page, image.rotation_degrees);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `autocrop` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## External tools
//!
//! PDF input needs the pdfium shared library (see [`pipeline::render`]) and
//! orientation detection needs the `tesseract` executable. Image-only runs
//! with a custom [`TextRecognizer`] need neither.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod crop;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{CropConfig, CropConfigBuilder};
pub use crop::{crop, crop_page, crop_with_recognizer, inspect};
pub use error::{AutocropError, OcrError};
pub use output::{CropOutput, CropStats, InputSummary, PageSummary, SavedImage};
pub use pipeline::input::InputKind;
pub use pipeline::ocr::{TesseractCli, TextRecognizer};
pub use pipeline::orient::{Orientation, Rotation};
pub use pipeline::segment::Region;
pub use pipeline::write::OutputWriter;
pub use progress::{CropProgressCallback, NoopProgressCallback, ProgressCallback};
