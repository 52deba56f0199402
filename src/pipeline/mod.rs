//! Pipeline stages for sub-image extraction.
//!
//! Each submodule implements exactly one step, so every stage can be tested
//! on synthetic images without the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ segment ──▶ orient (+ ocr) ──▶ write
//! (path)    (pdfium)   (contours)  (header bar)       (JPEG)
//! ```
//!
//! 1. [`input`]  : validate the path, classify PDF vs. image, load pages
//! 2. [`render`] : rasterise PDF pages through pdfium
//! 3. [`segment`]: threshold the page and box each external contour
//! 4. [`orient`] : try the four quarter turns and look for a header bar,
//!    reading it through [`ocr`]
//! 5. [`write`]  : trim white margins and write numbered JPEGs
//!
//! Every luma threshold is applied to [`gray::to_gray`] output.

pub mod gray;
pub mod input;
pub mod ocr;
pub mod orient;
pub mod render;
pub mod segment;
pub mod write;
