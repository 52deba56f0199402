//! Run reports returned by the top-level entry points.

use crate::pipeline::input::InputKind;
use crate::pipeline::segment::Region;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One written sub-image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedImage {
    /// Output counter value, 1-based and unique within the run.
    pub index: usize,
    /// Page the sub-image came from, 1-based.
    pub page: usize,
    /// Bounding box on the page.
    pub region: Region,
    /// Counter-clockwise rotation applied, in degrees.
    pub rotation_degrees: u16,
    /// OCR text of the header bar that decided the rotation.
    /// `None` when no header bar was found and 0° was assumed.
    pub header_text: Option<String>,
    /// Where the JPEG was written.
    pub path: PathBuf,
    /// Final pixel width after rotation and trimming.
    pub width: u32,
    /// Final pixel height after rotation and trimming.
    pub height: u32,
}

impl SavedImage {
    /// Whether the rotation came from a recognised header bar.
    pub fn orientation_detected(&self) -> bool {
        self.header_text.is_some()
    }
}

/// Aggregate counters for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CropStats {
    pub total_pages: usize,
    /// Pages on which no sub-image was found.
    pub empty_pages: usize,
    pub saved_images: usize,
    /// Sub-images whose rotation came from a header bar.
    pub oriented_images: usize,
    /// Sub-images written at 0° because no header bar was found.
    pub fallback_images: usize,
    pub total_duration_ms: u64,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropOutput {
    pub images: Vec<SavedImage>,
    pub stats: CropStats,
}

/// Regions found on one page, without OCR or output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSummary {
    pub page: usize,
    pub width: u32,
    pub height: u32,
    pub regions: Vec<Region>,
}

/// Result of [`crate::inspect`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSummary {
    pub path: PathBuf,
    pub kind: InputKind,
    pub pages: Vec<PageSummary>,
}

impl InputSummary {
    /// Number of sub-images a full run would write.
    pub fn region_count(&self) -> usize {
        self.pages.iter().map(|p| p.regions.len()).sum()
    }
}
