//! Grayscale conversion shared by every stage that thresholds luma.
//!
//! The foreground threshold and the dark-header cutoff are calibrated against
//! BT.601 luma (`0.299 R + 0.587 G + 0.114 B`). `image`'s own `to_luma8` uses
//! Rec.709 weights, which renders greens and teals noticeably lighter, so
//! all thresholding goes through [`to_gray`] instead.

use image::{DynamicImage, GrayImage, Luma, Rgb};
use imageproc::map::map_colors;

// BT.601 weights in 14-bit fixed point; they sum to 1 << 14.
const R_WEIGHT: u32 = 4899;
const G_WEIGHT: u32 = 9617;
const B_WEIGHT: u32 = 1868;
const SHIFT: u32 = 14;

/// BT.601 luma of one RGB pixel, rounded to nearest.
pub fn luma(px: Rgb<u8>) -> u8 {
    let [r, g, b] = px.0;
    let y = r as u32 * R_WEIGHT + g as u32 * G_WEIGHT + b as u32 * B_WEIGHT;
    ((y + (1 << (SHIFT - 1))) >> SHIFT) as u8
}

/// Convert any image to 8-bit BT.601 luma. Alpha is ignored.
pub fn to_gray(image: &DynamicImage) -> GrayImage {
    match image {
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        other => map_colors(&other.to_rgb8(), |px| Luma([luma(px)])),
    }
}
