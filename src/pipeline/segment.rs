//! Sub-image segmentation: find the pictures laid out on a page.
//!
//! Scanned pages are light paper with darker photographs on top, so every
//! pixel at or below `foreground_threshold` is foreground. Each external
//! contour of that mask whose enclosed area exceeds `min_region_area` becomes
//! one [`Region`]. Regions nested inside another picture are ignored, but
//! overlapping siblings are kept as-is.

use super::gray::to_gray;
use crate::config::CropConfig;
use image::{DynamicImage, GrayImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::contrast::{threshold, ThresholdType};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Axis-aligned bounding box of one sub-image on its page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Area enclosed by the contour, in px².
    pub area: f64,
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Binary mask with foreground (pixels `<= threshold`) set to 255.
pub fn foreground_mask(gray: &GrayImage, foreground_threshold: u8) -> GrayImage {
    threshold(gray, foreground_threshold, ThresholdType::BinaryInverted)
}

/// Area enclosed by a contour, via the shoelace formula.
pub fn contour_area(contour: &Contour<u32>) -> f64 {
    let points = &contour.points;
    if points.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..points.len() {
        let j = (i + 1) % points.len();
        area += points[i].x as f64 * points[j].y as f64;
        area -= points[j].x as f64 * points[i].y as f64;
    }
    area.abs() / 2.0
}

fn bounding_region(contour: &Contour<u32>, area: f64) -> Option<Region> {
    let first = contour.points.first()?;
    let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
    for p in &contour.points {
        x0 = x0.min(p.x);
        y0 = y0.min(p.y);
        x1 = x1.max(p.x);
        y1 = y1.max(p.y);
    }
    Some(Region {
        x: x0,
        y: y0,
        width: x1 - x0 + 1,
        height: y1 - y0 + 1,
        area,
    })
}

/// Locate the sub-images on a page, in contour discovery order.
pub fn find_regions(page: &DynamicImage, config: &CropConfig) -> Vec<Region> {
    let gray = to_gray(page);
    let mask = foreground_mask(&gray, config.foreground_threshold);

    let regions: Vec<Region> = find_contours::<u32>(&mask)
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(|c| {
            let area = contour_area(c);
            if area > config.min_region_area {
                bounding_region(c, area)
            } else {
                None
            }
        })
        .collect();

    debug!(
        "Segmented {}x{} page → {} region(s)",
        page.width(),
        page.height(),
        regions.len()
    );
    regions
}

/// Cut a region out of its page.
pub fn crop_region(page: &DynamicImage, region: &Region) -> DynamicImage {
    page.crop_imm(region.x, region.y, region.width, region.height)
}
