//! Orientation detection by header bar.
//!
//! A correctly oriented sub-image carries a dark bar with light text along
//! its top edge. Each quarter-turn candidate is rotated, its top strip is
//! checked for darkness, and dark strips are OCR'd. The candidate with the
//! longest multi-word reading wins.
//!
//! Candidates are evaluated in ascending angle order and only a strictly
//! longer reading replaces the current best, so ties always resolve to the
//! smaller angle. When nothing qualifies the sub-image stays at 0° and the
//! result carries no header text.

use super::gray::to_gray;
use super::ocr::TextRecognizer;
use crate::config::CropConfig;
use image::{DynamicImage, GrayImage};
use imageproc::contrast::{threshold, ThresholdType};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A counter-clockwise quarter turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[derive(Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Evaluation order. Earlier entries win ties.
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Rotate counter-clockwise by this amount, expanding the canvas.
    ///
    /// `image`'s `rotate*` helpers turn clockwise, hence the swapped arms.
    pub fn apply(self, image: &DynamicImage) -> DynamicImage {
        match self {
            Rotation::Deg0 => image.clone(),
            Rotation::Deg90 => image.rotate270(),
            Rotation::Deg180 => image.rotate180(),
            Rotation::Deg270 => image.rotate90(),
        }
    }
}

/// What one rotation candidate looked like.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCandidate {
    pub rotation: Rotation,
    /// Mean luma of the top strip; `None` when the strip was empty.
    pub strip_mean: Option<f32>,
    /// Trimmed OCR text, when the strip was dark and OCR succeeded.
    pub text: Option<String>,
}

/// The detector's decision for one sub-image.
#[derive(Debug, Clone, PartialEq)]
pub struct Orientation {
    pub rotation: Rotation,
    /// Header text that justified `rotation`; `None` means the 0° fallback.
    pub header_text: Option<String>,
    pub candidates: Vec<HeaderCandidate>,
}

impl Orientation {
    pub fn detected(&self) -> bool {
        self.header_text.is_some()
    }
}

/// The top `floor(height * fraction)` rows as luma, or `None` if that is zero rows.
pub fn header_strip(image: &DynamicImage, fraction: f32) -> Option<GrayImage> {
    let rows = (image.height() as f32 * fraction) as u32;
    if rows == 0 || image.width() == 0 {
        return None;
    }
    Some(to_gray(&image.crop_imm(0, 0, image.width(), rows)))
}

pub fn mean_luma(strip: &GrayImage) -> f32 {
    let n = strip.as_raw().len();
    if n == 0 {
        return 0.0;
    }
    let sum: u64 = strip.as_raw().iter().map(|&p| p as u64).sum();
    (sum as f64 / n as f64) as f32
}

/// Light-on-dark header text becomes dark-on-white for OCR.
pub fn binarize_for_ocr(strip: &GrayImage, cutoff: u8) -> GrayImage {
    threshold(strip, cutoff, ThresholdType::BinaryInverted)
}

/// A reading counts as a header when it has at least two words.
fn is_header_text(text: &str) -> bool {
    text.chars().any(char::is_whitespace)
}

/// Pick the upright rotation of `image`.
pub fn detect_orientation(
    image: &DynamicImage,
    config: &CropConfig,
    recognizer: &dyn TextRecognizer,
) -> Orientation {
    let mut best: Option<(Rotation, String)> = None;
    let mut candidates = Vec::with_capacity(Rotation::ALL.len());

    for rotation in Rotation::ALL {
        let rotated = rotation.apply(image);
        let Some(strip) = header_strip(&rotated, config.header_fraction) else {
            debug!("Rotation {}°: strip is empty, skipping", rotation.degrees());
            candidates.push(HeaderCandidate {
                rotation,
                strip_mean: None,
                text: None,
            });
            continue;
        };

        let mean = mean_luma(&strip);
        debug!("Rotation {}°: top strip mean {:.2}", rotation.degrees(), mean);

        let mut text = None;
        if mean < config.dark_mean_max {
            let ocr_input = binarize_for_ocr(&strip, config.ocr_binarize_threshold);
            match recognizer.recognize(&ocr_input) {
                Ok(raw) => {
                    let reading = raw.trim().to_string();
                    debug!("Rotation {}°: OCR read {:?}", rotation.degrees(), reading);

                    let longest = best.as_ref().map_or(0, |(_, t)| t.chars().count());
                    if is_header_text(&reading) && reading.chars().count() > longest {
                        best = Some((rotation, reading.clone()));
                    }
                    text = Some(reading);
                }
                Err(e) => {
                    warn!("OCR failed for rotation {}°: {}", rotation.degrees(), e);
                }
            }
        }

        candidates.push(HeaderCandidate {
            rotation,
            strip_mean: Some(mean),
            text,
        });
    }

    match best {
        Some((rotation, header)) => Orientation {
            rotation,
            header_text: Some(header),
            candidates,
        },
        None => Orientation {
            rotation: Rotation::Deg0,
            header_text: None,
            candidates,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;
    use image::{Luma, Rgb, RgbImage};
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    /// Returns the same reading for every strip.
    struct FixedText(&'static str);

    impl TextRecognizer for FixedText {
        fn recognize(&self, _strip: &GrayImage) -> Result<String, OcrError> {
            Ok(self.0.to_string())
        }
    }

    /// Hands out queued readings in call order and counts calls.
    struct Scripted {
        replies: RefCell<VecDeque<&'static str>>,
        calls: Cell<usize>,
    }

    impl Scripted {
        fn new(replies: &[&'static str]) -> Self {
            Self {
                replies: RefCell::new(replies.iter().copied().collect()),
                calls: Cell::new(0),
            }
        }
    }

    impl TextRecognizer for Scripted {
        fn recognize(&self, _strip: &GrayImage) -> Result<String, OcrError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.replies.borrow_mut().pop_front().unwrap_or("").to_string())
        }
    }

    struct Broken;

    impl TextRecognizer for Broken {
        fn recognize(&self, _strip: &GrayImage) -> Result<String, OcrError> {
            Err(OcrError::Failed {
                status: "exit status: 1".into(),
                stderr: "boom".into(),
            })
        }
    }

    /// 200x100 light picture; `bars` paints 20 px dark bands on the named edges.
    fn picture(bars: &[&str]) -> DynamicImage {
        let mut img = RgbImage::from_pixel(200, 100, Rgb([220, 220, 220]));
        for (x, y, px) in img.enumerate_pixels_mut() {
            let dark = bars.iter().any(|edge| match *edge {
                "top" => y < 20,
                "bottom" => y >= 80,
                "left" => x < 20,
                "right" => x >= 180,
                _ => false,
            });
            if dark {
                *px = Rgb([15, 15, 15]);
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    fn detect_fixed(bars: &[&str], reading: &'static str) -> Orientation {
        detect_orientation(&picture(bars), &CropConfig::default(), &FixedText(reading))
    }

    #[test]
    fn rotation_apply_turns_counter_clockwise() {
        // Mark the top-left pixel and follow it.
        let mut img = RgbImage::from_pixel(4, 2, Rgb([0, 0, 0]));
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        let img = DynamicImage::ImageRgb8(img);

        let ccw90 = Rotation::Deg90.apply(&img).to_rgb8();
        assert_eq!(ccw90.dimensions(), (2, 4));
        assert_eq!(ccw90.get_pixel(0, 3), &Rgb([255, 0, 0]));

        let ccw270 = Rotation::Deg270.apply(&img).to_rgb8();
        assert_eq!(ccw270.get_pixel(1, 0), &Rgb([255, 0, 0]));

        let half = Rotation::Deg180.apply(&img).to_rgb8();
        assert_eq!(half.get_pixel(3, 1), &Rgb([255, 0, 0]));
    }

    #[test]
    fn upright_picture_keeps_zero_rotation() {
        let o = detect_fixed(&["top"], "SUMMER CAMP");
        assert_eq!(o.rotation, Rotation::Deg0);
        assert_eq!(o.header_text.as_deref(), Some("SUMMER CAMP"));
    }

    #[test]
    fn bar_on_left_edge_needs_quarter_turn_clockwise() {
        let o = detect_fixed(&["left"], "SUMMER CAMP");
        assert_eq!(o.rotation, Rotation::Deg270);
    }

    #[test]
    fn bar_on_right_edge_needs_quarter_turn_counter_clockwise() {
        let o = detect_fixed(&["right"], "SUMMER CAMP");
        assert_eq!(o.rotation, Rotation::Deg90);
    }

    #[test]
    fn upside_down_picture_turns_half() {
        let o = detect_fixed(&["bottom"], "SUMMER CAMP");
        assert_eq!(o.rotation, Rotation::Deg180);
    }

    #[test]
    fn dark_green_bar_counts_as_dark() {
        let mut img = RgbImage::from_pixel(200, 100, Rgb([220, 220, 220]));
        for (_, y, px) in img.enumerate_pixels_mut() {
            if y < 20 {
                *px = Rgb([0, 150, 0]);
            }
        }
        let o = detect_orientation(
            &DynamicImage::ImageRgb8(img),
            &CropConfig::default(),
            &FixedText("HEADER TEXT"),
        );

        assert_eq!(o.candidates[0].strip_mean, Some(88.0));
        assert_eq!(o.rotation, Rotation::Deg0);
        assert_eq!(o.header_text.as_deref(), Some("HEADER TEXT"));
    }

    #[test]
    fn light_strips_are_never_ocrd() {
        let ocr = Scripted::new(&["SHOULD NOT READ"]);
        let o = detect_orientation(&picture(&[]), &CropConfig::default(), &ocr);
        assert_eq!(ocr.calls.get(), 0);
        assert_eq!(o.rotation, Rotation::Deg0);
        assert!(!o.detected());
        assert!(o.candidates.iter().all(|c| c.text.is_none()));
    }

    #[test]
    fn single_word_reading_does_not_qualify() {
        let o = detect_fixed(&["left"], "SUMMER");
        assert_eq!(o.rotation, Rotation::Deg0);
        assert!(!o.detected());
    }

    #[test]
    fn equal_readings_resolve_to_smaller_angle() {
        let ocr = Scripted::new(&["AB CD", "AB CD"]);
        let o = detect_orientation(&picture(&["top", "bottom"]), &CropConfig::default(), &ocr);
        assert_eq!(ocr.calls.get(), 2);
        assert_eq!(o.rotation, Rotation::Deg0);
    }

    #[test]
    fn longer_reading_wins() {
        let ocr = Scripted::new(&["AB CD", "GRADUATION DAY"]);
        let o = detect_orientation(&picture(&["top", "bottom"]), &CropConfig::default(), &ocr);
        assert_eq!(o.rotation, Rotation::Deg180);
        assert_eq!(o.header_text.as_deref(), Some("GRADUATION DAY"));
    }

    #[test]
    fn ocr_failures_fall_back_to_zero() {
        let o = detect_orientation(&picture(&["left"]), &CropConfig::default(), &Broken);
        assert_eq!(o.rotation, Rotation::Deg0);
        assert!(!o.detected());
        assert_eq!(o.candidates.len(), 4);
    }

    #[test]
    fn tiny_image_has_no_strip_and_does_not_panic() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(5, 5, Rgb([0, 0, 0])));
        let o = detect_orientation(&img, &CropConfig::default(), &FixedText("A B"));
        assert_eq!(o.rotation, Rotation::Deg0);
        assert!(o.candidates.iter().all(|c| c.strip_mean.is_none()));
    }

    #[test]
    fn binarize_inverts_light_text() {
        let mut strip = GrayImage::from_pixel(4, 1, Luma([10]));
        strip.put_pixel(1, 0, Luma([240]));
        let out = binarize_for_ocr(&strip, 128);
        assert_eq!(out.get_pixel(0, 0), &Luma([255]));
        assert_eq!(out.get_pixel(1, 0), &Luma([0]));
    }

    #[test]
    fn mean_luma_of_uniform_strip() {
        let strip = GrayImage::from_pixel(10, 3, Luma([42]));
        assert!((mean_luma(&strip) - 42.0).abs() < f32::EPSILON);
    }
}
