//! Output stage: trim, encode as JPEG, and name files from a run counter.
//!
//! The counter lives in [`OutputWriter`] and only advances after a file is
//! fully written, so names stay contiguous (`final_image_1.jpg`,
//! `final_image_2.jpg`, …) across every page of the run.

use super::gray::to_gray;
use crate::config::CropConfig;
use crate::error::AutocropError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Crop away pure-white margins. An all-white image is returned unchanged.
pub fn trim_border(image: &DynamicImage) -> DynamicImage {
    let gray = to_gray(image);
    let mut bounds: Option<(u32, u32, u32, u32)> = None;

    for (x, y, px) in gray.enumerate_pixels() {
        if px.0[0] == u8::MAX {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }

    match bounds {
        Some((x0, y0, x1, y1)) => {
            let (w, h) = (x1 - x0 + 1, y1 - y0 + 1);
            if (w, h) == (image.width(), image.height()) {
                image.clone()
            } else {
                debug!("Trimmed border → {}x{} at +{}+{}", w, h, x0, y0);
                image.crop_imm(x0, y0, w, h)
            }
        }
        None => image.clone(),
    }
}

/// Writes numbered JPEGs into one directory.
#[derive(Debug)]
pub struct OutputWriter {
    dir: PathBuf,
    prefix: String,
    quality: u8,
    next_index: usize,
}

impl OutputWriter {
    /// Writer starting at index 1. Does not touch the file system.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, quality: u8) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            quality: quality.clamp(1, 100),
            next_index: 1,
        }
    }

    /// Writer for `config`, creating the output directory if needed.
    pub fn create(config: &CropConfig) -> Result<Self, AutocropError> {
        std::fs::create_dir_all(&config.output_dir).map_err(|e| {
            AutocropError::OutputWriteFailed {
                path: config.output_dir.clone(),
                source: e,
            }
        })?;
        Ok(Self::new(
            &config.output_dir,
            &config.file_prefix,
            config.jpeg_quality,
        ))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of files written so far.
    pub fn written(&self) -> usize {
        self.next_index - 1
    }

    /// Path the next call to [`write`](Self::write) will use.
    pub fn next_path(&self) -> PathBuf {
        self.dir.join(format!("{}{}.jpg", self.prefix, self.next_index))
    }

    /// Encode `image` and advance the counter. Returns `(index, path)`.
    pub fn write(&mut self, image: &DynamicImage) -> Result<(usize, PathBuf), AutocropError> {
        let index = self.next_index;
        let path = self.next_path();

        let file = File::create(&path).map_err(|e| AutocropError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;
        let mut out = BufWriter::new(file);

        // JPEG has no alpha channel.
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
        rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, self.quality))
            .map_err(|e| match e {
                ImageError::IoError(source) => AutocropError::OutputWriteFailed {
                    path: path.clone(),
                    source,
                },
                other => AutocropError::EncodeFailed {
                    path: path.clone(),
                    detail: other.to_string(),
                },
            })?;
        out.flush().map_err(|e| AutocropError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;

        debug!(
            "Wrote {} ({}x{} px)",
            path.display(),
            rgb.width(),
            rgb.height()
        );
        self.next_index += 1;
        Ok((index, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn trim_removes_white_margin() {
        let mut img = RgbImage::from_pixel(50, 40, Rgb([255, 255, 255]));
        for y in 5..30 {
            for x in 10..45 {
                img.put_pixel(x, y, Rgb([100, 50, 20]));
            }
        }
        let trimmed = trim_border(&DynamicImage::ImageRgb8(img));
        assert_eq!((trimmed.width(), trimmed.height()), (35, 25));
        // Colour survives trimming.
        assert_eq!(trimmed.to_rgb8().get_pixel(0, 0), &Rgb([100, 50, 20]));
    }

    #[test]
    fn trim_keeps_all_white_image() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(12, 9, Rgb([255, 255, 255])));
        let trimmed = trim_border(&img);
        assert_eq!((trimmed.width(), trimmed.height()), (12, 9));
    }

    #[test]
    fn trim_keeps_image_without_margin() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(12, 9, Rgb([0, 0, 0])));
        let trimmed = trim_border(&img);
        assert_eq!((trimmed.width(), trimmed.height()), (12, 9));
    }

    #[test]
    fn counter_names_files_in_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = OutputWriter::new(dir.path(), "final_image_", 75);
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 8, Rgb([30, 60, 90])));

        let (i1, p1) = writer.write(&img).unwrap();
        let (i2, p2) = writer.write(&img).unwrap();

        assert_eq!((i1, i2), (1, 2));
        assert_eq!(p1, dir.path().join("final_image_1.jpg"));
        assert_eq!(p2, dir.path().join("final_image_2.jpg"));
        assert!(p1.exists() && p2.exists());
        assert_eq!(writer.written(), 2);
        assert_eq!(writer.next_path(), dir.path().join("final_image_3.jpg"));
    }

    #[test]
    fn jpeg_round_trip_preserves_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = OutputWriter::new(dir.path(), "rt_", 90);
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(123, 45, Rgb([200, 10, 10])));

        let (_, path) = writer.write(&img).unwrap();
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (123, 45));
    }

    #[test]
    fn alpha_images_are_flattened() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = OutputWriter::new(dir.path(), "a_", 75);
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([1, 2, 3, 128])));
        assert!(writer.write(&img).is_ok());
    }

    #[test]
    fn failed_write_does_not_advance_counter() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no").join("such").join("dir");
        let mut writer = OutputWriter::new(&missing, "final_image_", 75);
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])));

        let err = writer.write(&img).unwrap_err();
        assert!(matches!(err, AutocropError::OutputWriteFailed { .. }));
        assert_eq!(writer.written(), 0);
    }

    #[test]
    fn create_makes_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("crops");
        let config = CropConfig::builder().output_dir(&out).build().unwrap();
        let writer = OutputWriter::create(&config).unwrap();
        assert!(out.is_dir());
        assert_eq!(writer.dir(), out.as_path());
    }
}
