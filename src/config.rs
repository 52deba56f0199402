//! Configuration types for sub-image extraction.
//!
//! All run behaviour is controlled through [`CropConfig`], built via its
//! [`CropConfigBuilder`]. The defaults reproduce the classic tool exactly:
//! 300 DPI rasterisation, a luma threshold of 200, a 5000 px² area floor, a
//! 10 % header strip and `final_image_<n>.jpg` in the working directory.

use crate::error::AutocropError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Configuration for one autocrop run.
///
/// Built via [`CropConfig::builder()`] or using [`CropConfig::default()`].
///
/// # Example
/// ```rust
/// use autocrop::CropConfig;
///
/// let config = CropConfig::builder()
///     .dpi(200)
///     .output_dir("out")
///     .min_region_area(8000.0)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 200);
/// ```
#[derive(Clone)]
pub struct CropConfig {
    /// Rendering DPI used when rasterising each PDF page. Range: 72–600. Default: 300.
    pub dpi: u32,

    /// Maximum rendered page dimension in pixels. Default: 10 000.
    ///
    /// Caps either edge independent of DPI so an oversized page cannot
    /// exhaust memory.
    pub max_rendered_pixels: u32,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Luma above which a pixel counts as page background. Default: 200.
    pub foreground_threshold: u8,

    /// Minimum contour area (px²) for a region to count as a sub-image. Default: 5000.
    pub min_region_area: f64,

    /// Height of the header strip as a fraction of the rotated height. Default: 0.10.
    pub header_fraction: f32,

    /// Mean strip luma below which the strip is a dark header bar. Default: 100.
    pub dark_mean_max: f32,

    /// Threshold for the inverted binarisation applied before OCR. Default: 128.
    pub ocr_binarize_threshold: u8,

    /// OCR executable. Default: `tesseract` (looked up on `PATH`).
    pub tesseract_cmd: PathBuf,

    /// OCR language passed as `-l`. Default: `eng`.
    pub ocr_lang: String,

    /// Tesseract page segmentation mode passed as `--psm`. Default: 1.
    pub page_seg_mode: u8,

    /// Crop pure-white borders after rotation. Default: true.
    pub trim_border: bool,

    /// JPEG quality, 1–100. Default: 75.
    pub jpeg_quality: u8,

    /// Directory receiving the output JPEGs. Default: the working directory.
    pub output_dir: PathBuf,

    /// Output file name prefix. Default: `final_image_`.
    pub file_prefix: String,

    /// Optional per-page / per-image progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            max_rendered_pixels: 10_000,
            password: None,
            foreground_threshold: 200,
            min_region_area: 5000.0,
            header_fraction: 0.10,
            dark_mean_max: 100.0,
            ocr_binarize_threshold: 128,
            tesseract_cmd: PathBuf::from("tesseract"),
            ocr_lang: "eng".to_string(),
            page_seg_mode: 1,
            trim_border: true,
            jpeg_quality: 75,
            output_dir: PathBuf::from("."),
            file_prefix: "final_image_".to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for CropConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CropConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("foreground_threshold", &self.foreground_threshold)
            .field("min_region_area", &self.min_region_area)
            .field("header_fraction", &self.header_fraction)
            .field("dark_mean_max", &self.dark_mean_max)
            .field("ocr_binarize_threshold", &self.ocr_binarize_threshold)
            .field("tesseract_cmd", &self.tesseract_cmd)
            .field("ocr_lang", &self.ocr_lang)
            .field("page_seg_mode", &self.page_seg_mode)
            .field("trim_border", &self.trim_border)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("output_dir", &self.output_dir)
            .field("file_prefix", &self.file_prefix)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn CropProgressCallback>"),
            )
            .finish()
    }
}

impl CropConfig {
    /// Create a new builder for `CropConfig`.
    pub fn builder() -> CropConfigBuilder {
        CropConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`CropConfig`].
#[derive(Debug)]
pub struct CropConfigBuilder {
    config: CropConfig,
}

impl CropConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn foreground_threshold(mut self, t: u8) -> Self {
        self.config.foreground_threshold = t;
        self
    }

    pub fn min_region_area(mut self, area: f64) -> Self {
        self.config.min_region_area = area.max(0.0);
        self
    }

    pub fn header_fraction(mut self, fraction: f32) -> Self {
        self.config.header_fraction = fraction;
        self
    }

    pub fn dark_mean_max(mut self, mean: f32) -> Self {
        self.config.dark_mean_max = mean.clamp(0.0, 255.0);
        self
    }

    pub fn ocr_binarize_threshold(mut self, t: u8) -> Self {
        self.config.ocr_binarize_threshold = t;
        self
    }

    pub fn tesseract_cmd(mut self, cmd: impl Into<PathBuf>) -> Self {
        self.config.tesseract_cmd = cmd.into();
        self
    }

    pub fn ocr_lang(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_lang = lang.into();
        self
    }

    pub fn page_seg_mode(mut self, psm: u8) -> Self {
        self.config.page_seg_mode = psm.min(13);
        self
    }

    pub fn trim_border(mut self, v: bool) -> Self {
        self.config.trim_border = v;
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.file_prefix = prefix.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CropConfig, AutocropError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 600 {
            return Err(AutocropError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if c.jpeg_quality == 0 || c.jpeg_quality > 100 {
            return Err(AutocropError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        if !(c.header_fraction > 0.0 && c.header_fraction <= 0.5) {
            return Err(AutocropError::InvalidConfig(format!(
                "Header fraction must be in (0, 0.5], got {}",
                c.header_fraction
            )));
        }
        if c.file_prefix.is_empty() {
            return Err(AutocropError::InvalidConfig(
                "Output file prefix must not be empty".into(),
            ));
        }
        if c.ocr_lang.trim().is_empty() {
            return Err(AutocropError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
