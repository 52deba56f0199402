//! OCR over header strips.
//!
//! The orientation detector only needs "what text is in this strip", so the
//! engine sits behind the one-method [`TextRecognizer`] trait. The default
//! [`TesseractCli`] runs the `tesseract` executable on a temporary PNG; tests
//! and embedders can plug in anything else.

use crate::config::CropConfig;
use crate::error::{AutocropError, OcrError};
use image::GrayImage;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Reads text from a binarised header strip.
pub trait TextRecognizer {
    /// Return the raw recognised text (may be empty).
    fn recognize(&self, strip: &GrayImage) -> Result<String, OcrError>;
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for &T {
    fn recognize(&self, strip: &GrayImage) -> Result<String, OcrError> {
        (**self).recognize(strip)
    }
}

/// Runs the `tesseract` command-line tool.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    program: PathBuf,
    lang: String,
    psm: u8,
}

impl TesseractCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            lang: "eng".to_string(),
            psm: 1,
        }
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn with_psm(mut self, psm: u8) -> Self {
        self.psm = psm;
        self
    }

    pub fn from_config(config: &CropConfig) -> Self {
        Self::new(&config.tesseract_cmd)
            .with_lang(&config.ocr_lang)
            .with_psm(config.page_seg_mode)
    }

    /// Arguments for one invocation, excluding the program itself.
    fn args(&self, image_path: &std::path::Path) -> Vec<std::ffi::OsString> {
        vec![
            image_path.as_os_str().to_owned(),
            "stdout".into(),
            "-l".into(),
            self.lang.clone().into(),
            "--psm".into(),
            self.psm.to_string().into(),
        ]
    }

    /// Check that the executable runs, returning its version banner.
    pub fn probe(&self) -> Result<String, AutocropError> {
        let output = Command::new(&self.program)
            .arg("--version")
            .output()
            .map_err(|e| AutocropError::OcrUnavailable {
                program: self.program.clone(),
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(AutocropError::OcrUnavailable {
                program: self.program.clone(),
                detail: format!("--version exited with {}", output.status),
            });
        }

        // Older releases print the banner on stderr.
        let banner = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            String::from_utf8_lossy(&output.stdout).into_owned()
        };
        let first_line = banner.lines().next().unwrap_or_default().trim().to_string();
        debug!("OCR engine available: {}", first_line);
        Ok(first_line)
    }
}

impl TextRecognizer for TesseractCli {
    fn recognize(&self, strip: &GrayImage) -> Result<String, OcrError> {
        let staged = tempfile::Builder::new()
            .prefix("autocrop-strip-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError::Staging(e.to_string()))?;
        strip
            .save_with_format(staged.path(), image::ImageFormat::Png)
            .map_err(|e| OcrError::Staging(e.to_string()))?;

        let output = Command::new(&self.program)
            .args(self.args(staged.path()))
            .output()
            .map_err(|e| OcrError::Launch {
                program: self.program.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(OcrError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn from_config_uses_lang_and_psm() {
        let config = CropConfig::builder()
            .tesseract_cmd("/usr/local/bin/tesseract")
            .ocr_lang("deu")
            .page_seg_mode(6)
            .build()
            .unwrap();
        let tess = TesseractCli::from_config(&config);
        let args: Vec<String> = tess
            .args(std::path::Path::new("/tmp/strip.png"))
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(tess.program, PathBuf::from("/usr/local/bin/tesseract"));
        assert_eq!(
            args,
            vec!["/tmp/strip.png", "stdout", "-l", "deu", "--psm", "6"]
        );
    }

    #[test]
    fn missing_executable_fails_probe() {
        let tess = TesseractCli::new("/nonexistent/bin/tesseract-xyz");
        let err = tess.probe().unwrap_err();
        assert!(matches!(err, AutocropError::OcrUnavailable { .. }));
    }

    #[test]
    fn missing_executable_is_a_launch_error() {
        let tess = TesseractCli::new("/nonexistent/bin/tesseract-xyz");
        let strip = GrayImage::from_pixel(20, 4, Luma([255]));
        let err = tess.recognize(&strip).unwrap_err();
        assert!(matches!(err, OcrError::Launch { .. }));
    }
}
