use image::{ GrayImage, ImageFormat };
use log::debug;

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use crate::config::OcrConfig;
use crate::error::LprError;

/// Tesseract page segmentation modes the recognizer can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSegMode {
    SingleBlock,
    SingleLine,
    SingleWord,
    RawLine,
}

impl PageSegMode {
    pub fn psm(self) -> u8 {
        match self {
            PageSegMode::SingleBlock => 6,
            PageSegMode::SingleLine => 7,
            PageSegMode::SingleWord => 8,
            PageSegMode::RawLine => 13,
        }
    }
}

/// Anything that turns a binarized raster into text
pub trait OcrEngine: Send + Sync {
    fn ocr(&self, image: &GrayImage, whitelist: &str, mode: PageSegMode) -> Result<String, LprError>;
}

/// Runs the `tesseract` executable on a temporary png
#[derive(Debug, Clone)]
pub struct TesseractCli {
    bin: PathBuf,
    language: String,
    engine_mode: u8,
}

impl TesseractCli {

    pub fn new(config: &OcrConfig) -> Self {
        Self {
            bin: config.tesseract_bin.clone(),
            language: config.language.clone(),
            engine_mode: config.engine_mode,
        }
    }

    fn args(&self, whitelist: &str, mode: PageSegMode) -> Vec<String> {
        vec![
            "stdout".to_string(),
            "--oem".to_string(), self.engine_mode.to_string(),
            "--psm".to_string(), mode.psm().to_string(),
            "-l".to_string(), self.language.clone(),
            "-c".to_string(), format!("tessedit_char_whitelist={}", whitelist),
        ]
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new(&OcrConfig::default())
    }
}

impl OcrEngine for TesseractCli {

    fn ocr(&self, image: &GrayImage, whitelist: &str, mode: PageSegMode) -> Result<String, LprError> {
        let mut tmp = tempfile::Builder::new().suffix(".png").tempfile()?;
        image.write_to(&mut tmp, ImageFormat::Png)?;
        tmp.flush()?;

        let output = Command::new(&self.bin)
            .arg(tmp.path())
            .args(self.args(whitelist, mode))
            .output()
            .map_err(|e| LprError::ocr(format!("failed to run {}: {}", self.bin.display(), e)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LprError::ocr(format!("{} exited with {}: {}", self.bin.display(), output.status, stderr.trim())));
        }
        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("tesseract returned {:?}", text);
        Ok(text)
    }
}
