use std::path::PathBuf;

use crate::error::LprError;
use crate::ocr::PageSegMode;

/// Uppercase latin letters and digits, the only characters a plate may carry
pub const PLATE_WHITELIST: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Thresholds shared by the preprocessor and the localizer
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// side of the square gaussian kernel, odd
    pub blur_kernel_size: u32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// how many of the largest contours are examined
    pub max_candidates: usize,
    /// polygon deviation tolerance as a fraction of the contour perimeter
    pub polygon_tolerance: f64,
    /// exclusive lower bound on width / height
    pub min_aspect_ratio: f64,
    /// exclusive upper bound on width / height
    pub max_aspect_ratio: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            blur_kernel_size: 5,
            canny_low: 50.0,
            canny_high: 150.0,
            max_candidates: 10,
            polygon_tolerance: 0.02,
            min_aspect_ratio: 2.5,
            max_aspect_ratio: 5.0,
        }
    }
}

impl PipelineConfig {

    pub fn validate(&self) -> Result<(), LprError> {
        if self.blur_kernel_size == 0 || self.blur_kernel_size % 2 == 0 {
            return Err(LprError::config(format!("blur kernel size must be odd, got {}", self.blur_kernel_size)));
        }
        if !(self.canny_low < self.canny_high) {
            return Err(LprError::config(format!("canny thresholds out of order: {} >= {}", self.canny_low, self.canny_high)));
        }
        if self.max_candidates == 0 {
            return Err(LprError::config("max_candidates must be at least 1"));
        }
        if !(self.polygon_tolerance > 0.0) {
            return Err(LprError::config("polygon tolerance must be positive"));
        }
        if !(self.min_aspect_ratio < self.max_aspect_ratio) {
            return Err(LprError::config(format!("aspect ratio bounds out of order: {} >= {}",
                self.min_aspect_ratio, self.max_aspect_ratio)));
        }
        Ok(())
    }
}

/// How the external ocr engine is invoked
#[derive(Debug, Clone, PartialEq)]
pub struct OcrConfig {
    pub whitelist: String,
    pub page_seg_mode: PageSegMode,
    /// tesseract `--oem`, 3 lets it pick the engine
    pub engine_mode: u8,
    pub language: String,
    pub tesseract_bin: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            whitelist: PLATE_WHITELIST.to_string(),
            page_seg_mode: PageSegMode::SingleLine,
            engine_mode: 3,
            language: "eng".to_string(),
            tesseract_bin: PathBuf::from("tesseract"),
        }
    }
}


#[cfg(test)]
mod test {

    use super::PipelineConfig;

    #[test]
    fn default_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_thresholds() {
        let even_kernel = PipelineConfig { blur_kernel_size: 4, ..Default::default() };
        assert!(even_kernel.validate().is_err());

        let swapped = PipelineConfig { canny_low: 150.0, canny_high: 50.0, ..Default::default() };
        assert!(swapped.validate().is_err());

        let ratios = PipelineConfig { min_aspect_ratio: 5.0, max_aspect_ratio: 5.0, ..Default::default() };
        assert!(ratios.validate().is_err());
    }
}
