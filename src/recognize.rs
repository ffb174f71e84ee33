use image::GrayImage;
use imageproc::contrast::{ self, ThresholdType };
use log::debug;

use crate::config::OcrConfig;
use crate::error::LprError;
use crate::ocr::{ OcrEngine, PageSegMode };
use crate::raster::Raster;

/// Reads the characters off a cropped plate
pub struct TextRecognizer<E> {
    engine: E,
    whitelist: String,
    mode: PageSegMode,
}

impl<E: OcrEngine> TextRecognizer<E> {

    pub fn new(engine: E, config: &OcrConfig) -> Self {
        Self { engine, whitelist: config.whitelist.clone(), mode: config.page_seg_mode }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// gray -> otsu binarization -> ocr -> keep alphanumerics only.
    /// An empty string means the engine saw no text.
    pub fn recognize(&self, plate_region: &Raster) -> Result<String, LprError> {
        let binary = binarize(&plate_region.to_luma());
        let raw = self.engine.ocr(&binary, &self.whitelist, self.mode)?;
        let cleaned = sanitize(&raw);
        debug!("ocr {:?} -> {:?}", raw, cleaned);
        Ok(cleaned)
    }
}

/// Two valued image, 255 above the otsu level and 0 elsewhere
pub fn binarize(gray: &GrayImage) -> GrayImage {
    let level = contrast::otsu_level(gray);
    contrast::threshold(gray, level, ThresholdType::Binary)
}

pub fn sanitize(text: &str) -> String {
    text.chars().filter(|c| c.is_alphanumeric()).collect()
}
