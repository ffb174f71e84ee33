use image::GrayImage;

use crate::config::PipelineConfig;
use crate::raster::Raster;
use crate::utils;

/// Turns a decoded photo into a denoised, contrast normalized grayscale raster
#[derive(Debug, Clone)]
pub struct Preprocessor {
    blur_kernel_size: u32,
}

impl Preprocessor {

    pub fn new(config: &PipelineConfig) -> Self {
        Self { blur_kernel_size: config.blur_kernel_size }
    }

    /// gray -> gaussian blur -> histogram equalization, same size as the input
    pub fn preprocess(&self, raster: &Raster) -> Raster {
        Raster::Grayscale(self.preprocess_luma(raster))
    }

    pub(crate) fn preprocess_luma(&self, raster: &Raster) -> GrayImage {
        let gray = raster.to_luma();
        let blurred = utils::gaussian_blur_fixed(&gray, self.blur_kernel_size);
        utils::equalize_hist(&blurred)
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}
