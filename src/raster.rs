use image::{ imageops, DynamicImage, GrayImage, RgbImage, RgbaImage };

use std::fmt;

use crate::error::LprError;

/// A decoded image with an explicit colour depth
#[derive(Debug, Clone, PartialEq)]
pub enum Raster {
    Grayscale(GrayImage),
    Color3(RgbImage),
    Color4(RgbaImage),
}

impl Raster {

    /// Decode raw bytes of any format `image` understands
    pub fn decode(bytes: &[u8]) -> Result<Self, LprError> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from(img))
    }

    pub fn channels(&self) -> u8 {
        match self {
            Raster::Grayscale(_) => 1,
            Raster::Color3(_) => 3,
            Raster::Color4(_) => 4,
        }
    }

    /// (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Raster::Grayscale(img) => img.dimensions(),
            Raster::Color3(img) => img.dimensions(),
            Raster::Color4(img) => img.dimensions(),
        }
    }

    /// Single channel copy using the `image` luma weights
    pub fn to_luma(&self) -> GrayImage {
        match self {
            Raster::Grayscale(img) => img.clone(),
            Raster::Color3(img) => imageops::grayscale(img),
            Raster::Color4(img) => imageops::grayscale(img),
        }
    }

    /// Copy out the region under `bbox`, keeping the colour depth
    pub fn crop(&self, bbox: &BoundingBox) -> Result<Raster, LprError> {
        let (width, height) = self.dimensions();
        if !bbox.fits_within(width, height) {
            return Err(LprError::crop(format!("{} does not fit a {}x{} raster", bbox, width, height)));
        }
        let BoundingBox { x, y, width, height } = *bbox;
        let cropped = match self {
            Raster::Grayscale(img) => Raster::Grayscale(imageops::crop_imm(img, x, y, width, height).to_image()),
            Raster::Color3(img) => Raster::Color3(imageops::crop_imm(img, x, y, width, height).to_image()),
            Raster::Color4(img) => Raster::Color4(imageops::crop_imm(img, x, y, width, height).to_image()),
        };
        Ok(cropped)
    }
}

impl From<DynamicImage> for Raster {
    fn from(img: DynamicImage) -> Self {
        match img {
            DynamicImage::ImageLuma8(buf) => Raster::Grayscale(buf),
            DynamicImage::ImageRgb8(buf) => Raster::Color3(buf),
            DynamicImage::ImageRgba8(buf) => Raster::Color4(buf),
            // 16 bit, float and luma+alpha layouts collapse onto the nearest 8 bit variant
            other => {
                let color = other.color();
                if !color.has_color() {
                    Raster::Grayscale(other.to_luma8())
                } else if color.has_alpha() {
                    Raster::Color4(other.to_rgba8())
                } else {
                    Raster::Color3(other.to_rgb8())
                }
            }
        }
    }
}

impl From<GrayImage> for Raster {
    fn from(img: GrayImage) -> Self {
        Raster::Grayscale(img)
    }
}

impl From<RgbImage> for Raster {
    fn from(img: RgbImage) -> Self {
        Raster::Color3(img)
    }
}

impl From<RgbaImage> for Raster {
    fn from(img: RgbaImage) -> Self {
        Raster::Color4(img)
    }
}

/// Axis aligned region, x/y is the top left pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {

    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0 && self.height > 0
            && self.x as u64 + self.width as u64 <= width as u64
            && self.y as u64 + self.height as u64 <= height as u64
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}x{})", self.x, self.y, self.width, self.height)
    }
}
