//! Linear-color image buffer and its 8-bit encoding.

use std::path::Path;

use image::{ImageFormat, RgbImage};
use umbra_core::Color;
use umbra_math::Interval;

use crate::{RenderError, RenderResult};

/// Display gamma applied when encoding to 8 bits.
pub const GAMMA: f32 = 2.2;

/// Map one linear channel to an 8-bit value: `round(clamp(c)^(1/2.2) * 255)`.
#[inline]
pub fn encode_channel(linear: f32) -> u8 {
    let c = Interval::UNIT.clamp(linear);
    (c.powf(1.0 / GAMMA) * 255.0).round() as u8
}

/// Convert a linear color to gamma-encoded RGB bytes.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    [
        encode_channel(color.x),
        encode_channel(color.y),
        encode_channel(color.z),
    ]
}

/// Row-major image of linear colors.
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Wrap rendered rows; `pixels` must hold `width * height` colors.
    pub(crate) fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Gamma-encode into packed RGB bytes.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|&c| color_to_rgb(c)).collect()
    }

    /// Encode and write the image.
    ///
    /// The format follows the file extension; unknown or missing extensions
    /// are written as BMP.
    pub fn save(&self, path: &Path) -> RenderResult<()> {
        let image = RgbImage::from_raw(self.width, self.height, self.to_rgb8())
            .ok_or_else(|| RenderError::InvalidConfig("image buffer size mismatch".to_string()))?;

        let format = ImageFormat::from_path(path).unwrap_or(ImageFormat::Bmp);
        image
            .save_with_format(path, format)
            .map_err(|source| RenderError::Image {
                path: path.to_path_buf(),
                source,
            })?;

        log::info!(
            "Saved {}x{} image to {} ({:?})",
            self.width,
            self.height,
            path.display(),
            format
        );
        Ok(())
    }
}
