use std::collections::HashSet;

use image::RgbImage;
use palette::Srgb;
use tracing::debug;

use crate::error::{AnalysisError, Result};

/// Flattened multiset of pixel colors used as clustering input
///
/// Order carries no meaning; duplicates do, since frequency drives dominance.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelSample {
    pixels: Vec<Srgb<u8>>,
}

impl PixelSample {
    pub fn from_pixels(pixels: Vec<Srgb<u8>>) -> Self {
        Self { pixels }
    }

    /// Every pixel of the image, row by row
    pub fn from_image(img: &RgbImage) -> Self {
        let pixels = img
            .pixels()
            .map(|p| Srgb::new(p[0], p[1], p[2]))
            .collect();
        Self { pixels }
    }

    /// Samples the image on a regular grid so that at most about `max_samples` pixels
    /// are kept. Images already under the limit are taken whole.
    pub fn from_image_sampled(img: &RgbImage, max_samples: usize) -> Self {
        let (width, height) = img.dimensions();
        let total = width as usize * height as usize;
        if max_samples == 0 || total <= max_samples {
            return Self::from_image(img);
        }

        let step = ((total as f64 / max_samples as f64).sqrt().ceil() as u32).max(1);

        let mut pixels = Vec::with_capacity(max_samples);
        for y in (0..height).step_by(step as usize) {
            for x in (0..width).step_by(step as usize) {
                let p = img.get_pixel(x, y);
                pixels.push(Srgb::new(p[0], p[1], p[2]));
            }
        }

        debug!(
            "Downsampled {}x{} image with step {} to {} pixels",
            width,
            height,
            step,
            pixels.len()
        );

        Self { pixels }
    }

    /// Builds a sample from interleaved RGB bytes
    pub fn from_raw(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(AnalysisError::invalid_input(format!(
                "image has zero size ({}x{})",
                width, height
            )));
        }

        let expected = width as usize * height as usize * 3;
        if bytes.len() != expected {
            return Err(AnalysisError::invalid_input(format!(
                "pixel buffer holds {} bytes, expected {} for a {}x{} RGB image",
                bytes.len(),
                expected,
                width,
                height
            )));
        }

        let pixels = bytes
            .chunks_exact(3)
            .map(|c| Srgb::new(c[0], c[1], c[2]))
            .collect();
        Ok(Self { pixels })
    }

    pub fn pixels(&self) -> &[Srgb<u8>] {
        &self.pixels
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Number of distinct RGB values in the sample
    pub fn distinct_colors(&self) -> usize {
        self.pixels
            .iter()
            .map(|p| (p.red, p.green, p.blue))
            .collect::<HashSet<_>>()
            .len()
    }
}
