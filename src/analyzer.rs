use std::fmt;
use std::thread;

use image::RgbImage;
use serde::Serialize;
use tracing::{info, info_span, warn};

use crate::caption::ModelCache;
use crate::config::AnalysisConfig;
use crate::core::analysis::{ColorClusterer, ColorName, ColorNamer};
use crate::core::image::{decode_upload, PixelSample};
use crate::error::{AnalysisError, Result};

/// Dominant color of one image
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorReport {
    pub rgb: (u8, u8, u8),
    pub name: ColorName,
    /// Share of sampled pixels in the dominant cluster
    pub coverage: f32,
    pub sampled_pixels: usize,
}

impl ColorReport {
    pub fn hex(&self) -> String {
        let (r, g, b) = self.rgb;
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

/// Everything shown to the user for one upload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub caption: String,
    pub dominant_rgb: (u8, u8, u8),
    pub dominant_name: ColorName,
    pub hex: String,
    pub coverage: f32,
}

impl AnalysisReport {
    fn new(caption: String, color: ColorReport) -> Self {
        Self {
            caption,
            dominant_rgb: color.rgb,
            dominant_name: color.name,
            hex: color.hex(),
            coverage: color.coverage,
        }
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = self.dominant_rgb;
        writeln!(f, "Description: {}", self.caption)?;
        write!(
            f,
            "Dominant color detected: {} (RGB: ({}, {}, {}))",
            self.dominant_name, r, g, b
        )
    }
}

/// Per-request pipeline: caption and dominant color for one image
pub struct ImageAnalyzer {
    config: AnalysisConfig,
    captions: ModelCache,
}

impl ImageAnalyzer {
    pub fn new(config: AnalysisConfig, captions: ModelCache) -> Self {
        Self { config, captions }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Samples, clusters and names the dominant color
    pub fn analyze_colors(&self, image: &RgbImage) -> Result<ColorReport> {
        let _span = info_span!("analyze_colors").entered();

        let sample = match self.config.max_samples {
            Some(limit) => PixelSample::from_image_sampled(image, limit),
            None => PixelSample::from_image(image),
        };

        let dominant = ColorClusterer::new(self.config.cluster).dominant(&sample)?;
        let name = ColorNamer::name(dominant.rgb);

        info!(
            "Dominant color {} ({}, {}, {}) covers {:.1}% of {} pixels",
            name,
            dominant.rgb.red,
            dominant.rgb.green,
            dominant.rgb.blue,
            dominant.coverage * 100.0,
            sample.len()
        );

        Ok(ColorReport {
            rgb: (dominant.rgb.red, dominant.rgb.green, dominant.rgb.blue),
            name,
            coverage: dominant.coverage,
            sampled_pixels: sample.len(),
        })
    }

    fn caption(&self, image: &RgbImage) -> Result<String> {
        let _span = info_span!("caption").entered();

        let caption = self.captions.get()?.describe(image).map_err(|e| match e {
            e @ AnalysisError::ModelUnavailable { .. } => e,
            other => AnalysisError::model_unavailable_with("caption inference failed", other),
        })?;
        let caption = caption.trim();
        if caption.is_empty() {
            return Err(AnalysisError::model_unavailable("caption model returned an empty caption"));
        }
        Ok(caption.to_string())
    }

    /// Captions the image and finds its dominant color concurrently
    ///
    /// Invalid color input is reported ahead of caption failures, and no partial
    /// report is ever returned.
    pub fn analyze(&self, image: &RgbImage) -> Result<AnalysisReport> {
        // Requests that can only be rejected never reach the caption model
        self.config.validate()?;
        if image.width() == 0 || image.height() == 0 {
            return Err(AnalysisError::invalid_input("image has no pixels"));
        }

        let (caption, color) = thread::scope(|s| {
            let caption = s.spawn(|| self.caption(image));
            let color = self.analyze_colors(image);
            let caption = caption.join().unwrap_or_else(|_| {
                Err(AnalysisError::model_unavailable("caption thread panicked"))
            });
            (caption, color)
        });

        let color = color?;
        let caption = caption.map_err(|e| {
            warn!("Caption generation failed: {}", e);
            e
        })?;

        Ok(AnalysisReport::new(caption, color))
    }

    /// Decodes JPEG/PNG upload bytes and analyzes them
    pub fn analyze_upload(&self, bytes: &[u8]) -> Result<AnalysisReport> {
        let image = decode_upload(bytes)?;
        self.analyze(&image)
    }
}
