//! # Smart Image Analyzer
//!
//! Describes an uploaded image and reports its dominant color.
//!
//! - [`core::analysis::ColorClusterer`] groups pixels with seeded k-means and picks the
//!   largest group
//! - [`core::analysis::ColorNamer`] maps an RGB triple to a basic color name
//! - [`caption`] wraps the external captioning model behind a load-once cache
//! - [`ImageAnalyzer`] runs both for one image and builds an [`AnalysisReport`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use smart_image_analyzer::{AnalysisConfig, ImageAnalyzer, ModelCache};
//! use smart_image_analyzer::core::image::load_upload;
//! use std::path::Path;
//!
//! let analyzer = ImageAnalyzer::new(AnalysisConfig::default(), ModelCache::disabled());
//! let image = load_upload(Path::new("photo.jpg"))?;
//! let color = analyzer.analyze_colors(&image)?;
//! println!("{} {:?}", color.name, color.rgb);
//! # Ok::<(), smart_image_analyzer::AnalysisError>(())
//! ```

pub mod analyzer;
pub mod caption;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;

pub use analyzer::{AnalysisReport, ColorReport, ImageAnalyzer};
pub use caption::{CaptionLoader, CommandCaptionLoader, Describe, ModelCache};
pub use config::{AnalysisConfig, CaptionConfig, LoggingConfig, Settings};
pub use error::{AnalysisError, Result};
