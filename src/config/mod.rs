mod app_config;
mod settings;

pub use app_config::{AnalysisConfig, CaptionConfig, DEFAULT_MAX_SAMPLES};
pub use settings::{LoggingConfig, Settings};
