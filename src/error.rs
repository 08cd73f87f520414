//! Error types for the image analyzer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for analyzer operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors raised while turning an upload into a caption and a dominant color
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Malformed or empty pixel data, out-of-range channel values, or an invalid `k`
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The caption collaborator failed to initialize or to produce a caption
    #[error("Caption model unavailable: {reason}")]
    ModelUnavailable {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Upload bytes could not be decoded into pixels
    #[error("Failed to decode image")]
    ImageDecode {
        #[source]
        source: image::ImageError,
    },

    /// Upload was a recognized image, but not JPEG or PNG
    #[error("Unsupported image format: {format}")]
    UnsupportedFormat { format: String },

    /// Settings file exists but is not valid settings JSON
    #[error("Invalid settings file {path:?}: {source}")]
    InvalidSettings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A report or settings value could not be rendered as JSON
    #[error("Serialization failed")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    /// Reading an upload or settings file failed
    #[error("I/O error on {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AnalysisError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Caption failure without an underlying error
    pub fn model_unavailable(reason: impl Into<String>) -> Self {
        Self::ModelUnavailable {
            reason: reason.into(),
            source: None,
        }
    }

    /// Caption failure carrying the collaborator's own error
    pub fn model_unavailable_with<E>(reason: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ModelUnavailable {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Every variant ends the current request; only model failures are worth alerting on
    pub fn is_fatal(&self) -> bool {
        matches!(self, AnalysisError::ModelUnavailable { .. })
    }

    /// Get user-friendly error description for display
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::InvalidInput { reason } => {
                format!("The image could not be analyzed: {}.", reason)
            }
            AnalysisError::ModelUnavailable { .. } => {
                "The captioning model is unavailable. Please try again later.".to_string()
            }
            AnalysisError::ImageDecode { .. } => {
                "Could not read the image. Please upload a valid JPEG or PNG file.".to_string()
            }
            AnalysisError::UnsupportedFormat { format } => {
                format!("{} images are not supported. Please upload a JPEG or PNG file.", format)
            }
            AnalysisError::InvalidSettings { path, .. } => {
                format!("Settings file {} is invalid; defaults were used.", path.display())
            }
            AnalysisError::Serialization { .. } => {
                "The result could not be formatted as JSON.".to_string()
            }
            AnalysisError::Io { path, .. } => {
                format!("Could not read {}.", path.display())
            }
        }
    }
}

impl From<image::ImageError> for AnalysisError {
    fn from(source: image::ImageError) -> Self {
        Self::ImageDecode { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_message() {
        let err = AnalysisError::invalid_input("cluster count must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid input: cluster count must be at least 1"
        );
        assert!(err.user_message().contains("cluster count must be at least 1"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_serialization_is_not_an_input_problem() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AnalysisError::Serialization { source };
        assert!(!err.user_message().contains("could not be analyzed"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_model_unavailable_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "blip missing");
        let err = AnalysisError::model_unavailable_with("load failed", io);
        assert!(err.is_fatal());
        assert!(std::error::Error::source(&err).is_some());
    }
}
