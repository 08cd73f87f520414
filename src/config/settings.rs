use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::app_config::{AnalysisConfig, CaptionConfig};
use crate::error::{AnalysisError, Result};

/// Logging preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set
    pub level: String,

    /// Also write a timestamped log file
    pub log_to_file: bool,

    /// Directory for log files; defaults to `./logs`
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: false,
            log_dir: None,
        }
    }
}

/// Persistent settings loaded at startup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub caption: CaptionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Settings {
    /// Get the path to the settings file in the platform config directory
    pub fn get_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "smart-image-analyzer")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from the default location, or return defaults
    pub fn load() -> Self {
        let (settings, problem) = Self::load_reporting(None);
        if let Some(e) = problem {
            warn!("{}. Using defaults.", e);
        }
        settings
    }

    /// Load settings from disk, or return defaults if the file doesn't exist or is corrupted
    pub fn load_from(config_path: &Path) -> Self {
        let (settings, problem) = Self::load_reporting(Some(config_path));
        if let Some(e) = problem {
            warn!("{}. Using defaults.", e);
        }
        settings
    }

    /// Like [`Settings::load_from`], but hands back the reason for falling back to
    /// defaults instead of logging it. Lets callers report the problem once a
    /// subscriber is installed. `None` means the default location.
    pub fn load_reporting(config_path: Option<&Path>) -> (Self, Option<AnalysisError>) {
        let config_path = match config_path {
            Some(path) => path.to_path_buf(),
            None => match Self::get_config_path() {
                Some(path) => path,
                None => return (Self::default(), None),
            },
        };

        match Self::read_from(&config_path) {
            Ok(Some(settings)) => (settings, None),
            Ok(None) => (Self::default(), None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Reads a settings file; `Ok(None)` when it does not exist yet
    pub fn read_from(config_path: &Path) -> Result<Option<Self>> {
        info!("Loading settings from: {:?}", config_path);

        let contents = match fs::read_to_string(config_path) {
            Ok(contents) => contents,
            // It's normal for the file not to exist on first run
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No settings file found. Using defaults.");
                return Ok(None);
            }
            Err(e) => return Err(AnalysisError::io(config_path, e)),
        };

        let settings = serde_json::from_str::<Settings>(&contents).map_err(|source| {
            AnalysisError::InvalidSettings {
                path: config_path.to_path_buf(),
                source,
            }
        })?;
        info!("Successfully loaded settings");
        Ok(Some(settings))
    }

    /// Save settings to disk
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| AnalysisError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|source| AnalysisError::Serialization { source })?;
        fs::write(config_path, json).map_err(|e| AnalysisError::io(config_path, e))?;

        info!("Settings saved to: {:?}", config_path);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.analysis.validate()
    }
}
