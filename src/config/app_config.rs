use serde::{Deserialize, Serialize};

use crate::core::analysis::{validate_cluster_count, ClusterConfig};
use crate::error::{AnalysisError, Result};

/// Default ceiling on pixels fed to clustering
pub const DEFAULT_MAX_SAMPLES: usize = 100_000;

/// Tunables for dominant-color analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub cluster: ClusterConfig,

    /// Grid-downsample images above this many pixels; `None` clusters every pixel
    pub max_samples: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cluster: ClusterConfig::default(),
            max_samples: Some(DEFAULT_MAX_SAMPLES),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        validate_cluster_count(self.cluster.k)?;
        if self.max_samples == Some(0) {
            return Err(AnalysisError::invalid_input(
                "max_samples must be positive when set",
            ));
        }
        Ok(())
    }
}

/// External captioning program
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    /// Program name on PATH or a path to it; captioning is off when unset
    pub program: Option<String>,
    pub args: Vec<String>,
}
