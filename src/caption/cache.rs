use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use super::describe::{CaptionLoader, Describe};
use crate::error::{AnalysisError, Result};

/// Load-once holder for the caption model
///
/// The first caller of [`ModelCache::get`] runs the loader while holding the lock;
/// concurrent callers block on it and then reuse the loaded instance. A failed load
/// is not cached.
pub struct ModelCache {
    loader: Box<dyn CaptionLoader>,
    model: Mutex<Option<Arc<dyn Describe>>>,
}

impl ModelCache {
    pub fn new(loader: impl CaptionLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            model: Mutex::new(None),
        }
    }

    /// Cache wrapping an already loaded model
    pub fn preloaded(model: Arc<dyn Describe>) -> Self {
        Self {
            loader: Box::new(move || -> Result<Arc<dyn Describe>> {
                Err(AnalysisError::model_unavailable("preloaded model has no loader"))
            }),
            model: Mutex::new(Some(model)),
        }
    }

    /// Cache whose loads always fail; for color-only analysis
    pub fn disabled() -> Self {
        Self::new(|| -> Result<Arc<dyn Describe>> {
            Err(AnalysisError::model_unavailable("captioning is disabled"))
        })
    }

    pub fn get(&self) -> Result<Arc<dyn Describe>> {
        let mut slot = self
            .model
            .lock()
            .map_err(|_| AnalysisError::model_unavailable("caption model lock poisoned"))?;

        if let Some(model) = slot.as_ref() {
            return Ok(Arc::clone(model));
        }

        info!("Loading caption model");
        let model = self.loader.load().map_err(|e| match e {
            e @ AnalysisError::ModelUnavailable { .. } => e,
            other => AnalysisError::model_unavailable_with("caption model failed to load", other),
        });

        match model {
            Ok(model) => {
                info!("Caption model loaded");
                *slot = Some(Arc::clone(&model));
                Ok(model)
            }
            Err(e) => {
                warn!("Caption model failed to load: {}", e);
                Err(e)
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }
}
