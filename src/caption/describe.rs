use std::sync::Arc;

use image::RgbImage;

use crate::error::Result;

/// Produces a natural-language caption for an image
///
/// Implementations are shared across concurrent requests once loaded and must
/// not mutate the image.
pub trait Describe: Send + Sync {
    fn describe(&self, image: &RgbImage) -> Result<String>;
}

/// Builds a [`Describe`] implementation; may be slow (model weights, process checks)
pub trait CaptionLoader: Send + Sync {
    fn load(&self) -> Result<Arc<dyn Describe>>;
}

impl<F> CaptionLoader for F
where
    F: Fn() -> Result<Arc<dyn Describe>> + Send + Sync,
{
    fn load(&self) -> Result<Arc<dyn Describe>> {
        self()
    }
}
