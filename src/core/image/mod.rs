mod loader;
mod pixel_sample;

pub use loader::{decode_upload, load_upload};
pub use pixel_sample::PixelSample;
