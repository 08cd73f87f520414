pub mod analysis;
pub mod image;

pub use self::analysis::*;
pub use self::image::*;
