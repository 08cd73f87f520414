//! Caption generation seam
//!
//! The captioning model itself is an external collaborator. This module provides:
//! - [`Describe`]: the caption contract
//! - [`CaptionLoader`]: how a model gets built
//! - [`ModelCache`]: load-once, shared-read access to the model
//! - [`CommandCaptioner`]: an adapter for an external captioning program

mod cache;
mod command;
mod describe;

pub use cache::ModelCache;
pub use command::{CommandCaptionLoader, CommandCaptioner};
pub use describe::{CaptionLoader, Describe};
