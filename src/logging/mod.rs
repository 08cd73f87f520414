//! Logging for the image analyzer
//!
//! This module provides:
//! - Custom log formatting with bracketed output
//! - Console logging on stderr, optionally mirrored to a timestamped file

mod formatter;
mod setup;

pub use formatter::BracketedFormatter;
pub use setup::setup_logging;
