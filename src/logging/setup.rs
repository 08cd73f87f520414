use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::formatter::BracketedFormatter;
use crate::config::LoggingConfig;

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Keep our crate at the configured level, quiet the codec crates
        let base = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
        match "image=warn".parse::<Directive>() {
            Ok(directive) => base.add_directive(directive),
            Err(_) => base,
        }
    })
}

/// Installs the global subscriber: stderr always, plus a timestamped file when enabled.
/// Returns the log file path when one was created.
pub fn setup_logging(config: &LoggingConfig) -> io::Result<Option<PathBuf>> {
    let stderr_layer = fmt::layer()
        .event_format(BracketedFormatter::console())
        .with_writer(io::stderr);

    let mut log_path = None;
    let file_layer = if config.log_to_file {
        let log_dir = match &config.log_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?.join("logs"),
        };
        fs::create_dir_all(&log_dir)?;

        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = log_dir.join(format!("image_analyzer_{}.log", timestamp));

        let file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        log_path = Some(path);
        Some(
            fmt::layer()
                .event_format(BracketedFormatter::new())
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(build_filter(&config.level))
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e.to_string()))?;

    if let Some(path) = &log_path {
        info!("Log file created at: {:?}", path);
    }

    Ok(log_path)
}
