use std::env;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;

use image::{ImageFormat, RgbImage};
use tracing::{debug, info};

use super::describe::{CaptionLoader, Describe};
use crate::error::{AnalysisError, Result};

/// Runs an external captioning program (for example a BLIP inference script)
///
/// The image is written to the program's stdin as PNG; the trimmed stdout is the caption.
#[derive(Debug, Clone)]
pub struct CommandCaptioner {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandCaptioner {
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Describe for CommandCaptioner {
    fn describe(&self, image: &RgbImage) -> Result<String> {
        let mut png = Cursor::new(Vec::new());
        image
            .write_to(&mut png, ImageFormat::Png)
            .map_err(|e| AnalysisError::model_unavailable_with("could not encode image for captioning", e))?;
        let png = png.into_inner();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AnalysisError::model_unavailable_with("could not start caption program", e))?;

        // stdin must be written while stdout is being drained
        let stdin = child.stdin.take();
        let writer = thread::spawn(move || -> std::io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&png)?;
            }
            Ok(())
        });

        let output = child
            .wait_with_output()
            .map_err(|e| AnalysisError::model_unavailable_with("caption program did not finish", e))?;

        match writer.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) if output.status.success() => {
                return Err(AnalysisError::model_unavailable_with(
                    "could not send image to caption program",
                    e,
                ));
            }
            Ok(Err(_)) => {}
            Err(_) => return Err(AnalysisError::model_unavailable("caption writer panicked")),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AnalysisError::model_unavailable(format!(
                "caption program exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let caption = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if caption.is_empty() {
            return Err(AnalysisError::model_unavailable(
                "caption program produced no output",
            ));
        }

        debug!("Caption program returned {} characters", caption.len());
        Ok(caption)
    }
}

/// Locates the captioning program once; subsequent requests reuse the resolved path
#[derive(Debug, Clone)]
pub struct CommandCaptionLoader {
    program: String,
    args: Vec<String>,
}

impl CommandCaptionLoader {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl CaptionLoader for CommandCaptionLoader {
    fn load(&self) -> Result<Arc<dyn Describe>> {
        let program = resolve_program(&self.program).ok_or_else(|| {
            AnalysisError::model_unavailable(format!(
                "caption program '{}' was not found",
                self.program
            ))
        })?;
        info!("Using caption program {:?}", program);
        Ok(Arc::new(CommandCaptioner {
            program,
            args: self.args.clone(),
        }))
    }
}

/// Resolves a program name against `PATH`; names containing a path separator are
/// checked directly
fn resolve_program(program: &str) -> Option<PathBuf> {
    if program.is_empty() {
        return None;
    }

    let direct = Path::new(program);
    if direct.components().count() > 1 || direct.is_absolute() {
        return direct.is_file().then(|| direct.to_path_buf());
    }

    let paths = env::var_os("PATH")?;
    env::split_paths(&paths).find_map(|dir| {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        if cfg!(windows) {
            let exe = candidate.with_extension("exe");
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}
