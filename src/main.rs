use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};

use smart_image_analyzer::core::analysis::ColorNamer;
use smart_image_analyzer::core::image::load_upload;
use smart_image_analyzer::logging::setup_logging;
use smart_image_analyzer::{
    AnalysisError, CaptionConfig, CommandCaptionLoader, ImageAnalyzer, ModelCache, Result,
    Settings,
};

#[derive(Parser, Debug)]
#[command(version, about = "Describe an image and detect its dominant color", long_about = None)]
struct Args {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Caption an image and report its dominant color
    Analyze {
        /// JPEG or PNG file
        image: PathBuf,

        /// Number of color clusters
        #[arg(short = 'k', long)]
        clusters: Option<usize>,

        /// Seed for centroid initialization
        #[arg(long)]
        seed: Option<u64>,

        /// Downsample to at most this many pixels (0 = use every pixel)
        #[arg(long)]
        max_samples: Option<usize>,

        /// Captioning program; reads PNG on stdin, prints the caption
        #[arg(long)]
        caption_command: Option<String>,

        /// Argument passed to the captioning program (repeatable)
        #[arg(long = "caption-arg", allow_hyphen_values = true)]
        caption_args: Vec<String>,

        /// Skip captioning and report the color only
        #[arg(long, default_value_t = false)]
        no_caption: bool,

        /// Print the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print the basic color name for an RGB triple
    Name {
        #[arg(allow_hyphen_values = true)]
        r: i64,
        #[arg(allow_hyphen_values = true)]
        g: i64,
        #[arg(allow_hyphen_values = true)]
        b: i64,
    },
}

fn main() {
    let args = Args::parse();

    // The logging section comes from the settings file, so a bad file is reported after setup
    let (settings, settings_problem) = Settings::load_reporting(args.config.as_deref());

    if let Err(e) = setup_logging(&settings.logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Some(e) = settings_problem {
        warn!("{}. Using defaults.", e);
    }

    if let Err(e) = run(args, settings) {
        debug!("{:?}", e);
        eprintln!("{}", e.user_message());
        process::exit(1);
    }
}

fn run(args: Args, mut settings: Settings) -> Result<()> {
    match args.command {
        Commands::Name { r, g, b } => {
            let name = ColorNamer::name_channels(r, g, b)?;
            println!("{}", name);
            Ok(())
        }
        Commands::Analyze {
            image,
            clusters,
            seed,
            max_samples,
            caption_command,
            caption_args,
            no_caption,
            json,
        } => {
            if let Some(k) = clusters {
                settings.analysis.cluster.k = k;
            }
            if let Some(seed) = seed {
                settings.analysis.cluster.seed = seed;
            }
            if let Some(limit) = max_samples {
                settings.analysis.max_samples = (limit > 0).then_some(limit);
            }
            apply_caption_overrides(&mut settings.caption, caption_command, caption_args);
            settings.validate()?;
            debug!("Effective settings: {:?}", settings);

            let captions = match (&settings.caption.program, no_caption) {
                (Some(program), false) => ModelCache::new(CommandCaptionLoader::new(
                    program.clone(),
                    settings.caption.args.clone(),
                )),
                _ => ModelCache::disabled(),
            };
            let analyzer = ImageAnalyzer::new(settings.analysis.clone(), captions);

            info!("Analyzing {:?}", image);
            let img = load_upload(&image)?;

            if no_caption {
                let color = analyzer.analyze_colors(&img)?;
                if json {
                    println!("{}", to_json(&color)?);
                } else {
                    let (r, g, b) = color.rgb;
                    println!(
                        "Dominant color detected: {} (RGB: ({}, {}, {}))",
                        color.name, r, g, b
                    );
                }
                return Ok(());
            }

            if settings.caption.program.is_none() {
                return Err(AnalysisError::model_unavailable(
                    "no caption program configured; pass --caption-command or --no-caption",
                ));
            }

            let report = analyzer.analyze(&img)?;
            if json {
                println!("{}", to_json(&report)?);
            } else {
                println!("{}", report);
            }
            Ok(())
        }
    }
}

/// Command-line caption flags replace the stored ones independently
fn apply_caption_overrides(
    caption: &mut CaptionConfig,
    program: Option<String>,
    args: Vec<String>,
) {
    if let Some(program) = program {
        caption.program = Some(program);
    }
    if !args.is_empty() {
        caption.args = args;
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|source| AnalysisError::Serialization { source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> CaptionConfig {
        CaptionConfig {
            program: Some("blip-caption".to_string()),
            args: vec!["--beam".to_string(), "3".to_string()],
        }
    }

    #[test]
    fn test_caption_args_apply_without_program_flag() {
        let mut caption = stored();
        apply_caption_overrides(&mut caption, None, vec!["--fast".to_string()]);
        assert_eq!(caption.program.as_deref(), Some("blip-caption"));
        assert_eq!(caption.args, vec!["--fast".to_string()]);
    }

    #[test]
    fn test_program_flag_keeps_stored_args() {
        let mut caption = stored();
        apply_caption_overrides(&mut caption, Some("other-captioner".to_string()), Vec::new());
        assert_eq!(caption.program.as_deref(), Some("other-captioner"));
        assert_eq!(caption.args, stored().args);
    }

    #[test]
    fn test_no_flags_leave_settings_alone() {
        let mut caption = stored();
        apply_caption_overrides(&mut caption, None, Vec::new());
        assert_eq!(caption, stored());
    }

    #[test]
    fn test_json_failure_is_a_serialization_error() {
        use std::collections::HashMap;
        // JSON object keys must be strings
        let mut map = HashMap::new();
        map.insert(vec![1u8], 2u8);
        assert!(matches!(
            to_json(&map),
            Err(AnalysisError::Serialization { .. })
        ));
    }
}
