// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{info, warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use std::fs::File;
use std::io::BufReader;
use clap::{Args, Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use reelcap::app_config::{self, Config};
use reelcap::app_controller::{Controller, RenderOutcome};
use reelcap::captions::{CaptionMode, CaptionOverrides, CaptionStyle};
use reelcap::transcript::Transcript;

/// CLI Wrapper for CaptionStyle to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliCaptionStyle {
    Glowing,
    BackgroundTracking,
    ColorTracking,
    TypingBackground,
}

impl From<CliCaptionStyle> for CaptionStyle {
    fn from(cli_style: CliCaptionStyle) -> Self {
        match cli_style {
            CliCaptionStyle::Glowing => CaptionStyle::Glowing,
            CliCaptionStyle::BackgroundTracking => CaptionStyle::BackgroundTracking,
            CliCaptionStyle::ColorTracking => CaptionStyle::ColorTracking,
            CliCaptionStyle::TypingBackground => CaptionStyle::TypingBackground,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// Caption style and limit options shared by subcommands
#[derive(Args, Debug, Clone)]
struct CaptionStyleArgs {
    /// Caption style (defaults to the configured style)
    #[arg(short, long, value_enum)]
    style: Option<CliCaptionStyle>,

    /// Maximum words per caption
    #[arg(long)]
    max_words: Option<usize>,

    /// Maximum start-time gap in seconds for a word to join a caption
    #[arg(long)]
    max_overlap: Option<f64>,

    /// Maximum characters per caption
    #[arg(long)]
    max_characters: Option<usize>,

    /// Emit one merged text per caption
    #[arg(long, conflicts_with = "grouped")]
    flat: bool,

    /// Emit individually timed words per caption
    #[arg(long)]
    grouped: bool,
}

impl CaptionStyleArgs {
    fn overrides(&self) -> CaptionOverrides {
        let mode = if self.flat {
            Some(CaptionMode::Flat)
        } else if self.grouped {
            Some(CaptionMode::Grouped)
        } else {
            None
        };

        CaptionOverrides {
            mode,
            max_words: self.max_words,
            max_overlap_seconds: self.max_overlap,
            max_characters: self.max_characters,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert transcript JSON into caption JSON
    Captions(CaptionsArgs),

    /// Caption a video through the render server
    Render(RenderArgs),

    /// Crop a background image or video to 9:16
    Crop(CropArgs),

    /// List caption styles and their limits
    Styles,

    /// Generate shell completions for reelcap
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct CaptionsArgs {
    /// Transcript JSON file or directory of transcripts
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Frame rate of the target video
    #[arg(long)]
    fps: f64,

    /// Output file or directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print captions to stdout instead of writing a file
    #[arg(short, long, conflicts_with = "output")]
    print: bool,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    #[command(flatten)]
    caption: CaptionStyleArgs,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Transcript JSON file for the video
    #[arg(value_name = "TRANSCRIPT")]
    transcript: PathBuf,

    /// Video to caption (moved into the render project)
    #[arg(value_name = "VIDEO")]
    video: PathBuf,

    /// Use an already running render server
    #[arg(long)]
    no_server: bool,

    #[command(flatten)]
    caption: CaptionStyleArgs,
}

#[derive(Parser, Debug)]
struct CropArgs {
    /// Background image or video
    #[arg(value_name = "MEDIA")]
    media: PathBuf,

    /// Output directory for the cropped file
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

/// reelcap - captions for vertical reels
///
/// Turns word-level transcripts into caption data and drives a caption
/// render server to burn them into 9:16 videos.
#[derive(Parser, Debug)]
#[command(name = "reelcap")]
#[command(version)]
#[command(about = "Caption segmentation and rendering for vertical reels")]
#[command(long_about = "reelcap turns word-level transcripts into caption data and drives a caption render server.

EXAMPLES:
    reelcap captions talk.json --fps 30                     # Write talk.captions.json
    reelcap captions talk.json --fps 30 -s glowing -p       # Print flat two-word captions
    reelcap captions transcripts/ --fps 25 -f               # Convert a whole directory
    reelcap render talk.json talk.mp4 -s color-tracking     # Start the server and render
    reelcap render talk.json talk.mp4 --no-server           # Use a running server
    reelcap crop background.mp4                             # Crop background media to 9:16
    reelcap completions bash > reelcap.bash                 # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

STYLES:
    glowing              - flat, 2 words, 0.6s, 12 characters
    background-tracking  - grouped, 3 words, 1s, 18 characters
    color-tracking       - grouped, 4 words, 2s, 20 characters
    typing-background    - grouped, 6 words, 2.5s, 28 characters (default)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                Self::get_color_for_level(level), now, Self::get_emoji_for_level(level), record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once at the most verbose level; the effective
    // level is applied through log::set_max_level after config loading
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "reelcap", &mut std::io::stdout());
            Ok(())
        }
        Commands::Styles => {
            print_styles();
            Ok(())
        }
        Commands::Captions(args) => {
            let config = load_config(&cli.config_path, cli.log_level)?;
            run_captions(Controller::with_config(config)?, args)
        }
        Commands::Render(args) => {
            let config = load_config(&cli.config_path, cli.log_level)?;
            run_render(Controller::with_config(config)?, args).await
        }
        Commands::Crop(args) => {
            let config = load_config(&cli.config_path, cli.log_level)?;
            let controller = Controller::with_config(config)?;
            let cropped = controller.prepare_background(&args.media, args.output_dir.as_deref()).await?;
            info!("Success: {:?}", cropped);
            Ok(())
        }
    }
}

/// Load or create the configuration, apply CLI log level, validate
fn load_config(config_path: &str, cli_log_level: Option<CliLogLevel>) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(level) = &cli_log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        // Create default configuration if not exists
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Update log level in config if specified via command line
    match cli_log_level {
        Some(level) => config.log_level = level.into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    // Validate the configuration after loading and overriding
    config.validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

fn run_captions(controller: Controller, args: CaptionsArgs) -> Result<()> {
    let style = args.caption.style.map(CaptionStyle::from);
    let preset = controller.resolve_preset(style, &args.caption.overrides());

    if args.print {
        if !args.input_path.is_file() {
            return Err(anyhow!("--print needs a single transcript file: {:?}", args.input_path));
        }
        let transcript = Transcript::from_file(&args.input_path)?;
        let track = controller.caption_transcript(&transcript, args.fps, &preset)?;
        println!("{}", serde_json::to_string_pretty(&track)?);
        return Ok(());
    }

    let written = controller.export_captions(
        &args.input_path,
        args.output.as_deref(),
        args.fps,
        &preset,
        args.force_overwrite,
    )?;

    for path in &written {
        info!("Success: {:?}", path);
    }
    Ok(())
}

async fn run_render(controller: Controller, args: RenderArgs) -> Result<()> {
    let style = args.caption.style.map(CaptionStyle::from);
    let preset = controller.resolve_preset(style, &args.caption.overrides());
    let start_server = controller.config().render.auto_start && !args.no_server;

    let outcome = controller.run_render(&args.transcript, &args.video, &preset, start_server).await?;
    match &outcome {
        RenderOutcome::Rendered(path) => info!("Reel creation completed: {:?}", path),
        RenderOutcome::Fallback(path) => warn!("Reel captioning failed, uncaptioned video at {:?}", path),
    }
    Ok(())
}

fn print_styles() {
    println!("{:<22} {:<8} {:>9} {:>11} {:>10}", "STYLE", "MODE", "MAX_WORDS", "MAX_OVERLAP", "MAX_CHARS");
    for style in CaptionStyle::ALL {
        let preset = style.preset();
        println!(
            "{:<22} {:<8} {:>9} {:>10}s {:>10}",
            style.tag(),
            preset.mode.to_string(),
            preset.params.max_words,
            preset.params.max_overlap_seconds,
            preset.params.max_characters
        );
    }
}
