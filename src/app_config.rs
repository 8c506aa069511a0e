use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;
use std::time::Duration;

use crate::captions::{CaptionOverrides, CaptionStyle, StylePreset};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Caption style and limit overrides
    #[serde(default)]
    pub caption: CaptionConfig,

    /// Render server settings
    #[serde(default)]
    pub render: RenderConfig,

    /// External media tool settings
    #[serde(default)]
    pub media: MediaConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Caption settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CaptionConfig {
    /// Visual style, which selects the preset limits
    #[serde(default)]
    pub style: CaptionStyle,

    /// Optional replacements for the preset limits
    #[serde(flatten)]
    pub overrides: CaptionOverrides,
}

impl CaptionConfig {
    /// Preset for the configured style with config overrides applied
    pub fn resolve(&self) -> StylePreset {
        self.style.preset().with_overrides(&self.overrides)
    }
}

/// Render server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RenderConfig {
    // @field: Base URL of the render server
    #[serde(default = "default_render_endpoint")]
    pub endpoint: String,

    // @field: Path of the render route
    #[serde(default = "default_render_route")]
    pub route: String,

    // @field: Render project directory (server working directory)
    #[serde(default = "default_project_dir")]
    pub project_dir: PathBuf,

    // @field: Folder under the project served as static media
    #[serde(default = "default_public_dir")]
    pub public_dir: String,

    // @field: Dependency install command, run before start; empty to skip
    #[serde(default = "default_install_command")]
    pub install_command: Vec<String>,

    // @field: Server start command
    #[serde(default = "default_start_command")]
    pub start_command: Vec<String>,

    // @field: Start the server for each render run
    #[serde(default = "default_true")]
    pub auto_start: bool,

    // @field: Seconds to wait for the server to accept requests
    #[serde(default = "default_startup_timeout_secs")]
    pub startup_timeout_secs: u64,

    // @field: Delay between readiness probes
    #[serde(default = "default_health_poll_ms")]
    pub health_poll_ms: u64,

    // @field: Timeout of one render request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    // @field: Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    // @field: Base backoff in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_render_endpoint(),
            route: default_render_route(),
            project_dir: default_project_dir(),
            public_dir: default_public_dir(),
            install_command: default_install_command(),
            start_command: default_start_command(),
            auto_start: default_true(),
            startup_timeout_secs: default_startup_timeout_secs(),
            health_poll_ms: default_health_poll_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl RenderConfig {
    /// Full URL of the render route
    pub fn render_url(&self) -> String {
        format!(
            "{}/{}",
            self.endpoint.trim_end_matches('/'),
            self.route.trim_start_matches('/')
        )
    }

    /// Directory the renderer serves input videos from
    pub fn public_path(&self) -> PathBuf {
        self.project_dir.join(&self.public_dir)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }

    pub fn health_poll_interval(&self) -> Duration {
        Duration::from_millis(self.health_poll_ms)
    }
}

/// ffprobe / ffmpeg configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MediaConfig {
    /// Timeout for probing a file
    #[serde(default = "default_ffprobe_timeout_secs")]
    pub ffprobe_timeout_secs: u64,

    /// Timeout for a crop run
    #[serde(default = "default_ffmpeg_timeout_secs")]
    pub ffmpeg_timeout_secs: u64,

    /// Directory for cropped background media
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffprobe_timeout_secs: default_ffprobe_timeout_secs(),
            ffmpeg_timeout_secs: default_ffmpeg_timeout_secs(),
            output_dir: default_output_dir(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_render_endpoint() -> String {
    "http://localhost:4505".to_string()
}

fn default_render_route() -> String {
    "/caption-video".to_string()
}

fn default_project_dir() -> PathBuf {
    PathBuf::from("captions")
}

fn default_public_dir() -> String {
    "public".to_string()
}

fn default_install_command() -> Vec<String> {
    vec!["npm".to_string(), "i".to_string()]
}

fn default_start_command() -> Vec<String> {
    vec!["node".to_string(), "server.js".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_startup_timeout_secs() -> u64 {
    300 // bundling the render project takes a while on first start
}

fn default_health_poll_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    1800
}

fn default_retry_count() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_ffprobe_timeout_secs() -> u64 {
    60
}

fn default_ffmpeg_timeout_secs() -> u64 {
    600
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate caption limits after overrides
        self.caption
            .resolve()
            .params
            .validate()
            .map_err(|e| anyhow!("Invalid caption settings: {}", e))?;

        // Validate render endpoint
        let endpoint = url::Url::parse(&self.render.endpoint)
            .map_err(|e| anyhow!("Invalid render endpoint '{}': {}", self.render.endpoint, e))?;
        if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
            return Err(anyhow!(
                "Render endpoint must use http or https, got '{}'",
                endpoint.scheme()
            ));
        }

        if self.render.auto_start && self.render.start_command.is_empty() {
            return Err(anyhow!("Render start command is required when auto_start is enabled"));
        }

        if self.render.health_poll_ms == 0 {
            return Err(anyhow!("Render health poll interval must be greater than zero"));
        }

        if self.render.request_timeout_secs == 0 {
            return Err(anyhow!("Render request timeout must be greater than zero"));
        }

        if self.media.ffprobe_timeout_secs == 0 || self.media.ffmpeg_timeout_secs == 0 {
            return Err(anyhow!("Media tool timeouts must be greater than zero"));
        }

        Ok(())
    }
}
