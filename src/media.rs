use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use log::{debug, error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tokio::process::Command;

use crate::app_config::MediaConfig;
use crate::errors::MediaError;

// @module: Media probing and vertical cropping through ffprobe/ffmpeg

// @const: ffprobe rational or decimal rate, e.g. "30000/1001" or "25"
static RATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*(?:/\s*(\d+(?:\.\d+)?))?\s*$").unwrap()
});

/// Tolerance on the width/height ratio under which a video counts as 9:16
const VERTICAL_RATIO_TOLERANCE: f64 = 0.01;

/// File name of a cropped background video
pub const CROPPED_VIDEO_NAME: &str = "background.mp4";

/// File name of a cropped background image
pub const CROPPED_IMAGE_NAME: &str = "background.png";

// @struct: Properties of the first video stream
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    // @field: Measured frames per second, possibly fractional
    pub fps: f64,
    pub duration_secs: f64,
}

impl VideoInfo {
    /// Length in whole frames at the truncated frame rate
    pub fn duration_in_frames(&self) -> u64 {
        (self.duration_secs * self.fps.trunc()).trunc().max(0.0) as u64
    }
}

// @struct: Crop window in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

impl CropRect {
    // @returns: ffmpeg crop filter expression
    pub fn filter(&self) -> String {
        format!("crop={}:{}:{}:{}", self.width, self.height, self.x, self.y)
    }
}

/// Largest centred 9:16 window of a frame
fn centred_vertical_crop(width: u32, height: u32) -> CropRect {
    let (w, h) = (u64::from(width), u64::from(height));
    let new_width = w.min(h * 9 / 16);
    let new_height = h.min(w * 16 / 9);

    CropRect {
        width: new_width as u32,
        height: new_height as u32,
        x: ((w - new_width) / 2) as u32,
        y: ((h - new_height) / 2) as u32,
    }
}

/// Crop window turning a video into 9:16, or `None` when it already is
pub fn vertical_video_crop(width: u32, height: u32) -> Option<CropRect> {
    if width == 0 || height == 0 {
        return None;
    }
    let ratio = f64::from(width) / f64::from(height);
    if (ratio - 9.0 / 16.0).abs() < VERTICAL_RATIO_TOLERANCE {
        return None;
    }
    Some(centred_vertical_crop(width, height))
}

/// Crop window turning an image into 9:16, or `None` when it is exactly 9:16
pub fn vertical_image_crop(width: u32, height: u32) -> Option<CropRect> {
    if width == 0 || height == 0 {
        return None;
    }
    if u64::from(width) * 16 == u64::from(height) * 9 {
        return None;
    }
    Some(centred_vertical_crop(width, height))
}

/// Parse an ffprobe rate such as "30000/1001"
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    let caps = RATE_REGEX.captures(rate)?;
    let num: f64 = caps.get(1)?.as_str().parse().ok()?;
    let den: f64 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => 1.0,
    };
    if den == 0.0 {
        return None;
    }
    let fps = num / den;
    (fps.is_finite() && fps > 0.0).then_some(fps)
}

/// Interpret `ffprobe -print_format json -show_streams -show_format` output
pub fn parse_probe_output(json: &str) -> Result<VideoInfo, MediaError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| MediaError::InvalidOutput(format!("ffprobe JSON: {}", e)))?;

    let stream = value
        .get("streams")
        .and_then(|s| s.as_array())
        .and_then(|streams| streams.first())
        .ok_or_else(|| MediaError::InvalidOutput("no video stream found".to_string()))?;

    let dimension = |key: &str| {
        stream
            .get(key)
            .and_then(|v| v.as_u64())
            .filter(|v| *v > 0)
            .map(|v| v as u32)
            .ok_or_else(|| MediaError::InvalidOutput(format!("missing stream {}", key)))
    };
    let width = dimension("width")?;
    let height = dimension("height")?;

    // avg_frame_rate is "0/0" for some containers; r_frame_rate is the fallback
    let fps = ["avg_frame_rate", "r_frame_rate"]
        .iter()
        .filter_map(|key| stream.get(*key).and_then(|v| v.as_str()))
        .find_map(parse_frame_rate)
        .ok_or_else(|| MediaError::InvalidOutput("frame rate is zero or missing".to_string()))?;

    let as_seconds = |v: &Value| -> Option<f64> {
        v.as_str()
            .and_then(|s| s.parse::<f64>().ok())
            .or_else(|| v.as_f64())
    };
    let duration_secs = value
        .get("format")
        .and_then(|f| f.get("duration"))
        .and_then(as_seconds)
        .or_else(|| stream.get("duration").and_then(as_seconds))
        .unwrap_or(0.0);

    Ok(VideoInfo {
        width,
        height,
        fps,
        duration_secs,
    })
}

/// Filter ffmpeg stderr to only show meaningful error lines, stripping the
/// version banner, build configuration, and stream metadata noise.
fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "ffprobe version",
        "built with",
        "configuration:",
        "lib",
        "Input #",
        "Metadata:",
        "Duration:",
        "Stream #",
        "Output #",
        "Stream mapping:",
        "Press [q]",
        "frame=",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !noise_prefixes.iter().any(|p| line.starts_with(p)))
        .collect();

    if meaningful.is_empty() {
        "unknown error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}

/// Runner for the external media tools
#[derive(Debug, Clone)]
pub struct MediaTools {
    ffprobe_timeout: Duration,
    ffmpeg_timeout: Duration,
}

impl MediaTools {
    pub fn new(ffprobe_timeout: Duration, ffmpeg_timeout: Duration) -> Self {
        Self {
            ffprobe_timeout,
            ffmpeg_timeout,
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(
            Duration::from_secs(config.ffprobe_timeout_secs),
            Duration::from_secs(config.ffmpeg_timeout_secs),
        )
    }

    async fn run_tool(tool: &str, args: &[String], timeout: Duration) -> Result<Output, MediaError> {
        debug!("Running {} {}", tool, args.join(" "));

        let child_future = Command::new(tool).args(args).kill_on_drop(true).output();

        let output = tokio::select! {
            result = child_future => {
                result.map_err(|e| MediaError::ToolFailed {
                    tool: tool.to_string(),
                    message: format!("failed to execute: {}", e),
                })?
            },
            _ = tokio::time::sleep(timeout) => {
                return Err(MediaError::Timeout { tool: tool.to_string(), secs: timeout.as_secs() });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let filtered = filter_ffmpeg_stderr(&stderr);
            error!("{} failed: {}", tool, filtered);
            return Err(MediaError::ToolFailed {
                tool: tool.to_string(),
                message: filtered,
            });
        }

        Ok(output)
    }

    /// Probe dimensions, frame rate and duration of the first video stream
    pub async fn probe_video<P: AsRef<Path>>(&self, path: P) -> Result<VideoInfo, MediaError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MediaError::UnsupportedMedia(format!("file not found: {:?}", path)));
        }

        let args = vec![
            "-v".to_string(), "error".to_string(),
            "-select_streams".to_string(), "v:0".to_string(),
            "-show_streams".to_string(),
            "-show_format".to_string(),
            "-print_format".to_string(), "json".to_string(),
            path.to_string_lossy().to_string(),
        ];
        let output = Self::run_tool("ffprobe", &args, self.ffprobe_timeout).await?;
        let info = parse_probe_output(&String::from_utf8_lossy(&output.stdout))?;

        debug!("Probed {:?}: {}x{} at {:.3}fps, {:.2}s",
               path, info.width, info.height, info.fps, info.duration_secs);
        Ok(info)
    }

    async fn run_crop(&self, input: &Path, output: &Path, crop: CropRect, video: bool) -> Result<(), MediaError> {
        let mut args = vec![
            "-y".to_string(),
            "-i".to_string(), input.to_string_lossy().to_string(),
            "-vf".to_string(), crop.filter(),
        ];
        if video {
            args.extend([
                "-c:v", "libx264",
                "-c:a", "aac",
                "-strict", "experimental",
            ].map(String::from));
        }
        args.push(output.to_string_lossy().to_string());

        Self::run_tool("ffmpeg", &args, self.ffmpeg_timeout).await?;
        Ok(())
    }

    /// Crop a video to 9:16 into `output_dir/background.mp4`.
    ///
    /// Returns the input path unchanged when the video is already vertical.
    pub async fn crop_video_vertical<P: AsRef<Path>>(&self, input: P, output_dir: &Path) -> Result<PathBuf, MediaError> {
        let input = input.as_ref();
        let info = self.probe_video(input).await?;

        let Some(crop) = vertical_video_crop(info.width, info.height) else {
            info!("Video {:?} is already 9:16, no crop needed", input);
            return Ok(input.to_path_buf());
        };

        let output = output_dir.join(CROPPED_VIDEO_NAME);
        info!("Cropping video {:?} from {}x{} to {}x{}",
              input, info.width, info.height, crop.width, crop.height);
        self.run_crop(input, &output, crop, true).await?;
        Ok(output)
    }

    /// Crop an image to 9:16 into `output_dir/background.png`.
    ///
    /// Returns the input path unchanged when the image is exactly 9:16.
    pub async fn crop_image_vertical<P: AsRef<Path>>(&self, input: P, output_dir: &Path) -> Result<PathBuf, MediaError> {
        let input = input.as_ref();
        let info = self.probe_video(input).await?;

        let Some(crop) = vertical_image_crop(info.width, info.height) else {
            info!("Image {:?} is already 9:16, no crop needed", input);
            return Ok(input.to_path_buf());
        };

        let output = output_dir.join(CROPPED_IMAGE_NAME);
        info!("Cropping image {:?} from {}x{} to {}x{}",
              input, info.width, info.height, crop.width, crop.height);
        self.run_crop(input, &output, crop, false).await?;
        Ok(output)
    }
}
