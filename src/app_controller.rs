use anyhow::{anyhow, Context, Result};
use log::{error, warn, info, debug};
use std::path::{Path, PathBuf};
use std::time::Duration;
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::Config;
use crate::captions::{CaptionOverrides, CaptionSegmenter, CaptionStyle, CaptionTrack, FrameRate, StylePreset};
use crate::errors::{MediaError, RenderError};
use crate::file_utils::{FileManager, MediaKind};
use crate::media::{MediaTools, VideoInfo};
use crate::render::{RenderClient, RenderRequest, Renderer, RenderServer};
use crate::transcript::Transcript;

// @module: Application controller for reel captioning

/// Suffix of exported caption files
const CAPTIONS_SUFFIX: &str = "captions";

/// Result of a render run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The captioned video written by the render server
    Rendered(PathBuf),
    /// The server rejected the job; the uncaptioned video
    Fallback(PathBuf),
}

/// Main application controller for reel captioning
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: ffprobe/ffmpeg runner
    media: MediaTools,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let media = MediaTools::from_config(&config.media);
        Ok(Self { config, media })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve the preset for a style, applying config then CLI overrides.
    ///
    /// Without an explicit style the configured one is used.
    pub fn resolve_preset(&self, style: Option<CaptionStyle>, overrides: &CaptionOverrides) -> StylePreset {
        let style = style.unwrap_or(self.config.caption.style);
        let merged = self.config.caption.overrides.merged_with(overrides);
        style.preset().with_overrides(&merged)
    }

    /// Segment a transcript with a resolved preset
    pub fn caption_transcript(&self, transcript: &Transcript, fps: f64, preset: &StylePreset) -> Result<CaptionTrack> {
        let segmenter = CaptionSegmenter::from_preset(fps, preset)?;
        let track = segmenter.segment(transcript)?;

        info!("Prepared {} {} captions for style {} ({} words)",
              track.len(), preset.mode, preset.style, transcript.word_count());
        Ok(track)
    }

    /// Export captions for a transcript file or every transcript in a directory.
    ///
    /// Each transcript `<stem>.json` produces `<stem>.captions.json`, next to
    /// the input or in `output` when given. Existing outputs are skipped
    /// unless `force_overwrite` is set. Returns the written paths.
    pub fn export_captions(
        &self,
        input: &Path,
        output: Option<&Path>,
        fps: f64,
        preset: &StylePreset,
        force_overwrite: bool,
    ) -> Result<Vec<PathBuf>> {
        // Reject bad parameters before touching any file
        CaptionSegmenter::from_preset(fps, preset)?;

        if input.is_file() {
            let output_path = match output {
                Some(path) if path.is_dir() => {
                    FileManager::generate_output_path(input, path, CAPTIONS_SUFFIX, "json")
                }
                Some(path) => path.to_path_buf(),
                None => FileManager::generate_output_path(input, Self::parent_dir(input), CAPTIONS_SUFFIX, "json"),
            };

            return Ok(self
                .export_one(input, &output_path, fps, preset, force_overwrite)?
                .into_iter()
                .collect());
        }

        if !FileManager::dir_exists(input) {
            return Err(anyhow!("Input path does not exist: {:?}", input));
        }

        let transcripts: Vec<PathBuf> = FileManager::find_files(input, "json")?
            .into_iter()
            .filter(|path| !Self::is_caption_output(path))
            .collect();

        if transcripts.is_empty() {
            warn!("No transcript files found in directory: {:?}", input);
            return Ok(Vec::new());
        }

        let progress = ProgressBar::new(transcripts.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} transcripts {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(style);

        let mut written = Vec::new();
        let mut failures = 0;

        for transcript_path in &transcripts {
            let output_dir = output.map(Path::to_path_buf).unwrap_or_else(|| Self::parent_dir(transcript_path));
            let output_path = FileManager::generate_output_path(transcript_path, &output_dir, CAPTIONS_SUFFIX, "json");

            match self.export_one(transcript_path, &output_path, fps, preset, force_overwrite) {
                Ok(Some(path)) => written.push(path),
                Ok(None) => {}
                Err(e) => {
                    failures += 1;
                    progress.suspend(|| error!("Failed to export {:?}: {:#}", transcript_path, e));
                }
            }
            progress.inc(1);
        }

        progress.finish_and_clear();
        info!("Exported captions for {} of {} transcripts ({} failed)",
              written.len(), transcripts.len(), failures);
        Ok(written)
    }

    fn export_one(
        &self,
        transcript_path: &Path,
        output_path: &Path,
        fps: f64,
        preset: &StylePreset,
        force_overwrite: bool,
    ) -> Result<Option<PathBuf>> {
        if output_path.exists() && !force_overwrite {
            warn!("Output file already exists: {:?}. Use -f to force overwrite.", output_path);
            return Ok(None);
        }

        let transcript = Transcript::from_file(transcript_path)?;
        let track = self.caption_transcript(&transcript, fps, preset)?;
        let json = serde_json::to_string_pretty(&track)
            .context("Failed to serialize captions to JSON")?;
        FileManager::write_to_file(output_path, &json)?;

        debug!("Wrote {:?}", output_path);
        Ok(Some(output_path.to_path_buf()))
    }

    fn is_caption_output(path: &Path) -> bool {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().ends_with(&format!(".{}", CAPTIONS_SUFFIX)))
            .unwrap_or(false)
    }

    fn parent_dir(path: &Path) -> PathBuf {
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf()
    }

    /// Crop background media (image or video) to 9:16.
    ///
    /// Returns the path of the cropped file, or the input when no crop is
    /// needed.
    pub async fn prepare_background(&self, media_path: &Path, output_dir: Option<&Path>) -> Result<PathBuf> {
        let output_dir = output_dir.unwrap_or(self.config.media.output_dir.as_path());
        FileManager::ensure_dir(output_dir)?;

        let cropped = match FileManager::detect_media_kind(media_path) {
            MediaKind::Image => self.media.crop_image_vertical(media_path, output_dir).await?,
            MediaKind::Video => self.media.crop_video_vertical(media_path, output_dir).await?,
            MediaKind::Unknown => {
                return Err(MediaError::UnsupportedMedia(format!(
                    "{:?} is neither an image nor a video", media_path
                )).into());
            }
        };

        info!("Background media ready: {:?}", cropped);
        Ok(cropped)
    }

    /// Build the render job for an already probed video
    pub fn build_render_request(
        &self,
        transcript: &Transcript,
        video_file: &str,
        video: &VideoInfo,
        preset: &StylePreset,
    ) -> Result<RenderRequest> {
        let frame_rate = FrameRate::from_fps(video.fps)?;
        let track = self.caption_transcript(transcript, video.fps, preset)?;

        Ok(RenderRequest::new(
            video_file,
            frame_rate.fps(),
            video.duration_in_frames(),
            track,
            preset.style,
        ))
    }

    /// Caption a video through the render server.
    ///
    /// The video is moved into the render project's public folder. When the
    /// server rejects the job the outcome is `Fallback` with the moved,
    /// uncaptioned video.
    pub async fn render_reel<R: Renderer + ?Sized>(
        &self,
        transcript: &Transcript,
        video_path: &Path,
        preset: &StylePreset,
        renderer: &R,
    ) -> Result<RenderOutcome> {
        let start_time = std::time::Instant::now();

        if !FileManager::file_exists(video_path) {
            return Err(anyhow!("Video file does not exist: {:?}", video_path));
        }

        let video = self.media.probe_video(video_path).await?;
        let video_file = video_path.file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| anyhow!("Video path has no file name: {:?}", video_path))?;

        let request = self.build_render_request(transcript, &video_file, &video, preset)?;
        info!("Chosen caption style is {}", preset.style);

        let staged = self.stage_video(video_path)?;

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!(
            "Rendering {} at {}fps, {} frames",
            request.video_file, request.fps, request.duration_in_frames
        ));
        spinner.enable_steady_tick(Duration::from_millis(120));

        let result = renderer.render(&request).await;
        spinner.finish_and_clear();

        match result {
            Ok(response) => {
                let output = self.config.render.project_dir.join(&response.output_location);
                info!("Reel rendered in {}: {:?}", Self::format_duration(start_time.elapsed()), output);
                Ok(RenderOutcome::Rendered(output))
            }
            Err(RenderError::ApiError { status_code, message }) => {
                error!("Captioning failed with status {}: {}", status_code, message);
                warn!("Returning the uncaptioned video: {:?}", staged);
                Ok(RenderOutcome::Fallback(staged))
            }
            Err(e) => Err(e).context("Render request failed"),
        }
    }

    /// Move the video into the render project's public folder
    fn stage_video(&self, video_path: &Path) -> Result<PathBuf> {
        let public_dir = self.config.render.public_path();
        let already_staged = video_path.parent()
            .map(|parent| parent == public_dir.as_path())
            .unwrap_or(false);

        if already_staged {
            return Ok(video_path.to_path_buf());
        }

        let staged = FileManager::move_into_dir(video_path, &public_dir)
            .with_context(|| format!("Failed to move video into {:?}", public_dir))?;
        debug!("Staged video at {:?}", staged);
        Ok(staged)
    }

    /// Full render run: optionally start the server, wait for it, render,
    /// then stop it again.
    pub async fn run_render(
        &self,
        transcript_path: &Path,
        video_path: &Path,
        preset: &StylePreset,
        start_server: bool,
    ) -> Result<RenderOutcome> {
        let transcript = Transcript::from_file(transcript_path)?;
        let client = RenderClient::with_config(&self.config.render);

        if !start_server {
            if let Err(e) = client.health_check().await {
                warn!("Render server at {} is not answering: {}", self.config.render.endpoint, e);
            }
            return self.render_reel(&transcript, video_path, preset, &client).await;
        }

        let mut server = RenderServer::start(&self.config.render).await?;
        let result = match server
            .wait_ready(&client, self.config.render.startup_timeout(), self.config.render.health_poll_interval())
            .await
        {
            Ok(()) => self.render_reel(&transcript, video_path, preset, &client).await,
            Err(e) => Err(e.into()),
        };

        if let Err(e) = server.shutdown().await {
            warn!("{}", e);
        }

        result
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
