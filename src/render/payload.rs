use serde::{Deserialize, Serialize};

use crate::captions::{CaptionStyle, CaptionTrack};

/// Render job for the caption composition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    /// File name of the input video inside the server's public folder
    pub video_file: String,

    /// Integer frame rate used for all frame indices
    pub fps: u32,

    /// Length of the composition
    #[serde(rename = "durationInFrames")]
    pub duration_in_frames: u64,

    /// Captions in frame units
    pub data_subtitles: CaptionTrack,

    /// Visual style of the captions
    pub subtitle_type: CaptionStyle,
}

impl RenderRequest {
    pub fn new(
        video_file: impl Into<String>,
        fps: u32,
        duration_in_frames: u64,
        data_subtitles: CaptionTrack,
        subtitle_type: CaptionStyle,
    ) -> Self {
        Self {
            video_file: video_file.into(),
            fps,
            duration_in_frames,
            data_subtitles,
            subtitle_type,
        }
    }
}

/// Reply of a successful render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderResponse {
    #[serde(default)]
    pub message: String,

    /// Output video path relative to the render project directory
    #[serde(rename = "outputLocation")]
    pub output_location: String,
}
