/*!
 * Caption segmentation.
 *
 * Converts word-level transcription timestamps into caption units for the
 * renderer, under limits on word count, character count and start-time gap.
 *
 * # Architecture
 *
 * - `merge`: The flat and grouped merge policies over a flat word sequence
 * - `frames`: Seconds to frame index conversion
 * - `styles`: Style presets mapping each visual style to its limits and mode
 *
 * Two output shapes are produced:
 * - flat: one caption per run of words, with the text merged
 * - grouped: one list of individually timed words per run, so the renderer
 *   can highlight word by word
 */

pub mod frames;
pub mod merge;
pub mod styles;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::CaptionError;
use crate::transcript::{Transcript, WordToken};

// Re-export main types
pub use frames::FrameRate;
pub use styles::{CaptionOverrides, CaptionStyle, StylePreset};

/// Shape of the produced captions
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaptionMode {
    /// One merged text per caption
    Flat,
    /// One list of timed words per caption
    #[default]
    Grouped,
}

impl std::fmt::Display for CaptionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flat => write!(f, "flat"),
            Self::Grouped => write!(f, "grouped"),
        }
    }
}

/// Limits applied while merging words into captions
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct CaptionParams {
    /// Maximum number of words in one caption
    pub max_words: usize,

    /// Maximum start-time gap, in seconds, for a word to join a caption
    pub max_overlap_seconds: f64,

    /// Character budget of one caption
    pub max_characters: usize,
}

impl CaptionParams {
    pub fn new(max_words: usize, max_overlap_seconds: f64, max_characters: usize) -> Self {
        Self {
            max_words,
            max_overlap_seconds,
            max_characters,
        }
    }

    /// Check every limit before any word is processed
    pub fn validate(&self) -> Result<(), CaptionError> {
        if self.max_words == 0 {
            return Err(CaptionError::InvalidParameter(
                "max_words must be at least 1".to_string(),
            ));
        }
        if self.max_characters == 0 {
            return Err(CaptionError::InvalidParameter(
                "max_characters must be at least 1".to_string(),
            ));
        }
        if !self.max_overlap_seconds.is_finite() || self.max_overlap_seconds < 0.0 {
            return Err(CaptionError::InvalidParameter(format!(
                "max_overlap_seconds must be a non-negative number, got {}",
                self.max_overlap_seconds
            )));
        }
        Ok(())
    }
}

/// A caption element in frame units, as consumed by the renderer
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FramedWord {
    /// First frame
    pub start: i64,
    /// Last frame
    pub end: i64,
    /// Caption or word text, trimmed
    pub word: String,
}

/// Captions for one video
///
/// The JSON form carries no mode tag. An empty track is `[]` in both modes
/// and always deserializes as `Flat`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum CaptionTrack {
    /// Serialized as a list of `{start, end, word}`
    Flat(Vec<FramedWord>),
    /// Serialized as a list of lists of `{start, end, word}`
    Grouped(Vec<Vec<FramedWord>>),
}

impl CaptionTrack {
    pub fn mode(&self) -> CaptionMode {
        match self {
            Self::Flat(_) => CaptionMode::Flat,
            Self::Grouped(_) => CaptionMode::Grouped,
        }
    }

    /// Number of captions
    pub fn len(&self) -> usize {
        match self {
            Self::Flat(units) => units.len(),
            Self::Grouped(groups) => groups.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// On-screen text of each caption, words of a group joined by a space
    pub fn caption_texts(&self) -> Vec<String> {
        match self {
            Self::Flat(units) => units.iter().map(|u| u.word.clone()).collect(),
            Self::Grouped(groups) => groups
                .iter()
                .map(|g| g.iter().map(|w| w.word.as_str()).collect::<Vec<_>>().join(" "))
                .collect(),
        }
    }
}

/// Caption segmenter with validated settings
#[derive(Debug, Clone, Copy)]
pub struct CaptionSegmenter {
    frame_rate: FrameRate,
    params: CaptionParams,
    mode: CaptionMode,
}

impl CaptionSegmenter {
    /// Create a segmenter, rejecting invalid parameters up front
    pub fn new(fps: f64, params: CaptionParams, mode: CaptionMode) -> Result<Self, CaptionError> {
        let frame_rate = FrameRate::from_fps(fps)?;
        params.validate()?;

        Ok(Self {
            frame_rate,
            params,
            mode,
        })
    }

    /// Create a segmenter from a resolved style preset
    pub fn from_preset(fps: f64, preset: &StylePreset) -> Result<Self, CaptionError> {
        Self::new(fps, preset.params, preset.mode)
    }

    pub fn frame_rate(&self) -> FrameRate {
        self.frame_rate
    }

    pub fn params(&self) -> &CaptionParams {
        &self.params
    }

    pub fn mode(&self) -> CaptionMode {
        self.mode
    }

    /// Flatten the transcript and segment its words
    pub fn segment(&self, transcript: &Transcript) -> Result<CaptionTrack, CaptionError> {
        let words = transcript.words()?;
        Ok(self.segment_words(&words))
    }

    /// Segment an already flattened word sequence
    pub fn segment_words(&self, words: &[WordToken]) -> CaptionTrack {
        let track = match self.mode {
            CaptionMode::Flat => CaptionTrack::Flat(
                merge::merge_flat(words, &self.params)
                    .iter()
                    .map(|unit| self.to_frames(unit))
                    .collect(),
            ),
            CaptionMode::Grouped => CaptionTrack::Grouped(
                merge::merge_grouped(words, &self.params)
                    .into_iter()
                    .map(|group| group.iter().map(|word| self.to_frames(word)).collect())
                    .collect(),
            ),
        };

        debug!("Segmented {} words into {} {} captions at {}",
               words.len(), track.len(), self.mode, self.frame_rate);
        track
    }

    fn to_frames(&self, token: &WordToken) -> FramedWord {
        FramedWord {
            start: self.frame_rate.frame_at(token.start),
            end: self.frame_rate.frame_at(token.end),
            word: token.text.trim().to_string(),
        }
    }
}

/// Segment a transcript in one call
pub fn segment_transcript(
    transcript: &Transcript,
    fps: f64,
    params: CaptionParams,
    mode: CaptionMode,
) -> Result<CaptionTrack, CaptionError> {
    CaptionSegmenter::new(fps, params, mode)?.segment(transcript)
}
