use std::path::Path;
use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::CaptionError;

// @module: Word-level transcript model

// @struct: Single transcribed word with timing in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordToken {
    // @field: Start time in seconds
    pub start: f64,

    // @field: End time in seconds
    pub end: f64,

    // @field: Word text, whitespace preserved as transcribed
    #[serde(rename = "word")]
    pub text: String,
}

impl WordToken {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// Word record as it appears in the transcription output.
///
/// Every field is optional on the wire so that a missing one can be reported
/// with its position instead of a generic parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptWord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
}

impl From<WordToken> for TranscriptWord {
    fn from(token: WordToken) -> Self {
        Self {
            start: Some(token.start),
            end: Some(token.end),
            word: Some(token.text),
        }
    }
}

/// One transcription segment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub words: Vec<TranscriptWord>,
}

/// Transcript document produced by the speech-transcription service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    /// Build a single-segment transcript from already validated tokens
    pub fn from_words(words: Vec<WordToken>) -> Self {
        Self {
            segments: vec![TranscriptSegment {
                words: words.into_iter().map(TranscriptWord::from).collect(),
            }],
        }
    }

    /// Parse a transcript document from JSON text
    pub fn from_json_str(content: &str) -> Result<Self, CaptionError> {
        serde_json::from_str(content)
            .map_err(|e| CaptionError::MalformedInput(format!("invalid transcript document: {}", e)))
    }

    /// Load a transcript document from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read transcript file: {:?}", path))?;
        let transcript = Self::from_json_str(&content)
            .with_context(|| format!("Failed to parse transcript file: {:?}", path))?;

        debug!("Loaded transcript {:?}: {} segments, {} words",
               path, transcript.segments.len(), transcript.word_count());
        Ok(transcript)
    }

    /// Total number of word records across all segments
    pub fn word_count(&self) -> usize {
        self.segments.iter().map(|s| s.words.len()).sum()
    }

    /// Flatten all segments into one ordered word sequence.
    ///
    /// Words keep segment order, then intra-segment order. Each record must
    /// carry `start`, `end` and `word`, with finite timestamps and
    /// `end >= start`. Starts must not decrease across the flattened
    /// sequence.
    pub fn words(&self) -> Result<Vec<WordToken>, CaptionError> {
        let mut tokens: Vec<WordToken> = Vec::with_capacity(self.word_count());

        for (segment_idx, segment) in self.segments.iter().enumerate() {
            for (word_idx, word) in segment.words.iter().enumerate() {
                let missing = |field: &str| {
                    CaptionError::MalformedInput(format!(
                        "segment {} word {} is missing '{}'", segment_idx, word_idx, field
                    ))
                };

                let start = word.start.ok_or_else(|| missing("start"))?;
                let end = word.end.ok_or_else(|| missing("end"))?;
                let text = word.word.clone().ok_or_else(|| missing("word"))?;

                if !start.is_finite() || !end.is_finite() {
                    return Err(CaptionError::MalformedInput(format!(
                        "segment {} word {} has a non-finite timestamp", segment_idx, word_idx
                    )));
                }
                if end < start {
                    return Err(CaptionError::MalformedInput(format!(
                        "segment {} word {} ends before it starts ({} < {})",
                        segment_idx, word_idx, end, start
                    )));
                }

                if let Some(previous) = tokens.last() {
                    if start < previous.start {
                        return Err(CaptionError::MalformedInput(format!(
                            "segment {} word {} starts before the previous word ({} < {})",
                            segment_idx, word_idx, start, previous.start
                        )));
                    }
                }

                tokens.push(WordToken { start, end, text });
            }
        }

        Ok(tokens)
    }
}
