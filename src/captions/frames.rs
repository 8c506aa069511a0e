use std::fmt;
use serde::{Deserialize, Serialize};

use crate::errors::CaptionError;

// @module: Seconds to frame index conversion

/// Integer frame rate used for timestamp conversion.
///
/// Fractional rates such as 29.97 are truncated, so caption frames line up
/// with the `fps` value sent to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameRate(u32);

impl FrameRate {
    // @creates: Frame rate from a measured fps value
    // @validates: Positive and finite, at least 1 after truncation
    pub fn from_fps(fps: f64) -> Result<Self, CaptionError> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(CaptionError::InvalidParameter(format!(
                "frame rate must be a positive number, got {}", fps
            )));
        }

        let truncated = fps.trunc();
        if truncated < 1.0 {
            return Err(CaptionError::InvalidParameter(format!(
                "frame rate {} truncates to zero frames per second", fps
            )));
        }
        if truncated > f64::from(u32::MAX) {
            return Err(CaptionError::InvalidParameter(format!(
                "frame rate {} is out of range", fps
            )));
        }

        Ok(Self(truncated as u32))
    }

    // @returns: Whole frames per second
    pub fn fps(&self) -> u32 {
        self.0
    }

    /// Frame index containing the given timestamp: `floor(seconds * fps)`
    pub fn frame_at(&self, seconds: f64) -> i64 {
        (seconds * f64::from(self.0)).floor() as i64
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}fps", self.0)
    }
}
