/*!
 * Caption style presets.
 *
 * Each visual style the renderer knows maps to one row of a fixed table:
 * the merge mode and the segmentation limits. The segmenter never looks at
 * the style itself, only at the resolved parameters.
 */

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::captions::{CaptionMode, CaptionParams};

/// Visual caption style understood by the render server
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaptionStyle {
    // @style: Two-word glowing captions, one merged text per caption
    Glowing,
    // @style: Word highlight over a moving background box
    BackgroundTracking,
    // @style: Word highlight by colour change
    ColorTracking,
    // @style: Typewriter reveal over a background box
    #[default]
    TypingBackground,
}

/// Resolved segmentation settings for a style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StylePreset {
    pub style: CaptionStyle,
    pub mode: CaptionMode,
    pub params: CaptionParams,
}

// Rows are declared in the same order as the CaptionStyle variants.
static PRESETS: [StylePreset; 4] = [
    StylePreset {
        style: CaptionStyle::Glowing,
        mode: CaptionMode::Flat,
        params: CaptionParams { max_words: 2, max_overlap_seconds: 0.6, max_characters: 12 },
    },
    StylePreset {
        style: CaptionStyle::BackgroundTracking,
        mode: CaptionMode::Grouped,
        params: CaptionParams { max_words: 3, max_overlap_seconds: 1.0, max_characters: 18 },
    },
    StylePreset {
        style: CaptionStyle::ColorTracking,
        mode: CaptionMode::Grouped,
        params: CaptionParams { max_words: 4, max_overlap_seconds: 2.0, max_characters: 20 },
    },
    StylePreset {
        style: CaptionStyle::TypingBackground,
        mode: CaptionMode::Grouped,
        params: CaptionParams { max_words: 6, max_overlap_seconds: 2.5, max_characters: 28 },
    },
];

impl CaptionStyle {
    /// All styles, in table order
    pub const ALL: [CaptionStyle; 4] = [
        Self::Glowing,
        Self::BackgroundTracking,
        Self::ColorTracking,
        Self::TypingBackground,
    ];

    // @returns: Preset row for this style
    pub fn preset(self) -> &'static StylePreset {
        &PRESETS[self as usize]
    }

    // @returns: Tag sent to the renderer as `subtitle_type`
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Glowing => "glowing",
            Self::BackgroundTracking => "background_tracking",
            Self::ColorTracking => "color_tracking",
            Self::TypingBackground => "typing_background",
        }
    }
}

impl std::fmt::Display for CaptionStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl std::str::FromStr for CaptionStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|style| style.tag() == normalized)
            .ok_or_else(|| anyhow!("Invalid caption style: {}", s))
    }
}

/// Per-field overrides applied on top of a style preset
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct CaptionOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<CaptionMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_words: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_overlap_seconds: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_characters: Option<usize>,
}

impl CaptionOverrides {
    /// Whether any field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fields set in `other` win over fields set in `self`
    pub fn merged_with(&self, other: &CaptionOverrides) -> CaptionOverrides {
        CaptionOverrides {
            mode: other.mode.or(self.mode),
            max_words: other.max_words.or(self.max_words),
            max_overlap_seconds: other.max_overlap_seconds.or(self.max_overlap_seconds),
            max_characters: other.max_characters.or(self.max_characters),
        }
    }
}

impl StylePreset {
    /// Apply overrides, keeping the preset's values for unset fields
    pub fn with_overrides(&self, overrides: &CaptionOverrides) -> StylePreset {
        StylePreset {
            style: self.style,
            mode: overrides.mode.unwrap_or(self.mode),
            params: CaptionParams {
                max_words: overrides.max_words.unwrap_or(self.params.max_words),
                max_overlap_seconds: overrides
                    .max_overlap_seconds
                    .unwrap_or(self.params.max_overlap_seconds),
                max_characters: overrides.max_characters.unwrap_or(self.params.max_characters),
            },
        }
    }
}
