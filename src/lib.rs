/*!
 * # reelcap - captions for vertical reels
 *
 * A Rust library that turns word-level transcription timestamps into
 * caption data for a caption rendering server.
 *
 * ## Features
 *
 * - Segment transcripts into captions under word, character and timing limits
 * - Two caption shapes:
 *   - flat: merged text per caption
 *   - grouped: individually timed words per caption, for word highlighting
 * - Style presets for the supported caption looks
 * - Crop background images and videos to 9:16 with ffmpeg
 * - Drive a local render server: start, readiness, render jobs, shutdown
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `transcript`: Transcript document model and word flattening
 * - `captions`: Caption segmentation:
 *   - `captions::merge`: Flat and grouped merge policies
 *   - `captions::frames`: Seconds to frame conversion
 *   - `captions::styles`: Style presets
 * - `media`: ffprobe probing and ffmpeg cropping
 * - `render`: Render payload, HTTP client and server process handle
 * - `file_utils`: File system operations
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod captions;
pub mod errors;
pub mod file_utils;
pub mod media;
pub mod render;
pub mod transcript;

// Re-export main types for easier usage
pub use app_config::Config;
pub use captions::{segment_transcript, CaptionMode, CaptionParams, CaptionSegmenter, CaptionStyle, CaptionTrack, FramedWord};
pub use transcript::{Transcript, WordToken};
pub use errors::{AppError, CaptionError, MediaError, RenderError};
