/*!
 * Error types for the reelcap application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors raised while turning a transcript into captions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaptionError {
    /// A word record is missing a field or carries unusable values
    #[error("Malformed transcript input: {0}")]
    MalformedInput(String),

    /// A segmentation parameter is out of range
    #[error("Invalid caption parameter: {0}")]
    InvalidParameter(String),
}

/// Errors from the external media tools (ffprobe, ffmpeg)
#[derive(Error, Debug)]
pub enum MediaError {
    /// The tool could not be spawned or exited with a failure
    #[error("{tool} failed: {message}")]
    ToolFailed {
        /// Name of the external tool
        tool: String,
        /// Filtered stderr or spawn error
        message: String,
    },

    /// The tool did not finish in time
    #[error("{tool} timed out after {secs} seconds")]
    Timeout {
        /// Name of the external tool
        tool: String,
        /// Configured timeout
        secs: u64,
    },

    /// The tool output could not be interpreted
    #[error("Unexpected media tool output: {0}")]
    InvalidOutput(String),

    /// The media file is neither an image nor a video
    #[error("Unsupported media: {0}")]
    UnsupportedMedia(String),
}

/// Errors that can occur when talking to the render server
#[derive(Error, Debug)]
pub enum RenderError {
    /// Error when making the render request fails
    #[error("Render request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing the render response fails
    #[error("Failed to parse render response: {0}")]
    ParseError(String),

    /// Error returned by the render server itself
    #[error("Render server responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error body from the server
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The server process could not be started
    #[error("Failed to start render server: {0}")]
    ServerStartFailed(String),

    /// The server did not become ready
    #[error("Render server not ready: {0}")]
    ServerNotReady(String),
}

impl RenderError {
    /// Whether a retry could reasonably succeed.
    ///
    /// Timed out or otherwise failed requests are not retried: the server
    /// may still be rendering the job.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from caption segmentation
    #[error("Caption error: {0}")]
    Caption(#[from] CaptionError),

    /// Error from the media tools
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// Error from the render server
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
