/*!
 * Render server integration.
 *
 * The render server composites the captions onto the video. This module
 * holds everything needed to drive it:
 * - `payload`: The JSON job sent to the server and its reply
 * - `client`: HTTP client for the render route
 * - `server`: Handle owning the locally spawned server process
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::RenderError;

pub mod client;
pub mod payload;
pub mod server;

pub use client::RenderClient;
pub use payload::{RenderRequest, RenderResponse};
pub use server::RenderServer;

/// Common trait for render backends
///
/// The orchestration layer only depends on this trait, so tests can swap in
/// a backend that never touches the network.
#[async_trait]
pub trait Renderer: Send + Sync + Debug {
    /// Submit a render job and wait for its completion
    ///
    /// # Arguments
    /// * `request` - The render job
    ///
    /// # Returns
    /// * `Result<RenderResponse, RenderError>` - Where the server wrote the video, or an error
    async fn render(&self, request: &RenderRequest) -> Result<RenderResponse, RenderError>;

    /// Check whether the backend accepts requests
    async fn health_check(&self) -> Result<(), RenderError>;
}
