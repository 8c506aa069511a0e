use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::Client;
use std::time::Duration;

use crate::app_config::RenderConfig;
use crate::errors::RenderError;
use crate::render::{RenderRequest, RenderResponse, Renderer};

/// HTTP client for the render server
#[derive(Debug, Clone)]
pub struct RenderClient {
    /// Server root, used for readiness probes
    base_url: String,
    /// Full URL of the render route
    render_url: String,
    /// HTTP client for render jobs
    client: Client,
    /// Short-timeout client for readiness probes
    probe_client: Client,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

impl RenderClient {
    /// Create a client with default timeouts and retries
    pub fn new(endpoint: impl Into<String>, route: &str) -> Self {
        let base_url = endpoint.into().trim_end_matches('/').to_string();
        let render_url = format!("{}/{}", base_url, route.trim_start_matches('/'));

        Self {
            base_url,
            render_url,
            client: Client::builder()
                .timeout(Duration::from_secs(1800))
                .build()
                .unwrap_or_default(),
            probe_client: Self::build_probe_client(),
            max_retries: 2,
            backoff_base_ms: 1000,
        }
    }

    /// Create a client from the render configuration
    pub fn with_config(config: &RenderConfig) -> Self {
        Self {
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            render_url: config.render_url(),
            client: Client::builder()
                .timeout(config.request_timeout())
                .build()
                .unwrap_or_default(),
            probe_client: Self::build_probe_client(),
            max_retries: config.retry_count,
            backoff_base_ms: config.retry_backoff_ms,
        }
    }

    fn build_probe_client() -> Client {
        Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default()
    }

    pub fn render_url(&self) -> &str {
        &self.render_url
    }

    async fn send_once(&self, request: &RenderRequest) -> Result<RenderResponse, RenderError> {
        let response = self.client.post(&self.render_url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    RenderError::ConnectionError(e.to_string())
                } else if e.is_timeout() {
                    RenderError::RequestFailed(format!("render request timed out: {}", e))
                } else {
                    RenderError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response.text().await
            .map_err(|e| RenderError::RequestFailed(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(RenderError::ApiError {
                status_code: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str::<RenderResponse>(&body).map_err(|e| {
            let preview: String = body.chars().take(500).collect();
            error!("Failed to parse render response: {}. Raw response (first 500 chars): {}", e, preview);
            RenderError::ParseError(e.to_string())
        })
    }
}

#[async_trait]
impl Renderer for RenderClient {
    /// Post the job, retrying connection failures and server errors with
    /// exponential backoff. Timeouts and client errors are returned
    /// immediately.
    async fn render(&self, request: &RenderRequest) -> Result<RenderResponse, RenderError> {
        let mut attempt = 0;

        loop {
            debug!("Posting render job for {} to {} (attempt {}/{})",
                   request.video_file, self.render_url, attempt + 1, self.max_retries + 1);

            match self.send_once(request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let backoff_ms = self.backoff_base_ms * (1u64 << (attempt - 1).min(16));
                    warn!("Render request failed: {} - retrying in {}ms ({}/{})",
                          e, backoff_ms, attempt, self.max_retries);
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
                Err(e) => {
                    error!("Render request failed: {}", e);
                    return Err(e);
                }
            }
        }
    }

    /// Any HTTP response from the server root means it is listening
    async fn health_check(&self) -> Result<(), RenderError> {
        self.probe_client.get(&self.base_url)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| RenderError::ConnectionError(e.to_string()))
    }
}
