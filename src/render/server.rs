use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};

use crate::app_config::RenderConfig;
use crate::errors::RenderError;
use crate::render::Renderer;

// @module: Lifecycle of the locally spawned render server

/// Handle owning the render server process.
///
/// The process is killed when the handle is shut down or dropped.
#[derive(Debug)]
pub struct RenderServer {
    child: Option<Child>,
    project_dir: PathBuf,
}

impl RenderServer {
    /// Install dependencies if configured, then spawn the server in the
    /// render project directory. Does not wait for readiness.
    pub async fn start(config: &RenderConfig) -> Result<Self, RenderError> {
        let project_dir = config.project_dir.clone();
        if !project_dir.is_dir() {
            return Err(RenderError::ServerStartFailed(format!(
                "render project directory not found: {:?}", project_dir
            )));
        }

        if !config.install_command.is_empty() {
            info!("Installing render server dependencies: {}", config.install_command.join(" "));
            Self::run_install(&config.install_command, &project_dir, config.startup_timeout()).await?;
        }

        let (program, args) = config.start_command.split_first()
            .ok_or_else(|| RenderError::ServerStartFailed("empty start command".to_string()))?;

        let child = Command::new(program)
            .args(args)
            .current_dir(&project_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RenderError::ServerStartFailed(format!("failed to spawn '{}': {}", program, e)))?;

        info!("Render server started in the background (pid {})",
              child.id().map(|id| id.to_string()).unwrap_or_else(|| "unknown".to_string()));

        Ok(Self {
            child: Some(child),
            project_dir,
        })
    }

    async fn run_install(command: &[String], project_dir: &Path, timeout: Duration) -> Result<(), RenderError> {
        let Some((program, args)) = command.split_first() else {
            return Ok(());
        };

        let install_future = Command::new(program)
            .args(args)
            .current_dir(project_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .kill_on_drop(true)
            .status();

        let status = tokio::select! {
            result = install_future => {
                result.map_err(|e| RenderError::ServerStartFailed(format!("failed to run '{}': {}", program, e)))?
            },
            _ = tokio::time::sleep(timeout) => {
                return Err(RenderError::ServerStartFailed(format!(
                    "'{}' timed out after {} seconds", command.join(" "), timeout.as_secs()
                )));
            }
        };

        if !status.success() {
            return Err(RenderError::ServerStartFailed(format!(
                "'{}' exited with {}", command.join(" "), status
            )));
        }
        Ok(())
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Whether the server process is still alive
    pub fn is_running(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Poll the renderer's health check until it answers.
    ///
    /// Fails early when the server process exits, and with
    /// `ServerNotReady` once `timeout` has elapsed.
    pub async fn wait_ready<R: Renderer + ?Sized>(
        &mut self,
        renderer: &R,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<(), RenderError> {
        let started = Instant::now();

        loop {
            if let Some(child) = self.child.as_mut() {
                if let Ok(Some(status)) = child.try_wait() {
                    return Err(RenderError::ServerStartFailed(format!(
                        "server process exited with {} before becoming ready", status
                    )));
                }
            }

            match renderer.health_check().await {
                Ok(()) => {
                    info!("Render server ready after {:.1}s", started.elapsed().as_secs_f64());
                    return Ok(());
                }
                Err(e) => debug!("Render server not ready yet: {}", e),
            }

            if started.elapsed() >= timeout {
                return Err(RenderError::ServerNotReady(format!(
                    "no response within {} seconds", timeout.as_secs()
                )));
            }

            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Stop the server process and reap it
    pub async fn shutdown(mut self) -> Result<(), RenderError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        match child.try_wait() {
            Ok(Some(status)) => {
                warn!("Render server had already exited with {}", status);
                Ok(())
            }
            _ => {
                child.kill().await
                    .map_err(|e| RenderError::ServerStartFailed(format!("failed to stop server: {}", e)))?;
                info!("Render server stopped");
                Ok(())
            }
        }
    }
}
