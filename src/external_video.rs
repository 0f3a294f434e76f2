//! external video downloader (A5): an opaque collaborator invoked for
//! `Chunk::ExternalVideo` artifacts (out of scope per §1, but a concrete
//! implementation is still required so the binary runs end to end)
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

#[async_trait]
pub trait ExternalVideoDownloader: Send + Sync {
    async fn download(&self, url: &str, destination_dir: &Path) -> Result<PathBuf>;
}

/// spawns an external program (e.g. a `yt-dlp`-shaped binary) configured via
/// `Config`
pub struct ProcessExternalVideoDownloader {
    program: String,
    args_template: Vec<String>,
}

impl ProcessExternalVideoDownloader {
    pub fn new(program: impl Into<String>, args_template: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args_template,
        }
    }
}

#[async_trait]
impl ExternalVideoDownloader for ProcessExternalVideoDownloader {
    async fn download(&self, url: &str, destination_dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(destination_dir).await?;

        let args: Vec<String> = self
            .args_template
            .iter()
            .map(|a| a.replace("{url}", url).replace("{dest}", &destination_dir.to_string_lossy()))
            .collect();

        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .await
            .map_err(|e| AppError::DownloadError(format!("failed to spawn {}: {e}", self.program)))?;

        if !status.success() {
            return Err(AppError::DownloadError(format!(
                "{} exited with {status}",
                self.program
            )));
        }

        Ok(destination_dir.to_path_buf())
    }
}

/// stands in for a real downloader in tests that do not want to shell out
pub struct NullExternalVideoDownloader;

#[async_trait]
impl ExternalVideoDownloader for NullExternalVideoDownloader {
    async fn download(&self, _url: &str, destination_dir: &Path) -> Result<PathBuf> {
        Ok(destination_dir.to_path_buf())
    }
}
