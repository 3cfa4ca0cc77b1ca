// Shared model cache: resolves the on-disk models directory and downloads
// model files on first use. Downloads stream to a temp file and are renamed
// into place so an interrupted fetch never leaves a truncated model behind.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use futures_util::StreamExt;
use log::{debug, info};
use reqwest::Client;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{PipelineError, PipelineResult};

/// Default cache directory for downloaded models.
pub fn default_models_dir() -> PipelineResult<PathBuf> {
    dirs::cache_dir()
        .map(|dir| dir.join("voice-sentiment").join("models"))
        .ok_or_else(|| {
            PipelineError::Config("could not resolve a cache directory for models".to_string())
        })
}

pub fn resolve_models_dir(configured: Option<&Path>) -> PipelineResult<PathBuf> {
    match configured {
        Some(dir) => Ok(dir.to_path_buf()),
        None => default_models_dir(),
    }
}

/// Access token for gated model hosts. Read from the environment on demand and
/// never logged.
pub fn auth_token() -> Option<String> {
    std::env::var("HF_TOKEN").ok().filter(|t| !t.is_empty())
}

/// Make sure `dest` exists, downloading it from `url` if needed. Any failure
/// maps to `ModelLoad`; there is no retry, a failed fetch aborts the run.
pub async fn ensure_file(url: &str, dest: &Path) -> PipelineResult<()> {
    if dest.exists() {
        debug!("Model file already cached: {:?}", dest);
        return Ok(());
    }

    download_file(url, dest)
        .await
        .map_err(|e| PipelineError::ModelLoad(format!("{}: {}", file_label(dest), e)))
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

async fn download_file(url: &str, dest: &Path) -> Result<()> {
    info!("Downloading {} from {}", file_label(dest), url);

    if let Some(parent) = dest.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let client = Client::new();
    let mut request = client.get(url);
    if let Some(token) = auth_token() {
        request = request.bearer_auth(token);
    }

    let response = request
        .send()
        .await
        .map_err(|e| anyhow!("failed to start download: {}", e))?;

    if !response.status().is_success() {
        // 401/403 on a gated repository usually means HF_TOKEN is missing or
        // lacks access.
        return Err(anyhow!(
            "download failed with status {} (set HF_TOKEN for gated models)",
            response.status()
        ));
    }

    let total_size = response.content_length().unwrap_or(0);
    info!(
        "Downloading {} ({:.1} MB)",
        file_label(dest),
        total_size as f64 / (1024.0 * 1024.0)
    );

    let temp_path = dest.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)
        .await
        .map_err(|e| anyhow!("failed to create temp file: {}", e))?;

    let mut stream = response.bytes_stream();
    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| anyhow!("download error: {}", e))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| anyhow!("failed to write chunk: {}", e))?;
    }
    file.flush().await?;
    drop(file);

    fs::rename(&temp_path, dest)
        .await
        .map_err(|e| anyhow!("failed to move model into place: {}", e))?;

    info!("Downloaded {} to {:?}", file_label(dest), dest);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_models_dir_prefers_configured() {
        let configured = PathBuf::from("/tmp/custom-models");
        let resolved = resolve_models_dir(Some(&configured)).unwrap();
        assert_eq!(resolved, configured);
    }

    #[tokio::test]
    async fn test_ensure_file_skips_existing() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("model.onnx");
        std::fs::write(&dest, b"cached").unwrap();

        // URL is bogus on purpose; a cached file must short-circuit the fetch.
        ensure_file("http://invalid.invalid/model.onnx", &dest)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"cached");
    }
}
