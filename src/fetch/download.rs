use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use sha1::{Digest, Sha1};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::info;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// One row of the download manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadedFile {
    pub url: String,
    pub path: String,
    pub downloaded_at: String,
}

/// `<prefix>_<first 16 hex chars of sha1(url)>.csv`. The same URL always maps
/// to the same file, so a re-download overwrites.
pub fn file_name_for(url: &str, prefix: &str) -> String {
    let digest = format!("{:x}", Sha1::digest(url.as_bytes()));
    format!("{}_{}.csv", prefix, &digest[..16])
}

/// Download `url` into `dest_dir` and return its manifest entry.
pub async fn download_file(
    client: &Client,
    url: &str,
    dest_dir: impl AsRef<Path>,
    prefix: &str,
    timeout: Duration,
) -> Result<DownloadedFile> {
    let dest_dir = dest_dir.as_ref();
    fs::create_dir_all(dest_dir)
        .await
        .with_context(|| format!("creating {:?}", dest_dir))?;
    let dest_path: PathBuf = dest_dir.join(file_name_for(url, prefix));

    info!(url, path = %dest_path.display(), "downloading");
    let resp = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .with_context(|| format!("GET {}", url))?
        .error_for_status()
        .with_context(|| format!("GET {}", url))?;
    let bytes = resp
        .bytes()
        .await
        .with_context(|| format!("reading body from {}", url))?;
    fs::write(&dest_path, &bytes)
        .await
        .with_context(|| format!("writing {:?}", dest_path))?;

    Ok(DownloadedFile {
        url: url.to_string(),
        path: dest_path.to_string_lossy().into_owned(),
        downloaded_at: Utc::now().format(TIMESTAMP_FORMAT).to_string(),
    })
}
