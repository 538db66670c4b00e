// src/fetch/mod.rs

pub mod download;
pub mod links;
pub mod manifest;

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, instrument};

use crate::config::Config;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::NoUsableInput;
use crate::report::BatchReport;

pub use download::{download_file, file_name_for, DownloadedFile};
pub use links::{extract_csv_links, fetch_html};
pub use manifest::write_manifest;

pub fn build_client() -> Result<Client> {
    Client::builder()
        .cookie_store(true)
        .gzip(true)
        .build()
        .context("building HTTP client")
}

/// Discover CSV links on the "previous versions" page, download the first
/// `num_files` one at a time and record them in the manifest.
pub async fn ingest(cfg: &Config, diagnostics: &dyn Diagnostics) -> Result<BatchReport> {
    let client = build_client()?;
    ingest_with_client(&client, cfg, diagnostics).await
}

#[instrument(level = "info", skip_all, fields(raw_dir = %cfg.raw_dir.display()))]
pub async fn ingest_with_client(
    client: &Client,
    cfg: &Config,
    diagnostics: &dyn Diagnostics,
) -> Result<BatchReport> {
    let page = cfg.previous_page();
    let html = fetch_html(client, &page, Duration::from_secs(cfg.page_timeout_secs)).await?;
    let mut links = extract_csv_links(&html, &cfg.base_url)?;
    if links.is_empty() {
        error!(page = %page, "no CSV links found; check the page structure");
        return Err(NoUsableInput::NoLinks(page).into());
    }
    info!(count = links.len(), page = %page, "found CSV links");

    // The page lists the latest edition first.
    links.truncate(cfg.num_files);

    let (downloads, report) = download_links(client, &links, cfg, diagnostics).await;
    if downloads.is_empty() {
        error!("no files downloaded");
        return Err(NoUsableInput::NoDownloads.into());
    }

    write_manifest(&downloads, &cfg.manifest_path())?;
    info!(downloaded = downloads.len(), failed = report.failed.len(), "ingest done");
    Ok(report)
}

/// Sequential downloads with a fixed pause before each request. Failures are
/// reported and skipped.
pub async fn download_links(
    client: &Client,
    links: &[String],
    cfg: &Config,
    diagnostics: &dyn Diagnostics,
) -> (Vec<DownloadedFile>, BatchReport) {
    let timeout = Duration::from_secs(cfg.download_timeout_secs);
    let mut report = BatchReport::new();
    let mut downloads = Vec::with_capacity(links.len());

    for url in links {
        sleep(cfg.request_delay()).await;
        match download_file(client, url, &cfg.raw_dir, &cfg.file_prefix, timeout).await {
            Ok(file) => {
                report.record_success(url.clone());
                downloads.push(file);
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                diagnostics.emit(Diagnostic::DownloadFailed {
                    url: url.clone(),
                    reason: reason.clone(),
                });
                report.record_failure(url.clone(), reason);
            }
        }
    }
    (downloads, report)
}
