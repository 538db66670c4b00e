// src/fetch/links.rs

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

static CSV_HREF: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.csv($|\?)").expect("csv href regex"));
static ANCHORS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("CSS selector for links should be valid"));

const MAX_RETRIES: usize = 3;
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// GET a page as text, retrying transport errors a couple of times.
/// HTTP error statuses are not retried.
pub async fn fetch_html(client: &Client, url: &str, timeout: Duration) -> Result<String> {
    info!(url, "fetching page");
    let mut attempt = 0;
    loop {
        attempt += 1;
        match client.get(url).timeout(timeout).send().await {
            Ok(resp) => {
                let resp = resp
                    .error_for_status()
                    .with_context(|| format!("GET {}", url))?;
                return resp
                    .text()
                    .await
                    .with_context(|| format!("reading body from {}", url));
            }
            Err(e) if attempt < MAX_RETRIES => {
                warn!(url, attempt, error = %e, "page fetch failed; retrying");
                sleep(RETRY_DELAY).await;
            }
            Err(e) => return Err(e).with_context(|| format!("GET {}", url)),
        }
    }
}

/// CSV download links on an ONS time series page.
///
/// A link qualifies when its text mentions "csv" and either the href ends in
/// `.csv` (optionally followed by a query) or the text says "download". This
/// catches both direct files and `generator?format=csv&uri=...` links.
/// Results are absolute, deduplicated and in page order.
pub fn extract_csv_links(html: &str, base_url: &str) -> Result<Vec<String>> {
    let base = Url::parse(base_url).with_context(|| format!("parsing base url {:?}", base_url))?;
    let document = Html::parse_document(html);

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for elem in document.select(&ANCHORS) {
        let Some(href) = elem.value().attr("href").filter(|h| !h.is_empty()) else {
            continue;
        };
        let text = elem.text().collect::<String>().trim().to_lowercase();
        if !(CSV_HREF.is_match(href) || text.contains("download")) || !text.contains("csv") {
            continue;
        }
        match base.join(href) {
            Ok(url) => {
                let url = url.to_string();
                if seen.insert(url.clone()) {
                    links.push(url);
                }
            }
            Err(e) => debug!(href, error = %e, "unresolvable link"),
        }
    }
    Ok(links)
}
