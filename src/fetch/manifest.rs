use anyhow::{Context, Result};
use std::{fs, path::Path};
use tracing::info;

use crate::fetch::download::DownloadedFile;

/// Write `url,path,downloaded_at` rows for this run, replacing any older manifest.
pub fn write_manifest(records: &[DownloadedFile], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("creating {:?}", path))?;
    if records.is_empty() {
        wtr.write_record(["url", "path", "downloaded_at"])?;
    }
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    info!(path = %path.display(), rows = records.len(), "wrote manifest");
    Ok(())
}
