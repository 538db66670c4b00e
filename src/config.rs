// src/config.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf, time::Duration};

pub const BASE_URL: &str = "https://www.ons.gov.uk";
pub const SERIES_PATH: &str =
    "/employmentandlabourmarket/peopleinwork/employmentandemployeetypes/timeseries/ap2y/lms";
pub const PREVIOUS_SUFFIX: &str = "/previous";

pub const MANIFEST_FILE: &str = "manifest.csv";
pub const LONG_TABLE_FILE: &str = "vacancies_long.csv";
pub const LONG_PARQUET_FILE: &str = "vacancies_long.parquet";
pub const BUILD_REPORT_FILE: &str = "build_report.json";
pub const LATEST_SERIES_FILE: &str = "latest_series.csv";
pub const FORECAST_CSV_FILE: &str = "forecast_latest.csv";
pub const FORECAST_CHART_FILE: &str = "forecast_latest.svg";

/// Pipeline settings. Every field has a default, so a YAML file only needs
/// the keys it wants to change.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub figures_dir: PathBuf,
    pub base_url: String,
    pub series_path: String,
    /// Downloaded files are named `<file_prefix>_<hash>.csv`.
    pub file_prefix: String,
    pub num_files: usize,
    pub request_delay_secs: u64,
    pub page_timeout_secs: u64,
    pub download_timeout_secs: u64,
    pub horizon: usize,
    pub write_parquet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            processed_dir: PathBuf::from("data/processed"),
            figures_dir: PathBuf::from("reports/figures"),
            base_url: BASE_URL.to_string(),
            series_path: SERIES_PATH.to_string(),
            file_prefix: "ap2y".to_string(),
            num_files: 20,
            request_delay_secs: 2,
            page_timeout_secs: 30,
            download_timeout_secs: 60,
            horizon: 12,
            write_parquet: false,
        }
    }
}

impl Config {
    /// Load from a YAML file, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_yaml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// The page listing the latest and previous CSV editions.
    pub fn previous_page(&self) -> String {
        format!("{}{}{}", self.base_url, self.series_path, PREVIOUS_SUFFIX)
    }

    pub fn long_table_path(&self) -> PathBuf {
        self.processed_dir.join(LONG_TABLE_FILE)
    }

    pub fn long_parquet_path(&self) -> PathBuf {
        self.processed_dir.join(LONG_PARQUET_FILE)
    }

    pub fn build_report_path(&self) -> PathBuf {
        self.processed_dir.join(BUILD_REPORT_FILE)
    }

    pub fn latest_series_path(&self) -> PathBuf {
        self.processed_dir.join(LATEST_SERIES_FILE)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.raw_dir.join(MANIFEST_FILE)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_secs(self.request_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn partial_yaml_keeps_defaults() -> Result<()> {
        let mut f = NamedTempFile::new()?;
        writeln!(f, "num_files: 5\nraw_dir: /tmp/raw\nwrite_parquet: true")?;

        let cfg = Config::load(Some(f.path()))?;
        assert_eq!(cfg.num_files, 5);
        assert_eq!(cfg.raw_dir, PathBuf::from("/tmp/raw"));
        assert!(cfg.write_parquet);
        assert_eq!(cfg.horizon, 12);
        assert_eq!(cfg.file_prefix, "ap2y");
        Ok(())
    }

    #[test]
    fn previous_page_joins_series_path() {
        let cfg = Config::default();
        assert_eq!(
            cfg.previous_page(),
            "https://www.ons.gov.uk/employmentandlabourmarket/peopleinwork/employmentandemployeetypes/timeseries/ap2y/lms/previous"
        );
        assert_eq!(cfg.long_table_path(), PathBuf::from("data/processed/vacancies_long.csv"));
    }
}
