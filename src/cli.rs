//! Arguments and exit handling shared by the binaries.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use tracing::error;

use crate::config::Config;
use crate::error::NoUsableInput;
use crate::process::parse_month;

/// Config file plus directory overrides. Flags win over the file.
#[derive(Debug, Clone, Default, Args)]
pub struct PathArgs {
    /// YAML config file; every key is optional
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding the downloaded raw CSVs and manifest
    #[arg(long)]
    pub raw_dir: Option<PathBuf>,

    /// Directory for the long table and build report
    #[arg(long)]
    pub processed_dir: Option<PathBuf>,

    /// Directory for forecast and revision outputs
    #[arg(long)]
    pub figures_dir: Option<PathBuf>,
}

impl PathArgs {
    pub fn resolve(&self) -> Result<Config> {
        let mut cfg = Config::load(self.config.as_deref())?;
        if let Some(d) = &self.raw_dir {
            cfg.raw_dir = d.clone();
        }
        if let Some(d) = &self.processed_dir {
            cfg.processed_dir = d.clone();
        }
        if let Some(d) = &self.figures_dir {
            cfg.figures_dir = d.clone();
        }
        Ok(cfg)
    }
}

/// `YYYY-MM` or `YYYY-MM-DD`, snapped to the first of the month.
pub fn month_arg(s: &str) -> Result<NaiveDate, String> {
    parse_month(s).ok_or_else(|| format!("expected YYYY-MM or YYYY-MM-DD, got {:?}", s))
}

/// The `NoUsableInput` code when that is the cause anywhere in the chain, else 1.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<NoUsableInput>())
        .map_or(1, NoUsableInput::exit_code)
}

pub fn finish(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}
