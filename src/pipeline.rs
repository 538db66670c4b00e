// src/pipeline.rs

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::chart;
use crate::config::{Config, FORECAST_CHART_FILE, FORECAST_CSV_FILE};
use crate::diagnostics::Diagnostics;
use crate::error::NoUsableInput;
use crate::fetch;
use crate::forecast::{default_forecasters, run_forecasters, write_forecast_csv, ForecastSet};
use crate::report::BatchReport;
use crate::vintage::{
    build_long, latest_series, most_revised_month, revision_path, store, BuildOutput,
    LongTable, RevisionPoint,
};

pub async fn ingest(cfg: &Config, diagnostics: &dyn Diagnostics) -> Result<BatchReport> {
    fetch::ingest(cfg, diagnostics).await
}

/// Rebuild the long table from every raw file and persist it with its build report.
#[instrument(level = "info", skip_all)]
pub fn transform(cfg: &Config, diagnostics: &dyn Diagnostics) -> Result<BuildOutput> {
    let out = build_long(&cfg.raw_dir, diagnostics)?;

    store::write_long(&cfg.long_table_path(), &out.table)?;
    if cfg.write_parquet {
        store::write_long_parquet(&cfg.long_parquet_path(), &out.table)?;
    }
    store::write_report(&cfg.build_report_path(), &out.report)?;

    info!(
        rows = out.table.len(),
        used = out.report.succeeded.len(),
        skipped = out.report.failed.len(),
        "transform done"
    );
    Ok(out)
}

fn load_long(cfg: &Config) -> Result<LongTable> {
    let path = cfg.long_table_path();
    store::read_long(&path)
        .with_context(|| format!("loading {}; run transform first", path.display()))
}

/// Latest-vintage series plus baseline forecasts, written as CSV and chart.
#[instrument(level = "info", skip(cfg, diagnostics))]
pub fn forecast(
    cfg: &Config,
    horizon: usize,
    diagnostics: &dyn Diagnostics,
) -> Result<(ForecastSet, BatchReport)> {
    let table = load_long(cfg)?;
    let y = latest_series(&table, diagnostics)?;
    store::write_csv(&cfg.latest_series_path(), &y.points())?;

    let (fc, report) = run_forecasters(&y, horizon, &default_forecasters(), diagnostics)?;
    if fc.is_empty() {
        warn!(history = y.len(), "no forecast method succeeded; writing history only");
    }

    write_forecast_csv(&cfg.figures_dir.join(FORECAST_CSV_FILE), &y, &fc)?;
    chart::plot_forecast(&cfg.figures_dir.join(FORECAST_CHART_FILE), &y, &fc)?;
    Ok((fc, report))
}

/// Revision path for `month`, or for the most revised month when none is given.
#[instrument(level = "info", skip(cfg))]
pub fn revisions(cfg: &Config, month: Option<NaiveDate>) -> Result<(NaiveDate, Vec<RevisionPoint>)> {
    let table = load_long(cfg)?;
    let month = match month {
        Some(m) => m,
        None => most_revised_month(&table).ok_or(NoUsableInput::EmptyTable)?,
    };
    let path = revision_path(&table, month)?;

    let stem = format!("revision_path_{}", month.format("%Y-%m"));
    store::write_csv(&cfg.figures_dir.join(format!("{}.csv", stem)), &path)?;
    chart::plot_revision_path(&cfg.figures_dir.join(chart::revision_chart_name(month)), month, &path)?;
    info!(month = %month, vintages = path.len(), "revision path written");
    Ok((month, path))
}

/// Optional ingest, then transform, forecast and revisions.
pub async fn run_all(
    cfg: &Config,
    skip_ingest: bool,
    month: Option<NaiveDate>,
    diagnostics: &dyn Diagnostics,
) -> Result<()> {
    if skip_ingest {
        info!("skipping ingest; using existing raw files");
    } else {
        ingest(cfg, diagnostics).await?;
    }
    transform(cfg, diagnostics)?;
    forecast(cfg, cfg.horizon, diagnostics)?;
    revisions(cfg, month)?;
    Ok(())
}
