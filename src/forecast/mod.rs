// src/forecast/mod.rs

pub mod holt_winters;
pub mod seasonal_naive;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::{fs, path::Path};
use tracing::{info, instrument};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::ForecastError;
use crate::report::BatchReport;
use crate::vintage::latest::add_months;
use crate::vintage::LatestSeries;

pub use holt_winters::Ets;
pub use seasonal_naive::SeasonalNaive;

/// A baseline forecasting method over the latest-vintage series.
pub trait Forecaster {
    /// Column name in the forecast outputs.
    fn name(&self) -> &str;

    /// Exactly `horizon` values for the months following the last observation.
    fn forecast(&self, y: &LatestSeries, horizon: usize) -> Result<Vec<f64>, ForecastError>;
}

pub fn default_forecasters() -> Vec<Box<dyn Forecaster>> {
    vec![Box::new(SeasonalNaive::default()), Box::new(Ets::default())]
}

/// Forecast columns on a shared monthly index starting at `start`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSet {
    pub start: NaiveDate,
    pub horizon: usize,
    pub columns: Vec<(String, Vec<f64>)>,
}

impl ForecastSet {
    pub fn dates(&self) -> Vec<NaiveDate> {
        (0..self.horizon)
            .filter_map(|i| add_months(self.start, i))
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Run every method independently. A failing method is reported and left out.
#[instrument(level = "info", skip_all, fields(history = y.len(), horizon = horizon))]
pub fn run_forecasters(
    y: &LatestSeries,
    horizon: usize,
    methods: &[Box<dyn Forecaster>],
    diagnostics: &dyn Diagnostics,
) -> Result<(ForecastSet, BatchReport)> {
    let start = y
        .next_month()
        .context("forecast index runs past the supported calendar")?;

    let mut report = BatchReport::new();
    let mut columns = Vec::with_capacity(methods.len());
    for method in methods {
        let name = method.name().to_string();
        let result = method.forecast(y, horizon).and_then(|values| {
            if values.len() == horizon {
                Ok(values)
            } else {
                Err(ForecastError::ModelFit {
                    method: name.clone(),
                    reason: format!("returned {} values for a horizon of {}", values.len(), horizon),
                })
            }
        });
        match result {
            Ok(values) => {
                info!(method = %name, "forecast ok");
                report.record_success(name.clone());
                columns.push((name, values));
            }
            Err(e) => {
                diagnostics.emit(Diagnostic::MethodFailed {
                    method: name.clone(),
                    reason: e.to_string(),
                });
                report.record_failure(name, e);
            }
        }
    }

    Ok((
        ForecastSet {
            start,
            horizon,
            columns,
        },
        report,
    ))
}

/// One cell of the wide forecast table.
#[derive(Serialize)]
#[serde(untagged)]
enum Cell {
    Date(NaiveDate),
    Value(Option<f64>),
}

/// Wide table: history rows, then one row per forecast month, one column per method.
pub fn write_forecast_csv(path: &Path, y: &LatestSeries, fc: &ForecastSet) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("creating {:?}", path))?;

    let mut header = vec!["date".to_string(), y.name.clone()];
    header.extend(fc.columns.iter().map(|(name, _)| name.clone()));
    wtr.write_record(&header)?;

    for point in y.points() {
        let mut row = vec![Cell::Date(point.date), Cell::Value(Some(point.value))];
        row.extend(fc.columns.iter().map(|_| Cell::Value(None)));
        wtr.serialize(&row)?;
    }
    for (i, date) in fc.dates().into_iter().enumerate() {
        let mut row = vec![Cell::Date(date), Cell::Value(None)];
        row.extend(fc.columns.iter().map(|(_, values)| Cell::Value(values.get(i).copied())));
        wtr.serialize(&row)?;
    }
    wtr.flush()?;
    info!(path = %path.display(), "saved forecasts csv");
    Ok(())
}
