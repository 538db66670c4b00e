// src/vintage/latest.rs

use chrono::{Months, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::NoUsableInput;
use crate::vintage::MonthlyObservation;

pub const LATEST_NAME: &str = "Latest vintage";

/// Month `offset` months after `start`.
pub fn add_months(start: NaiveDate, offset: usize) -> Option<NaiveDate> {
    u32::try_from(offset)
        .ok()
        .and_then(|n| start.checked_add_months(Months::new(n)))
}

/// Contiguous monthly series: `values[i]` belongs to `start + i` months.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestSeries {
    pub name: String,
    pub start: NaiveDate,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl LatestSeries {
    pub fn new(start: NaiveDate, values: Vec<f64>) -> Self {
        Self {
            name: LATEST_NAME.to_string(),
            start,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn month_at(&self, i: usize) -> Option<NaiveDate> {
        add_months(self.start, i)
    }

    /// First month after the last observation; forecasts start here.
    pub fn next_month(&self) -> Option<NaiveDate> {
        self.month_at(self.values.len())
    }

    /// (month, value) pairs in order.
    pub fn points(&self) -> Vec<SeriesPoint> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, &value)| self.month_at(i).map(|date| SeriesPoint { date, value }))
            .collect()
    }
}

/// For each observation month take the value from its most recent vintage.
///
/// Rows without a vintage cannot be ordered and are ignored. A month takes
/// the value of its latest vintage that has one; months null in every
/// vintage are dropped. The result is indexed as consecutive
/// months from the first observed month; a gap is reported as `SeriesGap`.
pub fn latest_series(
    table: &[MonthlyObservation],
    diagnostics: &dyn Diagnostics,
) -> Result<LatestSeries, NoUsableInput> {
    let mut dated: Vec<&MonthlyObservation> =
        table.iter().filter(|r| r.vintage_date.is_some()).collect();
    dated.sort_by_key(|r| r.vintage_date);

    // A null in a newer vintage does not hide an older published value.
    let mut by_month: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in dated {
        if let Some(v) = row.value {
            by_month.insert(row.observation_month, v);
        }
    }

    let observed: Vec<(NaiveDate, f64)> = by_month.into_iter().collect();

    let start = observed.first().map(|(m, _)| *m).ok_or(NoUsableInput::EmptyTable)?;

    if let Some(missing) = observed
        .iter()
        .enumerate()
        .find_map(|(i, (month, _))| add_months(start, i).filter(|expected| expected != month))
    {
        diagnostics.emit(Diagnostic::SeriesGap { missing });
    }

    let values: Vec<f64> = observed.into_iter().map(|(_, v)| v).collect();
    debug!(start = %start, len = values.len(), "latest series");
    Ok(LatestSeries::new(start, values))
}
