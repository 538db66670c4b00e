// src/vintage/mod.rs

pub mod aggregate;
pub mod latest;
pub mod revisions;
pub mod store;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use aggregate::{build_long, dedup_vintages, BuildOutput};
pub use latest::{latest_series, LatestSeries};
pub use revisions::{most_revised_month, revision_path, RevisionPoint};

/// One published value for one month, as released at one vintage.
///
/// Field order is the column order of the persisted long table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyObservation {
    pub series_id: Option<String>,
    pub dataset_id: Option<String>,
    pub pre_unit: Option<String>,
    pub unit: Option<String>,
    /// Release date of the file this row came from; `None` when the file had none.
    pub vintage_date: Option<NaiveDate>,
    /// First day of the month the value refers to.
    pub observation_month: NaiveDate,
    pub value: Option<f64>,
}

impl MonthlyObservation {
    /// Identity of a row in the long table.
    pub fn key(&self) -> (Option<&str>, Option<NaiveDate>, NaiveDate) {
        (
            self.series_id.as_deref(),
            self.vintage_date,
            self.observation_month,
        )
    }
}

/// The long-format table: every (series, vintage, month) observation.
pub type LongTable = Vec<MonthlyObservation>;
