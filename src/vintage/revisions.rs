use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::NoUsableInput;
use crate::vintage::MonthlyObservation;

/// One published estimate of a fixed observation month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevisionPoint {
    pub vintage_date: NaiveDate,
    pub value: Option<f64>,
}

/// How the estimate for `month` changed across releases, oldest release first.
pub fn revision_path(
    table: &[MonthlyObservation],
    month: NaiveDate,
) -> Result<Vec<RevisionPoint>, NoUsableInput> {
    let mut path: Vec<RevisionPoint> = table
        .iter()
        .filter(|r| r.observation_month == month)
        .filter_map(|r| {
            r.vintage_date.map(|vintage_date| RevisionPoint {
                vintage_date,
                value: r.value,
            })
        })
        .collect();
    if path.is_empty() {
        return Err(NoUsableInput::MonthNotFound(month));
    }
    path.sort_by_key(|p| p.vintage_date);
    Ok(path)
}

/// The observation month revised most often, latest month on ties. Used when
/// no month is requested.
pub fn most_revised_month(table: &[MonthlyObservation]) -> Option<NaiveDate> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for r in table.iter().filter(|r| r.vintage_date.is_some()) {
        *counts.entry(r.observation_month).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by_key(|&(month, n)| (n, month))
        .map(|(month, _)| month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn obs(vintage: Option<NaiveDate>, month: NaiveDate, value: f64) -> MonthlyObservation {
        MonthlyObservation {
            series_id: Some("AP2Y".into()),
            dataset_id: None,
            pre_unit: None,
            unit: None,
            vintage_date: vintage,
            observation_month: month,
            value: Some(value),
        }
    }

    #[test]
    fn path_is_sorted_by_vintage() {
        let jun = ymd(2025, 6, 1);
        let table = vec![
            obs(Some(ymd(2025, 9, 16)), jun, 720.0),
            obs(Some(ymd(2025, 7, 15)), jun, 714.0),
            obs(None, jun, 1.0),
            obs(Some(ymd(2025, 8, 12)), jun, 718.0),
            obs(Some(ymd(2025, 8, 12)), ymd(2025, 5, 1), 725.0),
        ];
        let path = revision_path(&table, jun).unwrap();
        let values: Vec<_> = path.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![Some(714.0), Some(718.0), Some(720.0)]);
        assert_eq!(path[0].vintage_date, ymd(2025, 7, 15));
    }

    #[test]
    fn most_revised_prefers_count_then_recency() {
        let (may, jun) = (ymd(2025, 5, 1), ymd(2025, 6, 1));
        let table = vec![
            obs(Some(ymd(2025, 7, 15)), may, 1.0),
            obs(Some(ymd(2025, 8, 12)), may, 1.0),
            obs(Some(ymd(2025, 8, 12)), jun, 1.0),
            obs(None, jun, 1.0),
            obs(None, jun, 1.0),
        ];
        assert_eq!(most_revised_month(&table), Some(may));

        let tied = vec![obs(Some(ymd(2025, 8, 12)), may, 1.0), obs(Some(ymd(2025, 8, 12)), jun, 1.0)];
        assert_eq!(most_revised_month(&tied), Some(jun));
        assert_eq!(most_revised_month(&[]), None);
    }

    #[test]
    fn unknown_month_fails() {
        let table = vec![obs(None, ymd(2024, 1, 1), 1.0)];
        assert_eq!(
            revision_path(&table, ymd(2024, 1, 1)),
            Err(NoUsableInput::MonthNotFound(ymd(2024, 1, 1)))
        );
    }
}
