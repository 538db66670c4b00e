// src/vintage/aggregate.rs

use anyhow::{Context, Result};
use glob::glob;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

use crate::config::MANIFEST_FILE;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{NoUsableInput, ParseError};
use crate::process::{load_document, normalise_monthly};
use crate::report::BatchReport;
use crate::vintage::{LongTable, MonthlyObservation};

/// The rebuilt long table plus which raw files went into it.
#[derive(Debug)]
pub struct BuildOutput {
    pub table: LongTable,
    pub report: BatchReport,
}

/// Raw CSVs under `raw_dir`, sorted by path, without the manifest.
pub fn list_raw_csvs(raw_dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/*.csv", raw_dir.display());
    let mut paths: Vec<PathBuf> = glob(&pattern)
        .with_context(|| format!("Failed to read glob pattern '{}'", pattern))?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.file_name().and_then(|n| n.to_str()) != Some(MANIFEST_FILE))
        .collect();
    paths.sort();
    Ok(paths)
}

fn parse_one(path: &Path, diagnostics: &dyn Diagnostics) -> Result<Vec<MonthlyObservation>, ParseError> {
    let doc = load_document(path)?;
    normalise_monthly(&doc, diagnostics)
}

/// Parse every raw file and merge them into one deduplicated long table.
///
/// A file that fails to parse is recorded in the report and skipped. The
/// build fails only when there are no files or none of them parse.
#[instrument(level = "info", skip(raw_dir, diagnostics), fields(raw_dir = %raw_dir.as_ref().display()))]
pub fn build_long<P: AsRef<Path>>(raw_dir: P, diagnostics: &dyn Diagnostics) -> Result<BuildOutput> {
    let raw_dir = raw_dir.as_ref();
    let csvs = list_raw_csvs(raw_dir)?;
    if csvs.is_empty() {
        return Err(NoUsableInput::NoRawFiles(raw_dir.to_path_buf()).into());
    }
    info!(files = csvs.len(), "building long table");

    let mut report = BatchReport::new();
    let mut rows = Vec::new();
    for path in &csvs {
        let name = path.display().to_string();
        match parse_one(path, diagnostics) {
            Ok(parsed) => {
                debug!(path = %name, rows = parsed.len(), "parsed");
                rows.extend(parsed);
                report.record_success(name);
            }
            Err(e) => {
                diagnostics.emit(Diagnostic::FileSkipped {
                    path: name.clone(),
                    reason: e.to_string(),
                });
                report.record_failure(name, e);
            }
        }
    }

    if report.is_all_failed() {
        return Err(NoUsableInput::NoParsableFiles {
            dir: raw_dir.to_path_buf(),
            count: csvs.len(),
        }
        .into());
    }

    let before = rows.len();
    let table = dedup_vintages(rows);
    info!(rows = table.len(), dropped = before - table.len(), "deduplicated");
    Ok(BuildOutput { table, report })
}

/// Stable-sort by (vintage_date, observation_month), null vintages first, then
/// keep only the last row for each (series_id, vintage_date, observation_month).
pub fn dedup_vintages(mut rows: Vec<MonthlyObservation>) -> LongTable {
    rows.sort_by(|a, b| {
        (a.vintage_date, a.observation_month).cmp(&(b.vintage_date, b.observation_month))
    });

    let keep: Vec<bool> = {
        let mut last = HashMap::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            last.insert(row.key(), i);
        }
        rows.iter()
            .enumerate()
            .map(|(i, row)| last.get(&row.key()) == Some(&i))
            .collect()
    };

    rows.into_iter()
        .zip(keep)
        .filter_map(|(row, keep)| keep.then_some(row))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingDiagnostics;
    use crate::logging::init_test_logging;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::tempdir;

    const SEP_RELEASE: &str = r#""Title","UK Vacancies (thousands) - Total"
"CDID","AP2Y"
"Source dataset ID","LMS"
"PreUnit",""
"Unit",""
"Release date","16-09-2025"
"Next release","14 October 2025"
"Important notes",
"2022","1243"
"2023","1022"
"2024","863"
"2024 Q4","806"
"2025 Q1","783"
"2025 Q2","726"
"2025 MAY","726"
"2025 JUN","720"
"2025 JUL","728"
"#;

    const AUG_RELEASE: &str = r#""Title","UK Vacancies (thousands) - Total"
"CDID","AP2Y"
"Source dataset ID","LMS"
"PreUnit",""
"Unit",""
"Release date","12-08-2025"
"Next release","16 September 2025"
"Important notes",
"2022","1243"
"2023","1022"
"2024","862"
"2024 Q4","806"
"2025 Q1","783"
"2025 Q2","725"
"2025 APR","738"
"2025 MAY","725"
"2025 JUN","718"
"#;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn obs(series: &str, vintage: Option<NaiveDate>, month: NaiveDate, value: f64) -> MonthlyObservation {
        MonthlyObservation {
            series_id: Some(series.to_string()),
            dataset_id: None,
            pre_unit: None,
            unit: None,
            vintage_date: vintage,
            observation_month: month,
            value: Some(value),
        }
    }

    #[test]
    fn two_releases_make_six_rows() -> Result<()> {
        init_test_logging();
        let dir = tempdir()?;
        fs::write(dir.path().join("a.csv"), SEP_RELEASE)?;
        fs::write(dir.path().join("b.csv"), AUG_RELEASE)?;
        fs::write(dir.path().join("manifest.csv"), "url,path,downloaded_at\n")?;

        let out = build_long(dir.path(), &RecordingDiagnostics::new())?;
        assert_eq!(out.table.len(), 6);
        assert_eq!(out.report.succeeded.len(), 2);
        assert!(out.report.failed.is_empty());

        // sorted by vintage, then month
        let first = &out.table[0];
        assert_eq!(first.vintage_date, Some(ymd(2025, 8, 12)));
        assert_eq!(first.observation_month, ymd(2025, 4, 1));
        let last = &out.table[5];
        assert_eq!(last.vintage_date, Some(ymd(2025, 9, 16)));
        assert_eq!(last.observation_month, ymd(2025, 7, 1));
        assert_eq!(last.value, Some(728.0));
        Ok(())
    }

    #[test]
    fn bad_file_is_skipped_not_fatal() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("good.csv"), AUG_RELEASE)?;
        fs::write(dir.path().join("bad.csv"), "\"CDID\",\"AP2Y\"\nno table here\n")?;

        let diags = RecordingDiagnostics::new();
        let out = build_long(dir.path(), &diags)?;
        assert_eq!(out.table.len(), 3);
        assert_eq!(out.report.failed.len(), 1);
        assert!(out.report.failed[0].item.ends_with("bad.csv"));
        assert!(matches!(
            diags.events().as_slice(),
            [Diagnostic::FileSkipped { .. }]
        ));
        Ok(())
    }

    #[test]
    fn no_parsable_files_is_fatal() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("bad.csv"), "nothing useful")?;
        let err = build_long(dir.path(), &RecordingDiagnostics::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<NoUsableInput>(),
            Some(NoUsableInput::NoParsableFiles { count: 1, .. })
        ));
        Ok(())
    }

    #[test]
    fn empty_dir_is_fatal() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("manifest.csv"), "url,path,downloaded_at\n")?;
        let err = build_long(dir.path(), &RecordingDiagnostics::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<NoUsableInput>(),
            Some(NoUsableInput::NoRawFiles(_))
        ));
        Ok(())
    }

    #[test]
    fn later_duplicate_wins() {
        let v = Some(ymd(2025, 8, 12));
        let m = ymd(2025, 6, 1);
        let rows = vec![
            obs("AP2Y", v, m, 1.0),
            obs("AP2Y", v, ymd(2025, 5, 1), 5.0),
            obs("AP2Y", v, m, 2.0),
        ];
        let out = dedup_vintages(rows);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].observation_month, ymd(2025, 5, 1));
        assert_eq!(out[1].value, Some(2.0));
    }

    #[test]
    fn null_vintages_sort_first_and_collide() {
        let m = ymd(2025, 6, 1);
        let rows = vec![
            obs("AP2Y", Some(ymd(2025, 8, 12)), m, 10.0),
            obs("AP2Y", None, m, 1.0),
            obs("AP2Y", None, m, 2.0),
        ];
        let out = dedup_vintages(rows);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].vintage_date, None);
        assert_eq!(out[0].value, Some(2.0));
        assert_eq!(out[1].value, Some(10.0));
    }

    #[test]
    fn different_series_do_not_collide() {
        let v = Some(ymd(2025, 8, 12));
        let m = ymd(2025, 6, 1);
        let out = dedup_vintages(vec![obs("AP2Y", v, m, 1.0), obs("X", v, m, 2.0)]);
        assert_eq!(out.len(), 2);
    }
}
