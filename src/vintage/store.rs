// src/vintage/store.rs

use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Date32Array, Float64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use chrono::{Datelike, NaiveDate};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs::{self, File},
    path::Path,
    sync::Arc,
};
use tracing::info;

use crate::report::BatchReport;
use crate::vintage::{LongTable, MonthlyObservation};

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    Ok(())
}

/// Write serialisable rows as a headed CSV, replacing any existing file.
///
/// Goes through a temporary sibling and a rename so readers never see a half-written table.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    ensure_parent(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "table.csv".to_string());
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    {
        let mut wtr = csv::Writer::from_path(&tmp_path)
            .with_context(|| format!("creating {:?}", tmp_path))?;
        for row in rows {
            wtr.serialize(row)
                .with_context(|| format!("writing row to {:?}", tmp_path))?;
        }
        wtr.flush().with_context(|| format!("flushing {:?}", tmp_path))?;
    }

    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))?;
    Ok(())
}

pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut rdr =
        csv::Reader::from_path(path).with_context(|| format!("opening {}", path.display()))?;
    rdr.deserialize()
        .enumerate()
        .map(|(idx, rec)| {
            rec.with_context(|| format!("CSV parse error in {} at record {}", path.display(), idx))
        })
        .collect()
}

/// Persist the long table. The whole file is rewritten every time.
pub fn write_long(path: &Path, table: &[MonthlyObservation]) -> Result<()> {
    write_csv(path, table)?;
    info!(path = %path.display(), rows = table.len(), "wrote long table");
    Ok(())
}

pub fn read_long(path: &Path) -> Result<LongTable> {
    read_csv(path)
}

fn date32(d: NaiveDate) -> i32 {
    d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn long_schema() -> Schema {
    Schema::new(vec![
        Field::new("series_id", DataType::Utf8, true),
        Field::new("dataset_id", DataType::Utf8, true),
        Field::new("pre_unit", DataType::Utf8, true),
        Field::new("unit", DataType::Utf8, true),
        Field::new("vintage_date", DataType::Date32, true),
        Field::new("observation_month", DataType::Date32, false),
        Field::new("value", DataType::Float64, true),
    ])
}

fn long_to_batch(table: &[MonthlyObservation]) -> Result<RecordBatch> {
    let strings = |f: fn(&MonthlyObservation) -> Option<&str>| -> ArrayRef {
        Arc::new(StringArray::from(table.iter().map(f).collect::<Vec<_>>()))
    };
    let columns: Vec<ArrayRef> = vec![
        strings(|r| r.series_id.as_deref()),
        strings(|r| r.dataset_id.as_deref()),
        strings(|r| r.pre_unit.as_deref()),
        strings(|r| r.unit.as_deref()),
        Arc::new(Date32Array::from(
            table.iter().map(|r| r.vintage_date.map(date32)).collect::<Vec<_>>(),
        )),
        Arc::new(Date32Array::from(
            table.iter().map(|r| date32(r.observation_month)).collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            table.iter().map(|r| r.value).collect::<Vec<_>>(),
        )),
    ];
    RecordBatch::try_new(Arc::new(long_schema()), columns).context("building long-table batch")
}

/// Parquet copy of the long table for columnar tools.
pub fn write_long_parquet(path: &Path, table: &[MonthlyObservation]) -> Result<()> {
    ensure_parent(path)?;
    let batch = long_to_batch(table)?;
    let file = File::create(path).with_context(|| format!("creating {:?}", path))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .context("creating Arrow writer for long table")?;
    writer.write(&batch).context("writing long-table batch")?;
    writer.close().context("closing long-table writer")?;
    info!(path = %path.display(), rows = table.len(), "wrote parquet export");
    Ok(())
}

pub fn write_report(path: &Path, report: &BatchReport) -> Result<()> {
    ensure_parent(path)?;
    let f = File::create(path).with_context(|| format!("creating {:?}", path))?;
    serde_json::to_writer_pretty(f, report).context("serializing build report")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parquet::file::reader::{FileReader, SerializedFileReader};
    use tempfile::tempdir;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> LongTable {
        vec![
            MonthlyObservation {
                series_id: Some("AP2Y".into()),
                dataset_id: Some("LMS".into()),
                pre_unit: None,
                unit: None,
                vintage_date: None,
                observation_month: ymd(2025, 5, 1),
                value: None,
            },
            MonthlyObservation {
                series_id: Some("AP2Y".into()),
                dataset_id: Some("LMS".into()),
                pre_unit: None,
                unit: Some("thousands".into()),
                vintage_date: Some(ymd(2025, 8, 12)),
                observation_month: ymd(2025, 6, 1),
                value: Some(718.0),
            },
        ]
    }

    #[test]
    fn long_table_csv_layout() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("processed/vacancies_long.csv");
        write_long(&path, &sample())?;

        let text = fs::read_to_string(&path)?;
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("series_id,dataset_id,pre_unit,unit,vintage_date,observation_month,value")
        );
        assert_eq!(lines.next(), Some("AP2Y,LMS,,,,2025-05-01,"));
        assert_eq!(lines.next(), Some("AP2Y,LMS,,thousands,2025-08-12,2025-06-01,718.0"));

        assert_eq!(read_long(&path)?, sample());
        Ok(())
    }

    #[test]
    fn rewrite_is_byte_identical() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("long.csv");
        write_long(&path, &sample())?;
        let first = fs::read(&path)?;
        write_long(&path, &read_long(&path)?)?;
        assert_eq!(first, fs::read(&path)?);
        Ok(())
    }

    #[test]
    fn parquet_export_has_every_row() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("long.parquet");
        write_long_parquet(&path, &sample())?;

        let reader = SerializedFileReader::new(File::open(&path)?)?;
        assert_eq!(reader.metadata().file_metadata().num_rows(), 2);
        Ok(())
    }

    #[test]
    fn epoch_is_day_zero() {
        assert_eq!(date32(ymd(1970, 1, 1)), 0);
        assert_eq!(date32(ymd(1970, 1, 2)), 1);
    }
}
