// src/process/grammar.rs

use csv::{ReaderBuilder, Trim};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{trace, warn};

use crate::error::GrammarError;
use crate::process::utils::clean_str;
use crate::process::RawRow;

/// First line of the data table: a quoted year, optionally followed by `Qn` or a month.
static DATA_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*"\d{4}["\s]"#).expect("data-start pattern should compile"));

/// Split a document into its non-blank metadata lines and the data table lines.
pub fn split_metadata_and_table(text: &str) -> Result<(Vec<&str>, Vec<&str>), GrammarError> {
    let lines: Vec<&str> = text.lines().collect();
    let table_start = lines
        .iter()
        .position(|line| DATA_START.is_match(line))
        .ok_or(GrammarError::NoDataStart)?;
    trace!(table_start, "found data table");

    let meta = lines[..table_start]
        .iter()
        .copied()
        .filter(|line| !line.trim().is_empty())
        .collect();
    Ok((meta, lines[table_start..].to_vec()))
}

/// Parse `"key","value"` lines into ordered pairs.
///
/// `line_no` in the error is the 1-based position within the metadata block.
pub fn parse_metadata(meta_lines: &[&str]) -> Result<Vec<(String, String)>, GrammarError> {
    meta_lines
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let fields: Vec<&str> = raw.trim().split(',').collect();
            match fields.as_slice() {
                [key, value] => Ok((clean_str(key), clean_str(value))),
                _ => Err(GrammarError::MalformedMetadata {
                    line_no: i + 1,
                    line: raw.to_string(),
                }),
            }
        })
        .collect()
}

/// Tokenise the data table into (period, value) rows. There is no header row.
/// A row without a value cell keeps an empty value instead of failing the parse.
pub fn parse_table(table_lines: &[&str]) -> Vec<RawRow> {
    let body = table_lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n");

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(body.as_bytes());

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        match result {
            Ok(record) => rows.push(RawRow {
                period: record.get(0).unwrap_or_default().to_string(),
                value: record.get(1).map(str::to_string),
            }),
            Err(e) => warn!(record = idx, error = %e, "unreadable data row"),
        }
    }
    rows
}
