// src/process/mod.rs

pub mod date_parser;
pub mod grammar;
pub mod metadata;
pub mod normalise;
pub mod period;
pub mod utils;

use std::{fs, path::Path};

use tracing::{debug, instrument};

use crate::error::ParseError;

pub use grammar::{parse_metadata, parse_table, split_metadata_and_table};
pub use metadata::Metadata;
pub use normalise::normalise_monthly;
pub use date_parser::{parse_day_first, parse_month};
pub use period::{classify_period, Period};

/// One line of the data table, before any typing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub period: String,
    /// `None` when the row had no value cell at all.
    pub value: Option<String>,
}

/// A source file split into its metadata and data table.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Where the text came from, for diagnostics.
    pub source: String,
    pub metadata: Metadata,
    pub rows: Vec<RawRow>,
}

/// Parse document text already in memory.
pub fn parse_document(source: &str, text: &str) -> Result<RawDocument, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let (meta_lines, table_lines) = split_metadata_and_table(text)?;
    let pairs = parse_metadata(&meta_lines)?;
    let rows = parse_table(&table_lines);
    debug!(source, metadata = pairs.len(), rows = rows.len(), "parsed document");

    Ok(RawDocument {
        source: source.to_string(),
        metadata: Metadata::from_pairs(&pairs),
        rows,
    })
}

/// Read and parse one raw CSV from disk.
#[instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<RawDocument, ParseError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&path.display().to_string(), &text)
}
