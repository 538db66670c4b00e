// src/error.rs

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// The source document does not follow the `"key","value"` + data table layout.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("could not find the start of the data table (no line begins with a quoted year)")]
    NoDataStart,
    #[error("metadata line {line_no} does not split into exactly two fields: {line:?}")]
    MalformedMetadata { line_no: usize, line: String },
}

/// Everything that can make a single raw file unusable.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error("release date {0:?} is not a day-first date")]
    InvalidReleaseDate(String),
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastError {
    #[error("{method} needs at least {required} observations, got {actual}")]
    InsufficientData {
        method: String,
        required: usize,
        actual: usize,
    },
    #[error("{method} failed to fit: {reason}")]
    ModelFit { method: String, reason: String },
}

/// Whole-run preconditions. Any of these ends the run with a nonzero exit.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NoUsableInput {
    #[error("no CSVs in {0}; run ingestion first")]
    NoRawFiles(PathBuf),
    #[error("none of the {count} CSVs in {dir} could be parsed")]
    NoParsableFiles { dir: PathBuf, count: usize },
    #[error("no CSV links found on {0}; check the page structure")]
    NoLinks(String),
    #[error("no files downloaded")]
    NoDownloads,
    #[error("long table has no dated, valued observations")]
    EmptyTable,
    #[error("no data for observation month {}", .0.format("%Y-%m"))]
    MonthNotFound(NaiveDate),
}

impl NoUsableInput {
    /// Process exit code reported by the binaries.
    pub fn exit_code(&self) -> u8 {
        match self {
            NoUsableInput::NoLinks(_) => 2,
            NoUsableInput::NoDownloads => 3,
            _ => 1,
        }
    }
}
