//! Non-fatal events raised while processing a batch.
//!
//! Components take a `&dyn Diagnostics` instead of logging straight to the
//! global subscriber, so tests can assert on what was reported.

use std::sync::Mutex;

use chrono::NaiveDate;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Release date absent from a document's metadata; rows kept with a null vintage.
    MissingVintage { source: String },
    /// A raw file was skipped by the aggregator.
    FileSkipped { path: String, reason: String },
    /// A download failed and was skipped.
    DownloadFailed { url: String, reason: String },
    /// A forecast method failed and was left out of the forecast set.
    MethodFailed { method: String, reason: String },
    /// The latest series has no value for `missing`; later values are re-indexed.
    SeriesGap { missing: NaiveDate },
}

pub trait Diagnostics {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Forwards every diagnostic to `tracing` at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn emit(&self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::MissingVintage { source } => {
                warn!(source = %source, "vintage date not found in metadata; setting to null")
            }
            Diagnostic::FileSkipped { path, reason } => {
                warn!(path = %path, reason = %reason, "failed to parse raw file; skipping")
            }
            Diagnostic::DownloadFailed { url, reason } => {
                warn!(url = %url, reason = %reason, "failed to download; skipping")
            }
            Diagnostic::MethodFailed { method, reason } => {
                warn!(method = %method, reason = %reason, "forecast method failed")
            }
            Diagnostic::SeriesGap { missing } => {
                warn!(missing = %missing, "latest series has a gap; later months re-indexed")
            }
        }
    }
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    events: Mutex<Vec<Diagnostic>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Diagnostic> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn emit(&self, diagnostic: Diagnostic) {
        if let Ok(mut events) = self.events.lock() {
            events.push(diagnostic);
        }
    }
}
