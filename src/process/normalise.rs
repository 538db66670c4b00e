// src/process/normalise.rs

use tracing::{debug, instrument};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::ParseError;
use crate::process::date_parser::parse_day_first;
use crate::process::period::{classify_period, Period};
use crate::process::utils::parse_value;
use crate::process::RawDocument;
use crate::vintage::MonthlyObservation;

/// Turn a parsed document into monthly long-format rows.
///
/// Annual, quarterly and unrecognised periods are dropped. The release date
/// becomes the vintage of every row; when it is absent the rows keep a null
/// vintage and a `MissingVintage` diagnostic is emitted.
#[instrument(level = "debug", skip(doc, diagnostics), fields(source = %doc.source, rows = doc.rows.len()))]
pub fn normalise_monthly(
    doc: &RawDocument,
    diagnostics: &dyn Diagnostics,
) -> Result<Vec<MonthlyObservation>, ParseError> {
    let meta = &doc.metadata;

    let vintage_date = match meta.release_date.as_deref() {
        Some(raw) => {
            Some(parse_day_first(raw).ok_or_else(|| ParseError::InvalidReleaseDate(raw.to_string()))?)
        }
        None => {
            diagnostics.emit(Diagnostic::MissingVintage {
                source: doc.source.clone(),
            });
            None
        }
    };

    let mut out = Vec::new();
    for row in &doc.rows {
        let observation_month = match classify_period(&row.period) {
            Period::Monthly(month) => month,
            Period::Unrecognised => {
                debug!(period = %row.period, "unrecognised period label; dropped");
                continue;
            }
            Period::Annual(_) | Period::Quarterly { .. } => continue,
        };
        out.push(MonthlyObservation {
            series_id: meta.series_id.clone(),
            dataset_id: meta.dataset_id.clone(),
            pre_unit: meta.pre_unit.clone(),
            unit: meta.unit.clone(),
            vintage_date,
            observation_month,
            value: parse_value(row.value.as_deref()),
        });
    }

    debug!(monthly = out.len(), "normalised");
    Ok(out)
}
