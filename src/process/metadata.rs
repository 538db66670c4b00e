use crate::process::utils::non_empty;

/// Header block of a source document, looked up by the publisher's key names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: Option<String>,
    /// `CDID`, e.g. `AP2Y`.
    pub series_id: Option<String>,
    /// `Source dataset ID`, e.g. `LMS`.
    pub dataset_id: Option<String>,
    pub pre_unit: Option<String>,
    pub unit: Option<String>,
    /// `Release date`, day-first. This is the vintage.
    pub release_date: Option<String>,
    pub next_release: Option<String>,
    pub important_notes: Option<String>,
    /// Keys not listed above, in document order.
    pub extra: Vec<(String, String)>,
}

impl Metadata {
    /// Build from ordered pairs; a repeated key keeps its last value.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut meta = Metadata::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "Title" => &mut meta.title,
                "CDID" => &mut meta.series_id,
                "Source dataset ID" => &mut meta.dataset_id,
                "PreUnit" => &mut meta.pre_unit,
                "Unit" => &mut meta.unit,
                "Release date" => &mut meta.release_date,
                "Next release" => &mut meta.next_release,
                "Important notes" => &mut meta.important_notes,
                _ => {
                    meta.extra.retain(|(k, _)| k != key);
                    meta.extra.push((key.clone(), value.clone()));
                    continue;
                }
            };
            *slot = non_empty(value);
        }
        meta
    }
}
