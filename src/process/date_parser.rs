use chrono::{Datelike, NaiveDate};

/// Day-first layouts seen in release-date cells, plus ISO as a fallback.
const DAY_FIRST_FORMATS: &[&str] = &[
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%Y-%m-%d",
];

/// Parse a release date such as `12-08-2025` or `16 September 2025`.
pub fn parse_day_first(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DAY_FIRST_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse an observation month given as `YYYY-MM` or `YYYY-MM-DD`, snapped to the first of the month.
pub fn parse_month(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
        .and_then(first_of_month)
}

pub fn first_of_month(d: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(d.year(), d.month(), 1)
}
