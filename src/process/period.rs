// src/process/period.rs

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static ANNUAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})$").expect("annual pattern"));
static QUARTERLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})\s+Q([1-4])$").expect("quarterly pattern"));
static MONTHLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})\s+([A-Za-z]+)$").expect("monthly pattern"));

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Granularity of a period label in the data table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Annual(i32),
    Quarterly { year: i32, quarter: u32 },
    /// First day of the month.
    Monthly(NaiveDate),
    Unrecognised,
}

impl Period {
    pub fn month(&self) -> Option<NaiveDate> {
        match self {
            Period::Monthly(d) => Some(*d),
            _ => None,
        }
    }
}

/// Month number for a three-letter abbreviation or full English name.
fn month_number(word: &str) -> Option<u32> {
    let word = word.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|name| word == *name || (word.len() == 3 && name.starts_with(&word)))
        .map(|i| i as u32 + 1)
}

/// Classify a period label. Every label maps to exactly one variant.
pub fn classify_period(label: &str) -> Period {
    let label = label.trim();

    if let Some(caps) = ANNUAL.captures(label) {
        if let Ok(year) = caps[1].parse::<i32>() {
            return Period::Annual(year);
        }
    }
    if let Some(caps) = QUARTERLY.captures(label) {
        if let (Ok(year), Ok(quarter)) = (caps[1].parse::<i32>(), caps[2].parse::<u32>()) {
            return Period::Quarterly { year, quarter };
        }
    }
    if let Some(caps) = MONTHLY.captures(label) {
        let month = month_number(&caps[2]);
        let year = caps[1].parse::<i32>().ok();
        if let Some(d) = year
            .zip(month)
            .and_then(|(y, m)| NaiveDate::from_ymd_opt(y, m, 1))
        {
            return Period::Monthly(d);
        }
    }
    Period::Unrecognised
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(y: i32, m: u32) -> Period {
        Period::Monthly(NaiveDate::from_ymd_opt(y, m, 1).unwrap())
    }

    #[test]
    fn classifies_each_granularity() {
        assert_eq!(classify_period("2024"), Period::Annual(2024));
        assert_eq!(
            classify_period("2024 Q4"),
            Period::Quarterly {
                year: 2024,
                quarter: 4
            }
        );
        assert_eq!(classify_period("2025 JUN"), first(2025, 6));
        assert_eq!(classify_period("2025 jun"), first(2025, 6));
        assert_eq!(classify_period("2025  September"), first(2025, 9));
        assert_eq!(classify_period(" 2001 DEC "), first(2001, 12));
    }

    #[test]
    fn garbage_is_unrecognised() {
        for label in ["", "Q1 2024", "2024 Q5", "2024 JU", "2024 Sept", "24 JAN", "2024-01", "abcd"] {
            assert_eq!(classify_period(label), Period::Unrecognised, "{label:?}");
        }
    }

    #[test]
    fn only_monthly_has_a_month() {
        assert!(classify_period("2024").month().is_none());
        assert!(classify_period("2024 Q1").month().is_none());
        assert!(classify_period("nonsense").month().is_none());
        assert!(classify_period("2024 JAN").month().is_some());
    }
}
