/// Trim whitespace and strip any surrounding double quotes.
pub fn clean_str(raw: &str) -> String {
    raw.trim().trim_matches('"').trim().to_string()
}

/// `None` for empty strings, so absent and blank metadata look the same downstream.
pub fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Coerce a raw cell to a number. Empty, non-numeric and non-finite cells are missing.
pub fn parse_value(raw: Option<&str>) -> Option<f64> {
    raw.map(clean_str)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_str_strips_quotes_and_space() {
        assert_eq!(clean_str("  \"AP2Y\" "), "AP2Y");
        assert_eq!(clean_str("\"\"Title\""), "Title");
        assert_eq!(clean_str("\"\""), "");
    }

    #[test]
    fn parse_value_treats_garbage_as_missing() {
        assert_eq!(parse_value(Some("718")), Some(718.0));
        assert_eq!(parse_value(Some(" 12.5 ")), Some(12.5));
        assert_eq!(parse_value(Some("[x]")), None);
        assert_eq!(parse_value(Some("")), None);
        assert_eq!(parse_value(Some("NaN")), None);
        assert_eq!(parse_value(None), None);
    }
}
