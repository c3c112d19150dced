use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::LexicalError;

static RE_ISO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap());
static RE_DASHED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})-(\d{1,2})-(\d{2,4})$").unwrap());
static RE_SLASHED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{2,4})$").unwrap());
static RE_TEXTUAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{1,2}),?\s+(\d{4})$").unwrap()
});

/// Expand a possibly two-digit year using pivot year 2000 (§4.1):
/// 00-49 -> 2000-2049, 50-99 -> 1950-1999.
fn expand_year(raw: i32) -> i32 {
    if raw >= 100 {
        return raw;
    }
    if raw < 50 {
        2000 + raw
    } else {
        1900 + raw
    }
}

fn month_from_name(name: &str) -> Option<u32> {
    let months = [
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december",
    ];
    months
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name))
        .map(|i| i as u32 + 1)
}

/// Parse a date in any of the accepted numeric/textual formats (§4.1).
///
/// Returns `Ok(None)` when `s` does not match any recognized shape at all.
/// Returns `Err(LexicalError::InvalidDate)` when it matches a shape but the
/// resulting calendar date is impossible (e.g. month 13, day 32).
pub fn parse_flexible_date(s: &str) -> Result<Option<NaiveDate>, LexicalError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if let Some(caps) = RE_ISO.captures(trimmed) {
        let year: i32 = caps[1].parse().unwrap();
        let month: u32 = caps[2].parse().unwrap();
        let day: u32 = caps[3].parse().unwrap();
        return build_date(year, month, day, trimmed);
    }

    if let Some(caps) = RE_SLASHED.captures(trimmed) {
        // US convention for the slashed form: MM/DD/YYYY.
        let month: u32 = caps[1].parse().unwrap();
        let day: u32 = caps[2].parse().unwrap();
        let year = expand_year(caps[3].parse().unwrap());
        return build_date(year, month, day, trimmed);
    }

    if let Some(caps) = RE_DASHED.captures(trimmed) {
        // Dashed form with a leading short group: DD-MM-YYYY.
        let day: u32 = caps[1].parse().unwrap();
        let month: u32 = caps[2].parse().unwrap();
        let year = expand_year(caps[3].parse().unwrap());
        return build_date(year, month, day, trimmed);
    }

    if let Some(caps) = RE_TEXTUAL.captures(trimmed) {
        let month = month_from_name(&caps[1]).unwrap();
        let day: u32 = caps[2].parse().unwrap();
        let year: i32 = caps[3].parse().unwrap();
        return build_date(year, month, day, trimmed);
    }

    Ok(None)
}

fn build_date(
    year: i32,
    month: u32,
    day: u32,
    original: &str,
) -> Result<Option<NaiveDate>, LexicalError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .map(Some)
        .ok_or_else(|| LexicalError::InvalidDate(original.to_string()))
}

/// Reduce any accepted representation to `YYYY-MM-DD` (§4.1).
pub fn normalize_date(s: &str) -> Result<Option<String>, LexicalError> {
    Ok(parse_flexible_date(s)?.map(|d| d.format("%Y-%m-%d").to_string()))
}

/// Three-way comparison, returning -1/0/1 (§4.1).
pub fn compare_dates(a: NaiveDate, b: NaiveDate) -> i32 {
    match a.cmp(&b) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }
}

/// Signed day count from `a` to `b` (§4.1).
pub fn calculate_days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso() {
        assert_eq!(
            parse_flexible_date("2025-10-10").unwrap(),
            Some(NaiveDate::from_ymd_opt(2025, 10, 10).unwrap())
        );
    }

    #[test]
    fn parses_us_slash() {
        assert_eq!(
            parse_flexible_date("10/11/2025").unwrap(),
            Some(NaiveDate::from_ymd_opt(2025, 10, 11).unwrap())
        );
    }

    #[test]
    fn parses_european_dash() {
        assert_eq!(
            parse_flexible_date("11-10-2025").unwrap(),
            Some(NaiveDate::from_ymd_opt(2025, 10, 11).unwrap())
        );
    }

    #[test]
    fn parses_textual() {
        assert_eq!(
            parse_flexible_date("October 10, 2025").unwrap(),
            Some(NaiveDate::from_ymd_opt(2025, 10, 10).unwrap())
        );
    }

    #[test]
    fn parses_textual_no_comma() {
        assert_eq!(
            parse_flexible_date("October 10 2025").unwrap(),
            Some(NaiveDate::from_ymd_opt(2025, 10, 10).unwrap())
        );
    }

    #[test]
    fn two_digit_year_pivot() {
        assert_eq!(
            parse_flexible_date("10/11/25").unwrap(),
            Some(NaiveDate::from_ymd_opt(2025, 10, 11).unwrap())
        );
        assert_eq!(
            parse_flexible_date("10/11/75").unwrap(),
            Some(NaiveDate::from_ymd_opt(1975, 10, 11).unwrap())
        );
    }

    #[test]
    fn impossible_month_is_error() {
        let err = parse_flexible_date("13/01/2025").unwrap_err();
        assert!(matches!(err, LexicalError::InvalidDate(_)));
    }

    #[test]
    fn impossible_day_is_error() {
        let err = parse_flexible_date("2025-02-30").unwrap_err();
        assert!(matches!(err, LexicalError::InvalidDate(_)));
    }

    #[test]
    fn unrecognized_format_is_none_not_error() {
        assert_eq!(parse_flexible_date("not a date").unwrap(), None);
        assert_eq!(parse_flexible_date("").unwrap(), None);
    }

    #[test]
    fn normalize_round_trips_to_iso() {
        assert_eq!(
            normalize_date("October 10, 2025").unwrap(),
            Some("2025-10-10".to_string())
        );
    }

    #[test]
    fn compare_dates_orders() {
        let a = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        assert_eq!(compare_dates(a, b), -1);
        assert_eq!(compare_dates(b, a), 1);
        assert_eq!(compare_dates(a, a), 0);
    }

    #[test]
    fn days_between_is_signed() {
        let a = NaiveDate::from_ymd_opt(2025, 10, 11).unwrap();
        let b = NaiveDate::from_ymd_opt(2025, 10, 16).unwrap();
        assert_eq!(calculate_days_between(a, b), 5);
        assert_eq!(calculate_days_between(b, a), -5);
    }
}
