//! Normalization of statement text: US currency amounts and dates.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a currency amount like "-$1,234.56" or "$0.10" into a Decimal.
///
/// The dollar sign and thousands separators are dropped, the sign and the
/// printed scale are kept ("150.00" stays two decimal places).
pub fn parse_currency(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// Parse a slash date "MM/DD/YYYY".
pub fn parse_us_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%m/%d/%Y").ok()
}

/// Month number for an English three-letter abbreviation ("Jan" -> 1).
pub fn month_from_abbrev(s: &str) -> Option<u32> {
    let month = match s {
        "Jan" => 1,
        "Feb" => 2,
        "Mar" => 3,
        "Apr" => 4,
        "May" => 5,
        "Jun" => 6,
        "Jul" => 7,
        "Aug" => 8,
        "Sep" => 9,
        "Oct" => 10,
        "Nov" => 11,
        "Dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Build a date from "Jan", "15", "2023" style parts.
pub fn date_from_parts(month_abbrev: &str, day: &str, year: &str) -> Option<NaiveDate> {
    let month = month_from_abbrev(month_abbrev)?;
    let day: u32 = day.trim().parse().ok()?;
    let year: i32 = year.trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Format a date the way import files expect it: "01/15/2023".
pub fn format_us_date(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_currency_strips_decoration() {
        assert_eq!(parse_currency("$5.23"), Some(Decimal::new(523, 2)));
        assert_eq!(parse_currency("-$1,234.56"), Some(Decimal::new(-123456, 2)));
        assert_eq!(parse_currency("12,000.00"), Some(Decimal::new(1200000, 2)));
        assert_eq!(parse_currency("$"), None);
        assert_eq!(parse_currency("abc"), None);
    }

    #[test]
    fn test_parse_currency_keeps_scale() {
        assert_eq!(parse_currency("$150.00").unwrap().to_string(), "150.00");
    }

    #[test]
    fn test_dates() {
        let d = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap();
        assert_eq!(parse_us_date("01/15/2023"), Some(d));
        assert_eq!(parse_us_date("02/30/2023"), None);
        assert_eq!(date_from_parts("Jan", "15", "2023"), Some(d));
        assert_eq!(date_from_parts("Foo", "15", "2023"), None);
        assert_eq!(format_us_date(d), "01/15/2023");
    }
}
