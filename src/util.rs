// Utility helpers for coercion, dates and number formatting.
//
// Every loosely-typed value coming out of the document store goes through
// this module exactly once, so the rest of the engine can assume clean,
// typed values.
use chrono::{Datelike, Duration, NaiveDate};
use num_format::{Locale, ToFormattedString};
use serde_json::Value;

/// Coerce a loosely-typed field into a non-negative, finite number.
///
/// - Numbers pass through.
/// - Strings are trimmed, stripped of thousands separators and parsed;
///   anything containing letters is rejected.
/// - Booleans become `1` / `0`.
/// - Missing, null, unparseable, non-finite and negative values become `0`.
pub fn to_non_negative_number(v: Option<&Value>) -> f64 {
    let n = match v {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_f64_safe(Some(s.as_str())),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    match n {
        Some(n) if n.is_finite() && n > 0.0 => n,
        _ => 0.0,
    }
}

/// Coerce a loosely-typed field into a boolean flag. Missing means `false`.
pub fn to_flag(v: Option<&Value>) -> bool {
    match v {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "y" | "1"
        ),
        _ => false,
    }
}

/// Coerce a loosely-typed field into trimmed text. Numbers are rendered so
/// numeric ids survive a CSV round trip.
pub fn to_text(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in exports (commas, spaces, text).
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok()
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    // Store dates are `YYYY-MM-DD`; a trailing time component is tolerated.
    let s = s?.trim();
    let day = s.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// First day of the week containing `date`. Weeks start on Sunday for every
/// caller; the dashboard series and the export rollups must agree.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn quarter_of(date: NaiveDate) -> u32 {
    date.month0() / 3 + 1
}

pub fn quarter_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), (quarter_of(date) - 1) * 3 + 1, 1).unwrap_or(date)
}

pub fn year_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

pub fn round_to(n: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (n * factor).round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        0.0
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators (`1,234.5`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn coerces_loose_numbers() {
        assert_eq!(to_non_negative_number(Some(&json!(42))), 42.0);
        assert_eq!(to_non_negative_number(Some(&json!("1,250"))), 1250.0);
        assert_eq!(to_non_negative_number(Some(&json!(" 7 "))), 7.0);
        assert_eq!(to_non_negative_number(Some(&json!("abc"))), 0.0);
        assert_eq!(to_non_negative_number(Some(&json!(-5))), 0.0);
        assert_eq!(to_non_negative_number(Some(&json!(null))), 0.0);
        assert_eq!(to_non_negative_number(Some(&json!(true))), 1.0);
        assert_eq!(to_non_negative_number(None), 0.0);
    }

    #[test]
    fn coerces_flags() {
        assert!(to_flag(Some(&json!(true))));
        assert!(to_flag(Some(&json!("TRUE"))));
        assert!(to_flag(Some(&json!(1))));
        assert!(!to_flag(Some(&json!("no"))));
        assert!(!to_flag(Some(&json!(0))));
        assert!(!to_flag(None));
    }

    #[test]
    fn parses_dates_with_time_suffix() {
        assert_eq!(parse_date_safe(Some("2024-03-01")), Some(date("2024-03-01")));
        assert_eq!(
            parse_date_safe(Some("2024-03-01T10:15:00.000Z")),
            Some(date("2024-03-01"))
        );
        assert_eq!(parse_date_safe(Some("03/01/2024")), None);
        assert_eq!(parse_date_safe(Some("")), None);
    }

    #[test]
    fn weeks_start_on_sunday() {
        // 2024-03-01 is a Friday.
        assert_eq!(week_start(date("2024-03-01")), date("2024-02-25"));
        assert_eq!(week_start(date("2024-02-25")), date("2024-02-25"));
        assert_eq!(week_start(date("2024-03-02")), date("2024-02-25"));
        assert_eq!(week_start(date("2024-03-03")), date("2024-03-03"));
    }

    #[test]
    fn quarters() {
        assert_eq!(quarter_of(date("2024-01-31")), 1);
        assert_eq!(quarter_of(date("2024-03-31")), 1);
        assert_eq!(quarter_of(date("2024-04-01")), 2);
        assert_eq!(quarter_of(date("2024-12-01")), 4);
        assert_eq!(quarter_start(date("2024-08-17")), date("2024-07-01"));
    }

    #[test]
    fn formats_numbers() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(0.0, 1), "0.0");
        assert_eq!(format_number(-12.5, 1), "-12.5");
        assert_eq!(format_int(9855), "9,855");
        assert_eq!(round_to(52.941176, 2), 52.94);
        assert_eq!(round_to(85.0, 1), 85.0);
    }
}
