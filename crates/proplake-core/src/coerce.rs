//! Lenient scalar coercion.
//!
//! The raw tier carries loosely-typed, string-like values accumulated from
//! heterogeneous source payloads. These parsers accept the encodings seen in
//! practice and return `None` on anything unusable; a coercion miss becomes a
//! null cell, never a failed run.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Date-time formats accepted by [`parse_datetime`], tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a timestamp from any of the mixed representations the source and
/// raw tier produce: RFC 3339, ISO date-time with or without fractional
/// seconds, space-separated date-time, or a bare date (midnight).
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a timestamp into microseconds since the Unix epoch.
pub fn parse_timestamp_micros(s: &str) -> Option<i64> {
    parse_datetime(s).map(|dt| dt.and_utc().timestamp_micros())
}

/// Lenient float parse.
pub fn parse_f64(s: &str) -> Option<f64> {
    let v: f64 = s.trim().parse().ok()?;
    v.is_finite().then_some(v)
}

/// Lenient integer parse. Accepts decimal integers and float renderings of
/// integers ("3", "3.0").
pub fn parse_i64(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let v: f64 = s.parse().ok()?;
    v.is_finite().then(|| v.trunc() as i64)
}

/// Interpret common truthy/falsy encodings.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Days since the Unix epoch for a calendar date (Arrow Date32 encoding).
pub fn date_to_days(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    date.signed_duration_since(epoch).num_days() as i32
}

/// Calendar date for an Arrow Date32 day count.
pub fn days_to_date(days: i32) -> Option<NaiveDate> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    epoch.checked_add_signed(chrono::Duration::days(days as i64))
}

/// `NaiveDateTime` for a microsecond epoch timestamp.
pub fn micros_to_datetime(micros: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_micros(micros).map(|dt| dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_datetime_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(10, 30, 45)
            .unwrap();

        assert_eq!(parse_datetime("2024-03-15T10:30:45"), Some(expected));
        assert_eq!(parse_datetime("2024-03-15 10:30:45"), Some(expected));
        assert_eq!(parse_datetime("2024-03-15T10:30:45Z"), Some(expected));
        assert_eq!(
            parse_datetime("2024-03-15T10:30:45.123456")
                .unwrap()
                .second(),
            45
        );
    }

    #[test]
    fn test_parse_datetime_bare_date_is_midnight() {
        let dt = parse_datetime("2024-03-15").unwrap();
        assert_eq!(dt.hour(), 0);
        assert_eq!(dt.minute(), 0);
    }

    #[test]
    fn test_parse_datetime_garbage() {
        assert_eq!(parse_datetime("not a date"), None);
        assert_eq!(parse_datetime(""), None);
        assert_eq!(parse_datetime("2024-13-45"), None);
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_f64("1250000.5"), Some(1250000.5));
        assert_eq!(parse_f64(" 3 "), Some(3.0));
        assert_eq!(parse_f64("NaN"), None);
        assert_eq!(parse_f64("n/a"), None);

        assert_eq!(parse_i64("3"), Some(3));
        assert_eq!(parse_i64("3.0"), Some(3));
        assert_eq!(parse_i64("three"), None);
    }

    #[test]
    fn test_parse_bool_encodings() {
        for s in ["true", "True", "t", "yes", "Y", "1"] {
            assert_eq!(parse_bool(s), Some(true), "{s}");
        }
        for s in ["false", "False", "f", "no", "N", "0"] {
            assert_eq!(parse_bool(s), Some(false), "{s}");
        }
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_date_days_round_trip() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let days = date_to_days(date);
        assert_eq!(days, 19723);
        assert_eq!(days_to_date(days), Some(date));
        assert_eq!(date_to_days(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), 0);
    }

    #[test]
    fn test_micros_round_trip() {
        let dt = parse_datetime("2024-03-15T10:30:45").unwrap();
        let micros = dt.and_utc().timestamp_micros();
        assert_eq!(micros_to_datetime(micros), Some(dt));
    }
}
