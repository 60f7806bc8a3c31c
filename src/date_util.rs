use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Whether `s` is a calendar date in `YYYY-MM-DD` form.
pub fn is_iso_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").is_ok()
}

/// Format a timestamp the way the store persists it. Fixed-width RFC 3339
/// in UTC, so lexical order matches chronological order.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a timestamp written by [`format_timestamp`].
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_iso_date() {
        assert!(is_iso_date("2024-03-17"));
        assert!(is_iso_date(" 2024-02-29 "));
        assert!(!is_iso_date("2023-02-29"));
        assert!(!is_iso_date("17/03/2024"));
        assert!(!is_iso_date(""));
    }

    #[test]
    fn test_timestamp_round_trip_and_ordering() {
        let a = "2024-05-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let b = "2024-05-01T10:00:00.000001Z".parse::<DateTime<Utc>>().unwrap();
        let (sa, sb) = (format_timestamp(a), format_timestamp(b));
        assert_eq!(sa, "2024-05-01T10:00:00.000000Z");
        assert!(sa < sb);
        assert_eq!(parse_timestamp(&sb), Some(b));
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
