//! Instant parsing and formatting for command-line input and output.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use taskline_core::{EpochMs, TimeSpan};

const MINUTE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Parses RFC 3339, or `YYYY-MM-DDTHH:MM` read as UTC, into epoch milliseconds.
pub fn parse_instant(value: &str) -> Result<EpochMs, String> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.timestamp_millis());
    }
    NaiveDateTime::parse_from_str(value, MINUTE_FORMAT)
        .map(|naive| naive.and_utc().timestamp_millis())
        .map_err(|_| format!("invalid instant `{value}`; expected RFC 3339 or YYYY-MM-DDTHH:MM"))
}

pub fn format_instant(instant: EpochMs) -> String {
    DateTime::<Utc>::from_timestamp_millis(instant)
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| instant.to_string())
}

pub fn format_span(span: &TimeSpan) -> String {
    let side = |instant: Option<EpochMs>| instant.map_or_else(|| "-".to_string(), format_instant);
    format!("{} .. {}", side(span.start), side(span.end))
}

#[cfg(test)]
mod tests {
    use super::{format_instant, format_span, parse_instant};
    use taskline_core::TimeSpan;

    const JAN_1: i64 = 1_704_067_200_000;

    #[test]
    fn parses_minute_precision_as_utc() {
        assert_eq!(parse_instant("2024-01-01T00:00"), Ok(JAN_1));
        assert_eq!(parse_instant("2024-01-01T01:30"), Ok(JAN_1 + 90 * 60_000));
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        assert_eq!(parse_instant("2024-01-01T02:00:00+02:00"), Ok(JAN_1));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_instant("tomorrow").is_err());
    }

    #[test]
    fn formats_partial_span() {
        let span = TimeSpan::new(Some(JAN_1), None);
        assert_eq!(format_span(&span), "2024-01-01T00:00:00Z .. -");
        assert_eq!(format_instant(JAN_1), "2024-01-01T00:00:00Z");
    }
}
