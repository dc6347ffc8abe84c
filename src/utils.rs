/// Shared parsing helpers for upstream observation documents
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};

const HONG_KONG_OFFSET_SECS: i32 = 8 * 3600;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Hong Kong time, the zone every upstream timestamp without an offset is reported in.
pub fn hong_kong_offset() -> FixedOffset {
    FixedOffset::east_opt(HONG_KONG_OFFSET_SECS).expect("UTC+08:00 is a valid offset")
}

/// Parse an observation timestamp in any of the formats seen upstream
///
/// Timestamps carrying an offset keep it; naive timestamps are taken as
/// Hong Kong time. Returns `None` when nothing matches.
///
/// # Examples
///
/// ```
/// use hk_weather_map::utils::parse_observation_time;
///
/// let a = parse_observation_time("2026-01-19T14:45:00+08:00").unwrap();
/// let b = parse_observation_time("2026-01-19 14:45:00").unwrap();
/// let c = parse_observation_time("202601191445").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(b, c);
/// assert!(parse_observation_time("yesterday").is_none());
/// ```
pub fn parse_observation_time(value: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt);
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| parse_compact(trimmed))?;

    hong_kong_offset().from_local_datetime(&naive).single()
}

// HKO CSV exports use yyyyMMddHHmm.
fn parse_compact(value: &str) -> Option<NaiveDateTime> {
    if value.len() != 12 || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year = value[0..4].parse().ok()?;
    let month = value[4..6].parse().ok()?;
    let day = value[6..8].parse().ok()?;
    let hour = value[8..10].parse().ok()?;
    let minute = value[10..12].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
}

/// Parse a numeric reading; blanks, placeholders and non-finite values are absent.
pub fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_naive_assumes_hong_kong_time() {
        let dt = parse_observation_time("2026-01-19 14:45:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 8 * 3600);
        assert_eq!(dt.hour(), 14);
    }

    #[test]
    fn test_parse_keeps_explicit_offset() {
        let dt = parse_observation_time("2026-01-19T06:45:00Z").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 0);
        assert_eq!(dt, parse_observation_time("2026-01-19 14:45").unwrap());
    }

    #[test]
    fn test_parse_offset_with_space_separator() {
        assert!(parse_observation_time("2026-01-19 14:45:00+08:00").is_some());
    }

    #[test]
    fn test_parse_compact_rejects_bad_dates() {
        assert!(parse_observation_time("202613191445").is_none());
        assert!(parse_observation_time("20260119144").is_none());
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_observation_time("   ").is_none());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 23.4 "), Some(23.4));
        assert_eq!(parse_number("0"), Some(0.0));
        assert_eq!(parse_number("***"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }
}
