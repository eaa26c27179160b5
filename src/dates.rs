//! Guarded date helpers. The backend's timestamp fields are not reliable
//! (missing, empty, occasionally epoch millis instead of RFC 3339), so every
//! helper here is total: malformed input yields a fallback string or `None`,
//! never a panic or an error.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

pub const DATE_FALLBACK: &str = "Date TBD";
pub const TIME_FALLBACK: &str = "Unknown time";

/// Parse a wire timestamp. Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`,
/// bare dates, and integer epoch milliseconds.
pub fn parse_date(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
    }
    if let Ok(millis) = s.parse::<i64>() {
        return Utc.timestamp_millis_opt(millis).single();
    }
    None
}

/// Format a wire timestamp with the given strftime pattern, or the fallback.
pub fn format_date(raw: Option<&str>, pattern: &str) -> String {
    match parse_date(raw) {
        Some(dt) => dt.with_timezone(&Local).format(pattern).to_string(),
        None => DATE_FALLBACK.to_string(),
    }
}

/// Short human date, e.g. `Mar 14, 2026`.
pub fn format_day(raw: Option<&str>) -> String {
    format_date(raw, "%b %-d, %Y")
}

/// Date plus time, e.g. `Mar 14, 2026 18:30`.
pub fn format_day_time(raw: Option<&str>) -> String {
    format_date(raw, "%b %-d, %Y %H:%M")
}

/// Relative rendering against now: "just now", "5 minutes ago", "3 days ago".
/// Future timestamps render as "in …".
pub fn format_relative(raw: Option<&str>) -> String {
    let Some(dt) = parse_date(raw) else {
        return TIME_FALLBACK.to_string();
    };
    let delta = Utc::now().signed_duration_since(dt);
    let (magnitude, future) = if delta.num_seconds() < 0 {
        (-delta, true)
    } else {
        (delta, false)
    };
    let secs = magnitude.num_seconds();
    let phrase = if secs < 45 {
        return if future { "shortly".to_string() } else { "just now".to_string() };
    } else if secs < 90 {
        "1 minute".to_string()
    } else if magnitude.num_minutes() < 60 {
        format!("{} minutes", magnitude.num_minutes())
    } else if magnitude.num_hours() < 2 {
        "1 hour".to_string()
    } else if magnitude.num_hours() < 24 {
        format!("{} hours", magnitude.num_hours())
    } else if magnitude.num_days() < 2 {
        "1 day".to_string()
    } else if magnitude.num_days() < 30 {
        format!("{} days", magnitude.num_days())
    } else if magnitude.num_days() < 365 {
        format!("{} months", (magnitude.num_days() / 30).max(1))
    } else {
        format!("{} years", (magnitude.num_days() / 365).max(1))
    };
    if future {
        format!("in {}", phrase)
    } else {
        format!("{} ago", phrase)
    }
}

/// True when the timestamp parses and lies in the future.
pub fn is_upcoming(raw: Option<&str>) -> bool {
    parse_date(raw).map(|dt| dt > Utc::now()).unwrap_or(false)
}

/// True when the timestamp parses and lies in the past.
pub fn is_past(raw: Option<&str>) -> bool {
    parse_date(raw).map(|dt| dt < Utc::now()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_and_variants() {
        assert!(parse_date(Some("2026-03-14T18:30:00Z")).is_some());
        assert!(parse_date(Some("2026-03-14T18:30:00+02:00")).is_some());
        assert!(parse_date(Some("2026-03-14 18:30:00")).is_some());
        assert!(parse_date(Some("2026-03-14")).is_some());
        assert!(parse_date(Some("1765731000000")).is_some());
    }

    #[test]
    fn malformed_input_is_tolerated() {
        assert!(parse_date(None).is_none());
        assert!(parse_date(Some("")).is_none());
        assert!(parse_date(Some("  ")).is_none());
        assert!(parse_date(Some("not-a-date")).is_none());
        assert!(parse_date(Some("2026-13-99")).is_none());
        assert_eq!(format_day(Some("garbage")), DATE_FALLBACK);
        assert_eq!(format_relative(Some("garbage")), TIME_FALLBACK);
        assert_eq!(format_relative(None), TIME_FALLBACK);
    }

    #[test]
    fn relative_buckets() {
        let now = Utc::now();
        let five_min = (now - chrono::Duration::minutes(5)).to_rfc3339();
        assert_eq!(format_relative(Some(&five_min)), "5 minutes ago");
        let three_days = (now - chrono::Duration::days(3)).to_rfc3339();
        assert_eq!(format_relative(Some(&three_days)), "3 days ago");
        let future = (now + chrono::Duration::hours(5)).to_rfc3339();
        assert_eq!(format_relative(Some(&future)), "in 5 hours");
        let fresh = (now - chrono::Duration::seconds(5)).to_rfc3339();
        assert_eq!(format_relative(Some(&fresh)), "just now");
    }

    #[test]
    fn upcoming_and_past_are_total() {
        assert!(!is_upcoming(Some("junk")));
        assert!(!is_past(None));
        let future = (Utc::now() + chrono::Duration::days(1)).to_rfc3339();
        assert!(is_upcoming(Some(&future)));
        assert!(!is_past(Some(&future)));
    }
}
