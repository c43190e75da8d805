use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

pub const MISSING_TIMESTAMP: &str = "N/A";
pub const INVALID_TIMESTAMP: &str = "Invalid Date";

const DISPLAY_FORMAT: &str = "%b %-d, %Y, %-I:%M:%S %p";

/// Renders a backend timestamp in the local zone, e.g.
/// `Apr 29, 2025, 3:04:05 PM`.
pub fn format_timestamp(value: Option<&str>) -> String {
    format_timestamp_in(value, &Local)
}

pub fn format_timestamp_in<Tz>(value: Option<&str>, zone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let Some(raw) = value.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return MISSING_TIMESTAMP.to_string();
    };

    match parse_timestamp(raw) {
        Some(instant) => instant
            .with_timezone(zone)
            .format(DISPLAY_FORMAT)
            .to_string(),
        None => INVALID_TIMESTAMP.to_string(),
    }
}

/// Accepts RFC 3339 and offset-less ISO-8601, which is read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(raw, pattern).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}
