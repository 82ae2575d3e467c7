use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use toml::value::{Datetime, Offset};
use toml::Value;

use super::{incompatible, CoerceError};

/// Layouts carrying an explicit offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%:z",
];

/// Layouts without an offset, read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d %b %Y"];

/// Converts a value to a timestamp.
///
/// TOML datetimes without an offset are taken as UTC and a bare date means
/// midnight. Integers are Unix seconds. Strings go through [`parse_time`].
pub fn to_time(value: &Value) -> Result<DateTime<FixedOffset>, CoerceError> {
    match value {
        Value::Datetime(dt) => from_toml(dt),
        Value::String(s) => parse_time(s),
        Value::Integer(secs) => DateTime::<Utc>::from_timestamp(*secs, 0)
            .map(Into::into)
            .ok_or_else(|| CoerceError::InvalidTime(secs.to_string())),
        _ => Err(incompatible(value, "timestamp")),
    }
}

/// Parses a timestamp string in one of the accepted layouts: RFC 3339,
/// RFC 2822, `YYYY-MM-DD[T| ]HH:MM:SS[.f][offset]`, `YYYY-MM-DD` or
/// `DD Mon YYYY`.
pub fn parse_time(s: &str) -> Result<DateTime<FixedOffset>, CoerceError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Ok(dt);
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc().into());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date.and_time(NaiveTime::MIN).and_utc().into());
        }
    }
    Err(CoerceError::InvalidTime(s.to_string()))
}

fn from_toml(dt: &Datetime) -> Result<DateTime<FixedOffset>, CoerceError> {
    let invalid = || CoerceError::InvalidTime(dt.to_string());

    let date = dt.date.as_ref().ok_or_else(invalid)?;
    let date = NaiveDate::from_ymd_opt(
        i32::from(date.year),
        u32::from(date.month),
        u32::from(date.day),
    )
    .ok_or_else(invalid)?;

    let time = match &dt.time {
        Some(t) => NaiveTime::from_hms_nano_opt(
            u32::from(t.hour),
            u32::from(t.minute),
            u32::from(t.second),
            t.nanosecond,
        )
        .ok_or_else(invalid)?,
        None => NaiveTime::MIN,
    };

    let offset_secs = match dt.offset {
        Some(Offset::Custom { minutes }) => i32::from(minutes) * 60,
        Some(Offset::Z) | None => 0,
    };
    let offset = FixedOffset::east_opt(offset_secs).ok_or_else(invalid)?;

    date.and_time(time)
        .and_local_timezone(offset)
        .single()
        .ok_or_else(invalid)
}
