//! Field-level parsing for upstream trip rows.
//!
//! Every function here recovers locally: a malformed value becomes `None` or
//! zero instead of failing the row.

use chrono::{DateTime, NaiveDateTime, Utc};
use taxi_map_trip_models::LatLng;

/// Parses a Socrata datetime string.
///
/// Accepts floating timestamps with or without fractional seconds
/// (`2014-01-09T20:45:25.000`), the space-separated variant, and RFC 3339
/// strings with an offset. Floating timestamps are taken as UTC.
#[must_use]
pub fn parse_socrata_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Formats a timestamp as ISO 8601 with millisecond precision and a `Z`
/// suffix (`2014-01-09T20:45:25.000Z`).
#[must_use]
pub fn to_iso_string(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parses a finite number, or `None`.
#[must_use]
pub fn parse_number(s: Option<&str>) -> Option<f64> {
    s?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a monetary or distance amount, falling back to `0.0`.
#[must_use]
pub fn parse_amount(s: Option<&str>) -> f64 {
    parse_number(s).unwrap_or(0.0)
}

/// Parses lat/lng from optional string fields. Returns `None` if either is
/// missing or unparseable.
#[must_use]
pub fn parse_lat_lng_str(lat: Option<&str>, lng: Option<&str>) -> Option<LatLng> {
    Some(LatLng::new(parse_number(lat)?, parse_number(lng)?))
}

/// Whole minutes from `pickup` to `dropoff`, rounded half up.
///
/// Negative spans (dropoff before pickup) clamp to zero.
#[must_use]
pub fn duration_minutes(pickup: &DateTime<Utc>, dropoff: &DateTime<Utc>) -> u32 {
    let millis = (*dropoff - *pickup).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    let minutes = (millis + 30_000) / 60_000;
    u32::try_from(minutes).unwrap_or(u32::MAX)
}
