//! Instrument timestamp conversions.
//!
//! OOINet delivers SUNA records stamped in NTP seconds (seconds since
//! 1900-01-01T00:00:00Z) or in OOI milliseconds (milliseconds since the Unix
//! epoch). These helpers move between those encodings and `DateTime<Utc>`.

use crate::constants::{MILLIS_PER_SECOND, NTP_UNIX_OFFSET_SECONDS};
use crate::error::{NitrateError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Naive layouts accepted by [`unix_epoch_time_str`], interpreted as UTC
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Convert NTP seconds to a UTC datetime, resolved to the microsecond.
///
/// Fails with [`NitrateError::TimestampOutOfRange`] for non-finite input or
/// values outside the range chrono can represent.
pub fn ntp_seconds_to_datetime(ntp_seconds: f64) -> Result<DateTime<Utc>> {
    let out_of_range = || NitrateError::out_of_range(ntp_seconds, "NTP seconds");

    if !ntp_seconds.is_finite() {
        return Err(out_of_range());
    }

    let unix_micros = ((ntp_seconds - NTP_UNIX_OFFSET_SECONDS as f64) * MICROS_PER_SECOND).round();
    if unix_micros < i64::MIN as f64 || unix_micros > i64::MAX as f64 {
        return Err(out_of_range());
    }

    DateTime::from_timestamp_micros(unix_micros as i64).ok_or_else(out_of_range)
}

/// Convert a UTC datetime back to NTP seconds
pub fn datetime_to_ntp_seconds(date_time: &DateTime<Utc>) -> f64 {
    let whole = (date_time.timestamp() + NTP_UNIX_OFFSET_SECONDS) as f64;
    whole + f64::from(date_time.timestamp_subsec_micros()) / MICROS_PER_SECOND
}

/// Convert OOI milliseconds to a UTC datetime.
///
/// An absent input is "no value" and yields `Ok(None)`, never an error.
pub fn convert_time(ms: Option<i64>) -> Result<Option<DateTime<Utc>>> {
    match ms {
        None => Ok(None),
        Some(ms) => DateTime::from_timestamp_millis(ms)
            .map(Some)
            .ok_or_else(|| NitrateError::out_of_range(ms, "milliseconds")),
    }
}

/// Milliseconds since the Unix epoch for a UTC datetime.
///
/// The value is truncated to whole seconds before scaling, so sub-second
/// precision is lost: `12:00:00.999` and `12:00:00.000` map to the same value.
/// Existing consumers depend on this.
pub fn unix_epoch_time(date_time: &DateTime<Utc>) -> i64 {
    date_time.timestamp() * MILLIS_PER_SECOND
}

/// Parse a timestamp string and return [`unix_epoch_time`] for it.
///
/// Accepts RFC 3339, naive `YYYY-MM-DD HH:MM:SS[.f]` / `YYYY-MM-DDTHH:MM:SS[.f]`
/// (taken as UTC) and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn unix_epoch_time_str(text: &str) -> Result<i64> {
    let date_time = parse_utc(text)?;
    Ok(unix_epoch_time(&date_time))
}

/// Parse a timestamp string in any of the layouts accepted by [`unix_epoch_time_str`]
pub(crate) fn parse_utc(text: &str) -> Result<DateTime<Utc>> {
    let text = text.trim();

    let mut last_error = match DateTime::parse_from_rfc3339(text) {
        Ok(parsed) => return Ok(parsed.with_timezone(&Utc)),
        Err(e) => e,
    };

    for format in NAIVE_DATETIME_FORMATS {
        match NaiveDateTime::parse_from_str(text, format) {
            Ok(naive) => return Ok(naive.and_utc()),
            Err(e) => last_error = e,
        }
    }

    match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        Ok(date) => {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return Ok(midnight.and_utc());
            }
        }
        Err(e) => last_error = e,
    }

    Err(NitrateError::DateTimeParsing {
        input: text.to_string(),
        source: last_error,
    })
}
