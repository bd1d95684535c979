//! Timestamp format detection and canonicalization.
//!
//! A raw token is classified, in fixed precedence, as an integer Unix epoch
//! (seconds or milliseconds), a fractional epoch, one of the supported
//! textual layouts, or a Julian Day number. Every accepted token becomes a
//! UTC instant that is rendered in the canonical `YYYY-MM-DDTHH:MM:SSZ` form.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use crate::error::{LoadError, TimestampError};

/// Integer epochs above this magnitude are read as milliseconds.
pub const EPOCH_MILLIS_THRESHOLD: u64 = 1_000_000_000_000;
/// Exclusive bounds of the Julian Day window.
pub const JULIAN_DAY_MIN: f64 = 2_400_000.0;
pub const JULIAN_DAY_MAX: f64 = 2_500_000.0;
/// First day (JD 2299161, 1582-10-15) that uses the Gregorian correction.
const GREGORIAN_REFORM_DAY: i64 = 2_299_161;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampFormat {
    EpochSeconds,
    EpochMillis,
    FractionalEpoch,
    Layout(&'static str),
    JulianDay,
}

impl fmt::Display for TimestampFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampFormat::EpochSeconds => f.write_str("epoch-seconds"),
            TimestampFormat::EpochMillis => f.write_str("epoch-millis"),
            TimestampFormat::FractionalEpoch => f.write_str("fractional-epoch"),
            TimestampFormat::Layout(name) => f.write_str(name),
            TimestampFormat::JulianDay => f.write_str("julian-day"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Layout {
    Rfc3339,
    DateTime(&'static str),
    Date(&'static str),
}

// Tried in order, first success wins. `%.f` also accepts an absent fraction,
// and chrono reads unpadded month/day digits, so `M/D/YYYY` input is covered
// by the `%m/%d/%Y` entries. RFC3339 covers the `Z`-suffixed forms.
const TEXT_LAYOUTS: &[(&str, Layout)] = &[
    ("rfc3339", Layout::Rfc3339),
    ("iso8601", Layout::DateTime("%Y-%m-%dT%H:%M:%S%.f")),
    ("iso8601-space", Layout::DateTime("%Y-%m-%d %H:%M:%S%.f")),
    ("iso8601-utc", Layout::DateTime("%Y-%m-%dT%H:%M:%S%.fZ")),
    ("iso-date", Layout::Date("%Y-%m-%d")),
    ("us-datetime", Layout::DateTime("%m/%d/%Y %H:%M:%S")),
    ("us-date", Layout::Date("%m/%d/%Y")),
    ("slash-datetime", Layout::DateTime("%Y/%m/%d %H:%M:%S")),
    ("slash-date", Layout::Date("%Y/%m/%d")),
];

/// Parses a single token into a UTC instant.
pub fn parse_timestamp(token: &str) -> Result<DateTime<Utc>, TimestampError> {
    detect(token).map(|(instant, _)| instant)
}

/// Parses a token and reports which format matched.
pub fn detect(raw: &str) -> Result<(DateTime<Utc>, TimestampFormat), TimestampError> {
    let token = raw.trim();

    if let Ok(whole) = token.parse::<i64>() {
        return from_integer_epoch(whole, token);
    }

    let numeric = token.parse::<f64>().ok().filter(|v| v.is_finite());
    if let Some(value) = numeric.filter(|v| !is_julian_day(*v)) {
        return from_fractional_epoch(value, token)
            .map(|instant| (instant, TimestampFormat::FractionalEpoch));
    }

    if let Some(found) = parse_layout(token) {
        return Ok(found);
    }

    if let Some(value) = numeric.filter(|v| is_julian_day(*v)) {
        return julian_day_to_utc(value)
            .map(|instant| (instant, TimestampFormat::JulianDay))
            .ok_or_else(|| TimestampError::OutOfRange(token.to_string()));
    }

    Err(TimestampError::Unsupported(token.to_string()))
}

/// Renders an instant in the canonical RFC3339 UTC form, whole seconds.
pub fn to_canonical(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn parse_canonical(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc))
}

/// Canonicalizes a whole column, failing on the first bad row.
///
/// Rows are numbered from 1. Nothing is returned unless every token parses.
pub fn normalize_column<'a, I>(tokens: I) -> Result<Vec<String>, LoadError>
where
    I: IntoIterator<Item = &'a str>,
{
    tokens
        .into_iter()
        .enumerate()
        .map(|(idx, token)| {
            parse_timestamp(token)
                .map(|instant| to_canonical(&instant))
                .map_err(|source| LoadError::InvalidTimestamp {
                    row: idx + 1,
                    source,
                })
        })
        .collect()
}

pub fn is_julian_day(value: f64) -> bool {
    value > JULIAN_DAY_MIN && value < JULIAN_DAY_MAX
}

fn from_integer_epoch(
    value: i64,
    token: &str,
) -> Result<(DateTime<Utc>, TimestampFormat), TimestampError> {
    let parsed = if value.unsigned_abs() > EPOCH_MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(value).map(|dt| (dt, TimestampFormat::EpochMillis))
    } else {
        DateTime::from_timestamp(value, 0).map(|dt| (dt, TimestampFormat::EpochSeconds))
    };
    parsed.ok_or_else(|| TimestampError::OutOfRange(token.to_string()))
}

fn from_fractional_epoch(value: f64, token: &str) -> Result<DateTime<Utc>, TimestampError> {
    let whole = value.trunc();
    let mut secs = whole as i64;
    let mut nanos = ((value - whole) * 1e9) as i64;
    if nanos < 0 {
        secs -= 1;
        nanos += 1_000_000_000;
    }
    DateTime::from_timestamp(secs, nanos as u32)
        .ok_or_else(|| TimestampError::OutOfRange(token.to_string()))
}

fn parse_layout(token: &str) -> Option<(DateTime<Utc>, TimestampFormat)> {
    TEXT_LAYOUTS.iter().find_map(|(name, layout)| {
        let instant = match layout {
            Layout::Rfc3339 => parse_canonical(token).ok()?,
            Layout::DateTime(pattern) => NaiveDateTime::parse_from_str(token, pattern)
                .ok()?
                .and_utc(),
            Layout::Date(pattern) => NaiveDate::parse_from_str(token, pattern)
                .ok()?
                .and_hms_opt(0, 0, 0)?
                .and_utc(),
        };
        Some((instant, TimestampFormat::Layout(name)))
    })
}

/// Converts a Julian Day number to a UTC instant.
///
/// Days before the 1582 reform use the Julian calendar branch. The time of
/// day is truncated to whole seconds.
pub fn julian_day_to_utc(jd: f64) -> Option<DateTime<Utc>> {
    let shifted = jd + 0.5;
    let z = shifted.floor();
    let fraction = shifted - z;
    let z = z as i64;

    let a = if z < GREGORIAN_REFORM_DAY {
        z
    } else {
        let alpha = ((z as f64 - 1_867_216.25) / 36_524.25).floor() as i64;
        z + 1 + alpha - alpha.div_euclid(4)
    };
    let b = a + 1524;
    let c = ((b as f64 - 122.1) / 365.25).floor() as i64;
    let d = (365.25 * c as f64).floor() as i64;
    let e = ((b - d) as f64 / 30.6001).floor() as i64;

    let day = b - d - (30.6001 * e as f64).floor() as i64;
    let month = if e <= 13 { e - 1 } else { e - 13 };
    let year = if month >= 3 { c - 4716 } else { c - 4715 };

    let seconds = fraction * 86_400.0;
    let hour = (seconds / 3600.0).floor();
    let minute = ((seconds - hour * 3600.0) / 60.0).floor();
    let second = (seconds - hour * 3600.0 - minute * 60.0).floor();

    NaiveDate::from_ymd_opt(
        i32::try_from(year).ok()?,
        u32::try_from(month).ok()?,
        u32::try_from(day).ok()?,
    )?
    .and_hms_opt(hour as u32, minute as u32, second as u32)
    .map(|naive| naive.and_utc())
}
