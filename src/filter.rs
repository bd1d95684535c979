//! Inclusive time-range subsetting of a canonical series.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use log::debug;

use crate::{
    error::FilterError,
    series::{CanonicalSeries, TimeSeriesSummary, parse_row_instant},
    timestamp,
};

/// Optional inclusive bounds. A missing side is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Builds a range from optional RFC3339 strings. Blank strings are absent.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        Ok(Self {
            start: parse_bound(start, "start_time")?,
            end: parse_bound(end, "end_time")?,
        })
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| *instant >= start)
            && self.end.is_none_or(|end| *instant <= end)
    }
}

fn parse_bound(raw: Option<&str>, name: &str) -> Result<Option<DateTime<Utc>>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => timestamp::parse_canonical(value)
            .map(Some)
            .map_err(|_| anyhow!("Invalid {name} format, use RFC3339")),
    }
}

/// Keeps the rows whose timestamp lies within `[lower, upper]`.
///
/// Surviving rows keep their relative order. With neither bound the series
/// is returned as is. A timestamp that fails to parse aborts the call.
pub fn filter(
    series: CanonicalSeries,
    lower: Option<DateTime<Utc>>,
    upper: Option<DateTime<Utc>>,
) -> Result<(CanonicalSeries, TimeSeriesSummary), FilterError> {
    filter_range(series, TimeRange::new(lower, upper))
}

pub fn filter_range(
    series: CanonicalSeries,
    range: TimeRange,
) -> Result<(CanonicalSeries, TimeSeriesSummary), FilterError> {
    if range.is_unbounded() {
        let summary = series.summary()?;
        return Ok((series, summary));
    }

    let mut kept = Vec::new();
    let mut extremes: Option<(DateTime<Utc>, DateTime<Utc>)> = None;
    for (idx, row) in series.rows().iter().enumerate() {
        let instant = parse_row_instant(idx + 1, &row.timestamp)?;
        if !range.contains(&instant) {
            continue;
        }
        extremes = Some(match extremes {
            None => (instant, instant),
            Some((lo, hi)) => (lo.min(instant), hi.max(instant)),
        });
        kept.push(row.clone());
    }
    debug!(
        "Range filter kept {} of {} row(s) (start {:?}, end {:?})",
        kept.len(),
        series.len(),
        range.start,
        range.end
    );

    let filtered = series.with_rows(kept);
    let summary = TimeSeriesSummary {
        row_count: filtered.len(),
        time_label: filtered.time_label().to_string(),
        value_label: filtered.value_label().to_string(),
        start_time: extremes.map(|(start, _)| start),
        end_time: extremes.map(|(_, end)| end),
    };
    Ok((filtered, summary))
}
