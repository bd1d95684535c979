//! The canonical two-column series and its summary.

use chrono::{DateTime, Utc};
use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

use crate::{error::FilterError, timestamp};

pub const TIMESTAMP_FIELD: &str = "timestamp";
pub const VALUE_FIELD: &str = "value";

/// One canonical row. `timestamp` is RFC3339 UTC text; `value` is the
/// source text exactly as read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: String,
    pub value: String,
}

impl Observation {
    pub fn new(timestamp: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalSeries {
    time_label: String,
    value_label: String,
    rows: Vec<Observation>,
}

impl CanonicalSeries {
    pub fn new(
        time_label: impl Into<String>,
        value_label: impl Into<String>,
        rows: Vec<Observation>,
    ) -> Self {
        Self {
            time_label: time_label.into(),
            value_label: value_label.into(),
            rows,
        }
    }

    /// Same labels, different rows.
    pub(crate) fn with_rows(&self, rows: Vec<Observation>) -> Self {
        Self {
            time_label: self.time_label.clone(),
            value_label: self.value_label.clone(),
            rows,
        }
    }

    /// Header of the source timestamp column.
    pub fn time_label(&self) -> &str {
        &self.time_label
    }

    /// Header of the source value column.
    pub fn value_label(&self) -> &str {
        &self.value_label
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(|row| row.timestamp.as_str())
    }

    /// Parsed instants in row order, numbered from 1 on failure.
    pub fn instants(&self) -> impl Iterator<Item = Result<DateTime<Utc>, FilterError>> + '_ {
        self.rows
            .iter()
            .enumerate()
            .map(|(idx, row)| parse_row_instant(idx + 1, &row.timestamp))
    }

    /// Earliest and latest instant, or `None` for an empty series.
    pub fn time_range(&self) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, FilterError> {
        let extremes = itertools::process_results(self.instants(), |instants| instants.minmax())?;
        Ok(match extremes {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(only) => Some((only, only)),
            MinMaxResult::MinMax(min, max) => Some((min, max)),
        })
    }

    pub fn summary(&self) -> Result<TimeSeriesSummary, FilterError> {
        let range = self.time_range()?;
        Ok(TimeSeriesSummary {
            row_count: self.len(),
            time_label: self.time_label.clone(),
            value_label: self.value_label.clone(),
            start_time: range.map(|(start, _)| start),
            end_time: range.map(|(_, end)| end),
        })
    }
}

pub(crate) fn parse_row_instant(row: usize, value: &str) -> Result<DateTime<Utc>, FilterError> {
    timestamp::parse_canonical(value).map_err(|source| FilterError::MalformedTimestamp {
        row,
        value: value.to_string(),
        source,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesSummary {
    pub row_count: usize,
    pub time_label: String,
    pub value_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl TimeSeriesSummary {
    pub fn span(&self) -> Option<chrono::Duration> {
        Some(self.end_time? - self.start_time?)
    }
}
