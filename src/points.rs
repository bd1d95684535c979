//! Typed data points served to query callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::PointError,
    series::{CanonicalSeries, TimeSeriesSummary, parse_row_instant},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub data: Vec<DataPoint>,
    pub row_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl QueryResponse {
    pub fn build(series: &CanonicalSeries, summary: &TimeSeriesSummary) -> Result<Self, PointError> {
        let data = data_points(series)?;
        Ok(Self {
            row_count: data.len(),
            start_time: summary.start_time,
            end_time: summary.end_time,
            data,
        })
    }
}

/// Converts every canonical row. Any row that does not convert is an error;
/// rows are never dropped.
pub fn data_points(series: &CanonicalSeries) -> Result<Vec<DataPoint>, PointError> {
    series
        .rows()
        .iter()
        .enumerate()
        .map(|(idx, row)| -> Result<DataPoint, PointError> {
            let timestamp = parse_row_instant(idx + 1, &row.timestamp)?;
            let value = row
                .value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| PointError::Value {
                    row: idx + 1,
                    value: row.value.clone(),
                })?;
            Ok(DataPoint { timestamp, value })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Observation;

    #[test]
    fn converts_rows_in_order() {
        let series = CanonicalSeries::new(
            "time",
            "value",
            vec![
                Observation::new("2024-01-02T00:00:00Z", " 2.5"),
                Observation::new("2024-01-01T00:00:00Z", "1"),
            ],
        );
        let summary = series.summary().unwrap();
        let response = QueryResponse::build(&series, &summary).unwrap();
        assert_eq!(response.row_count, 2);
        assert_eq!(response.data[0].value, 2.5);
        assert_eq!(response.start_time, summary.start_time);
    }

    #[test]
    fn unconvertible_rows_are_errors_not_skips() {
        let series = CanonicalSeries::new(
            "time",
            "value",
            vec![
                Observation::new("2024-01-01T00:00:00Z", "1"),
                Observation::new("2024-01-02T00:00:00Z", "n/a"),
            ],
        );
        let err = data_points(&series).unwrap_err();
        assert!(matches!(err, PointError::Value { row: 2, .. }));

        let series = CanonicalSeries::new(
            "time",
            "value",
            vec![Observation::new("tuesday", "1")],
        );
        assert!(matches!(
            data_points(&series).unwrap_err(),
            PointError::Timestamp(_)
        ));
    }

    #[test]
    fn empty_response_omits_bounds() {
        let series = CanonicalSeries::default();
        let summary = series.summary().unwrap();
        let json = serde_json::to_value(QueryResponse::build(&series, &summary).unwrap()).unwrap();
        assert_eq!(json["row_count"], 0);
        assert!(json.get("start_time").is_none());
        assert_eq!(json["data"], serde_json::json!([]));
    }
}
