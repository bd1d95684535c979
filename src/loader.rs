//! End-to-end ingestion: raw CSV bytes in, canonical series and summary out.
//!
//! Stages run strictly in order and the first failure aborts the load:
//! tokenize, resolve columns, normalize timestamps, validate values, compute
//! the time range. Nothing partial is ever returned.

use std::io::Read;

use encoding_rs::{Encoding, UTF_8};
use log::{debug, info};

use crate::{
    error::LoadError,
    io_utils::{self, DEFAULT_CSV_DELIMITER},
    raw::RawTable,
    series::{CanonicalSeries, Observation, TimeSeriesSummary},
    timestamp, validate,
};

/// Largest source accepted by default (500 MiB).
pub const MAX_SOURCE_BYTES: u64 = 500 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
    pub max_bytes: u64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_CSV_DELIMITER,
            encoding: UTF_8,
            max_bytes: MAX_SOURCE_BYTES,
        }
    }
}

/// Loads a comma-separated UTF-8 source with the default size ceiling.
pub fn load(bytes: &[u8]) -> Result<(CanonicalSeries, TimeSeriesSummary), LoadError> {
    load_with(bytes, &LoadOptions::default())
}

pub fn load_with(
    bytes: &[u8],
    options: &LoadOptions,
) -> Result<(CanonicalSeries, TimeSeriesSummary), LoadError> {
    check_size(bytes.len(), options)?;
    let table = RawTable::from_reader(bytes, options.delimiter, options.encoding)?;
    canonicalize(&table)
}

/// Rejects sources that reach the configured ceiling.
pub(crate) fn check_size(len: usize, options: &LoadOptions) -> Result<(), LoadError> {
    if len as u64 >= options.max_bytes {
        return Err(LoadError::TooLarge {
            limit: options.max_bytes,
        });
    }
    Ok(())
}

/// Streams a source through the size ceiling before parsing it.
pub fn load_reader<R: Read>(
    reader: R,
    options: &LoadOptions,
) -> Result<(CanonicalSeries, TimeSeriesSummary), LoadError> {
    let bytes = io_utils::read_capped(reader, options.max_bytes)?;
    debug!("Read {} byte(s) of CSV source", bytes.len());
    load_with(&bytes, options)
}

/// Runs validation and normalization over an already tokenized table.
pub fn canonicalize(table: &RawTable) -> Result<(CanonicalSeries, TimeSeriesSummary), LoadError> {
    let roles = validate::validate_structure(table)?;
    let time_label = &table.headers[roles.timestamp];
    let value_label = &table.headers[roles.value];
    debug!(
        "Timestamp column '{}' (#{}), value column '{}' (#{})",
        time_label,
        roles.timestamp + 1,
        value_label,
        roles.value + 1
    );

    let timestamps = timestamp::normalize_column(table.column(roles.timestamp))?;
    validate::validate_values(table.column(roles.value))?;

    let rows = timestamps
        .into_iter()
        .zip(table.column(roles.value))
        .map(|(ts, value)| Observation::new(ts, value))
        .collect();
    let series = CanonicalSeries::new(time_label.as_str(), value_label.as_str(), rows);
    let summary = series.summary()?;
    info!(
        "Loaded {} row(s) ('{}' -> timestamp, '{}' -> value)",
        summary.row_count, summary.time_label, summary.value_label
    );
    Ok((series, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StructureError;

    #[test]
    fn loads_mixed_formats_into_canonical_form() {
        let csv = "Time,reading\n0,1\n1700000000000,2.50\n2451545.0,-3\n2024-05-06 14:30:00,4e2\n";
        let (series, summary) = load(csv.as_bytes()).unwrap();
        let stamps: Vec<_> = series.timestamps().collect();
        assert_eq!(
            stamps,
            vec![
                "1970-01-01T00:00:00Z",
                "2023-11-14T22:13:20Z",
                "2000-01-01T12:00:00Z",
                "2024-05-06T14:30:00Z",
            ]
        );
        let values: Vec<_> = series.rows().iter().map(|r| r.value.as_str()).collect();
        assert_eq!(values, vec!["1", "2.50", "-3", "4e2"]);
        assert_eq!(summary.time_label, "Time");
        assert_eq!(summary.value_label, "reading");
        assert_eq!(summary.row_count, 4);
    }

    #[test]
    fn header_only_source_has_no_range() {
        let (series, summary) = load(b"timestamp,value\n").unwrap();
        assert!(series.is_empty());
        assert_eq!(summary.start_time, None);
        assert_eq!(summary.end_time, None);
    }

    #[test]
    fn empty_source_is_structurally_invalid() {
        let err = load(b"").unwrap_err();
        assert!(matches!(
            err,
            LoadError::Structure(StructureError::TooFewColumns)
        ));
    }

    #[test]
    fn ceiling_applies_to_in_memory_sources() {
        let options = LoadOptions {
            max_bytes: 8,
            ..LoadOptions::default()
        };
        let err = load_with(b"time,value\n0,1\n", &options).unwrap_err();
        assert!(matches!(err, LoadError::TooLarge { limit: 8 }));
    }

    #[test]
    fn timestamp_errors_win_over_value_errors() {
        let err = load(b"time,value\n0,abc\nsoon,1\n").unwrap_err();
        assert!(matches!(err, LoadError::InvalidTimestamp { row: 2, .. }));
    }
}
