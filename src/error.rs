//! Typed failures for the load and filter pipeline.
//!
//! Messages for structural, timestamp, and value failures are surfaced to
//! callers verbatim, so their text is kept stable.

use thiserror::Error;

/// Malformed header or table shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("CSV must contain at least 2 columns (timestamp and value)")]
    TooFewColumns,
    #[error("CSV must contain a timestamp column (timestamp, time, date, or datetime)")]
    NoTimestampColumn,
    #[error("no value column found")]
    NoValueColumn,
}

/// A single timestamp token that could not be turned into a UTC instant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("unsupported timestamp format: {0}")]
    Unsupported(String),
    #[error("timestamp out of range: {0}")]
    OutOfRange(String),
}

/// A canonical timestamp that no longer parses as RFC3339.
///
/// Canonical columns are valid by construction, so hitting this means a
/// series was built or mutated outside the loader.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("malformed canonical timestamp at row {row}: '{value}'")]
    MalformedTimestamp {
        row: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read CSV source: {0}")]
    Io(#[from] std::io::Error),
    #[error("file size exceeds maximum allowed size of {limit} bytes")]
    TooLarge { limit: u64 },
    #[error("failed to decode CSV source as {encoding}")]
    Encoding { encoding: &'static str },
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Structure(#[from] StructureError),
    #[error("invalid timestamp at row {row}: {source}")]
    InvalidTimestamp {
        row: usize,
        #[source]
        source: TimestampError,
    },
    #[error("invalid value at row {row}: must be a number")]
    InvalidValue { row: usize, value: String },
    #[error(transparent)]
    Range(#[from] FilterError),
}

/// A canonical row that cannot be turned into a typed data point.
#[derive(Debug, Error)]
pub enum PointError {
    #[error(transparent)]
    Timestamp(#[from] FilterError),
    #[error("non-numeric value at row {row}: '{value}'")]
    Value { row: usize, value: String },
}

impl LoadError {
    /// 1-based data row the failure points at, when it is row-scoped.
    pub fn row(&self) -> Option<usize> {
        match self {
            LoadError::InvalidTimestamp { row, .. } | LoadError::InvalidValue { row, .. } => {
                Some(*row)
            }
            LoadError::Range(FilterError::MalformedTimestamp { row, .. }) => Some(*row),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_client_contract() {
        assert_eq!(
            LoadError::from(StructureError::TooFewColumns).to_string(),
            "CSV must contain at least 2 columns (timestamp and value)"
        );
        let err = LoadError::InvalidValue {
            row: 3,
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "invalid value at row 3: must be a number");
        assert_eq!(err.row(), Some(3));

        let err = LoadError::InvalidTimestamp {
            row: 7,
            source: TimestampError::Unsupported("soon".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "invalid timestamp at row 7: unsupported timestamp format: soon"
        );
    }

    #[test]
    fn structural_errors_have_no_row() {
        let err = LoadError::from(StructureError::NoTimestampColumn);
        assert_eq!(err.row(), None);
    }
}
