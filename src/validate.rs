//! Header and value checks run before and after timestamp normalization.

use crate::{
    error::{LoadError, StructureError},
    raw::RawTable,
};

/// Header names accepted for the timestamp column, compared case-insensitively.
pub const TIMESTAMP_COLUMN_NAMES: &[&str] = &["timestamp", "time", "date", "datetime"];

/// Positions of the two columns that survive normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRoles {
    pub timestamp: usize,
    pub value: usize,
}

pub fn is_timestamp_column(name: &str) -> bool {
    TIMESTAMP_COLUMN_NAMES
        .iter()
        .any(|candidate| name.eq_ignore_ascii_case(candidate))
}

/// Locates the timestamp and value columns of a header row.
///
/// The value column is the first column whose name differs from the
/// timestamp column's, so duplicated timestamp headers are skipped.
pub fn resolve_columns(headers: &[String]) -> Result<ColumnRoles, StructureError> {
    if headers.len() < 2 {
        return Err(StructureError::TooFewColumns);
    }
    let timestamp = headers
        .iter()
        .position(|name| is_timestamp_column(name))
        .ok_or(StructureError::NoTimestampColumn)?;
    let value = headers
        .iter()
        .position(|name| name != &headers[timestamp])
        .ok_or(StructureError::NoValueColumn)?;
    Ok(ColumnRoles { timestamp, value })
}

pub fn validate_structure(table: &RawTable) -> Result<ColumnRoles, StructureError> {
    resolve_columns(&table.headers)
}

/// Checks that every value parses as a finite number.
///
/// Surrounding whitespace is tolerated; the text itself is never rewritten.
pub fn validate_values<'a, I>(values: I) -> Result<(), LoadError>
where
    I: IntoIterator<Item = &'a str>,
{
    for (idx, value) in values.into_iter().enumerate() {
        if !is_finite_number(value) {
            return Err(LoadError::InvalidValue {
                row: idx + 1,
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

pub fn is_finite_number(value: &str) -> bool {
    value
        .trim()
        .parse::<f64>()
        .map(f64::is_finite)
        .unwrap_or(false)
}
