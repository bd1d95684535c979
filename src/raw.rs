//! Untyped CSV table as produced by the tokenizer, before any validation.

use std::io::Read;

use encoding_rs::Encoding;

use crate::{error::LoadError, io_utils};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Tokenizes a CSV stream whose first record is the header.
    ///
    /// Records must all have the header's width; ragged input fails in the
    /// CSV reader.
    pub fn from_reader<R: Read>(
        reader: R,
        delimiter: u8,
        encoding: &'static Encoding,
    ) -> Result<Self, LoadError> {
        let mut reader = io_utils::open_csv_reader(reader, delimiter, true);
        let headers = io_utils::reader_headers(&mut reader, encoding)?;
        if headers.iter().all(|h| h.is_empty()) && headers.len() <= 1 {
            return Ok(RawTable::default());
        }
        let mut rows = Vec::new();
        for record in reader.byte_records() {
            let record = record?;
            rows.push(io_utils::decode_record(&record, encoding)?);
        }
        Ok(RawTable { headers, rows })
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(String::as_str).unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_8, WINDOWS_1252};

    #[test]
    fn reads_headers_and_rows() {
        let table =
            RawTable::from_reader("time,temp\n0,1.5\n60,2.5\n".as_bytes(), b',', UTF_8).unwrap();
        assert_eq!(table.headers, vec!["time", "temp"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column(1).collect::<Vec<_>>(), vec!["1.5", "2.5"]);
    }

    #[test]
    fn empty_source_has_no_columns() {
        let table = RawTable::from_reader("".as_bytes(), b',', UTF_8).unwrap();
        assert_eq!(table.column_count(), 0);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = RawTable::from_reader("time,value\n0,1,2\n".as_bytes(), b',', UTF_8)
            .unwrap_err();
        assert!(matches!(err, LoadError::Csv(_)));
    }

    #[test]
    fn decodes_legacy_encodings() {
        let (bytes, _, _) = WINDOWS_1252.encode("date;Temp\u{e9}rature\n2024-01-01;3\n");
        let table = RawTable::from_reader(&bytes[..], b';', WINDOWS_1252).unwrap();
        assert_eq!(table.headers[1], "Temp\u{e9}rature");
    }
}
