//! I/O helpers shared by the loader and the command handlers.
//!
//! - **Delimiter resolution**: `.tsv` paths default to tab, everything else
//!   to comma, with manual override.
//! - **Encoding**: input decoding via `encoding_rs`, defaulting to UTF-8.
//! - **Size ceiling**: sources are read through a bounded reader so an
//!   oversized input fails while streaming rather than after buffering.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};

use crate::error::LoadError;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8, has_headers: bool) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(has_headers)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(false);
    builder.from_reader(reader)
}

pub fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        ))
    };
    Ok(reader)
}

/// Reads a whole source, refusing anything that reaches `max_bytes`.
///
/// At most `max_bytes + 1` bytes are pulled from `reader`.
pub fn read_capped<R: Read>(reader: R, max_bytes: u64) -> Result<Vec<u8>, LoadError> {
    let mut buffer = Vec::new();
    reader
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut buffer)?;
    if buffer.len() as u64 >= max_bytes {
        return Err(LoadError::TooLarge { limit: max_bytes });
    }
    Ok(buffer)
}

pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    let output: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(std::io::stdout()),
    };
    Ok(output)
}

pub fn open_csv_writer(path: Option<&Path>, delimiter: u8) -> Result<csv::Writer<Box<dyn Write>>> {
    let base = open_output(path)?;
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true);
    Ok(builder.from_writer(base))
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String, LoadError> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(LoadError::Encoding {
            encoding: encoding.name(),
        })
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(
    record: &csv::ByteRecord,
    encoding: &'static Encoding,
) -> Result<Vec<String>, LoadError> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

pub fn reader_headers<R>(
    reader: &mut csv::Reader<R>,
    encoding: &'static Encoding,
) -> Result<Vec<String>, LoadError>
where
    R: Read,
{
    let headers = reader.byte_headers()?.clone();
    decode_record(&headers, encoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn tsv_extension_selects_tab() {
        assert_eq!(
            resolve_input_delimiter(&PathBuf::from("probe.TSV"), None),
            b'\t'
        );
        assert_eq!(
            resolve_input_delimiter(&PathBuf::from("probe.tsv"), Some(b';')),
            b';'
        );
        assert_eq!(resolve_input_delimiter(&PathBuf::from("probe.csv"), None), b',');
    }

    #[test]
    fn read_capped_rejects_sources_at_the_ceiling() {
        assert_eq!(read_capped("abc".as_bytes(), 4).unwrap(), b"abc");
        let err = read_capped("abcd".as_bytes(), 4).unwrap_err();
        assert!(matches!(err, LoadError::TooLarge { limit: 4 }));
        let err = read_capped("abcdefgh".as_bytes(), 4).unwrap_err();
        assert!(matches!(err, LoadError::TooLarge { limit: 4 }));
    }

    #[test]
    fn unknown_encoding_label_fails() {
        assert!(resolve_encoding(Some("klingon")).is_err());
        assert_eq!(resolve_encoding(Some(" latin1 ")).unwrap().name(), "windows-1252");
    }

    #[test]
    fn invalid_utf8_is_an_encoding_error() {
        let err = decode_bytes(&[0x66, 0xff], UTF_8).unwrap_err();
        assert!(matches!(err, LoadError::Encoding { encoding: "UTF-8" }));
    }
}
