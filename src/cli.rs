use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{
    io_utils,
    loader::{LoadOptions, MAX_SOURCE_BYTES},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Validate and query two-column CSV time series", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate a CSV time series and report its row count and time span
    Load(LoadArgs),
    /// Emit the rows of a CSV time series that fall within a time range
    Query(QueryArgs),
    /// Show which format each timestamp token is detected as
    Detect(DetectArgs),
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Input CSV file ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Reject sources of this many bytes or more
    #[arg(
        long = "max-bytes",
        default_value_t = MAX_SOURCE_BYTES,
        value_parser = parse_max_bytes
    )]
    pub max_bytes: u64,
}

impl SourceArgs {
    pub fn load_options(&self) -> Result<LoadOptions> {
        Ok(LoadOptions {
            delimiter: io_utils::resolve_input_delimiter(&self.input, self.delimiter),
            encoding: io_utils::resolve_encoding(self.input_encoding.as_deref())?,
            max_bytes: self.max_bytes,
        })
    }
}

#[derive(Debug, Args)]
pub struct LoadArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Name recorded in the metadata file (defaults to the input file stem)
    #[arg(long)]
    pub name: Option<String>,
    /// Write a JSON metadata descriptor to this path
    #[arg(short, long)]
    pub meta: Option<PathBuf>,
    /// How to print the summary
    #[arg(long, value_enum, default_value = "table")]
    pub format: SummaryFormat,
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Inclusive lower bound (RFC3339, e.g. 2024-01-01T00:00:00Z)
    #[arg(long = "start", alias = "start-time")]
    pub start: Option<String>,
    /// Inclusive upper bound (RFC3339, e.g. 2024-01-01T23:59:59Z)
    #[arg(long = "end", alias = "end-time")]
    pub end: Option<String>,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value = "csv")]
    pub format: QueryFormat,
}

#[derive(Debug, Args)]
pub struct DetectArgs {
    /// Raw timestamp tokens to classify
    #[arg(required = true, allow_hyphen_values = true)]
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum SummaryFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum QueryFormat {
    #[default]
    Csv,
    Json,
    Table,
}

pub fn parse_max_bytes(value: &str) -> Result<u64, String> {
    match value.parse::<u64>() {
        Ok(0) => Err("--max-bytes must be greater than zero".to_string()),
        Ok(limit) => Ok(limit),
        Err(err) => Err(format!("Invalid byte count '{value}': {err}")),
    }
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
