pub mod cache;
pub mod cli;
pub mod detect;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod io_utils;
pub mod loader;
pub mod metadata;
pub mod points;
pub mod query;
pub mod raw;
pub mod series;
pub mod table;
pub mod timestamp;
pub mod validate;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

pub use crate::error::{FilterError, LoadError, StructureError, TimestampError};
pub use crate::filter::{TimeRange, filter};
pub use crate::loader::{LoadOptions, load, load_reader, load_with};
pub use crate::series::{CanonicalSeries, Observation, TimeSeriesSummary};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_timeseries", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Load(args) => ingest::execute(&args),
        Commands::Query(args) => query::execute(&args),
        Commands::Detect(args) => detect::execute(&args),
    }
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
