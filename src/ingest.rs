use anyhow::{Context, Result};
use log::info;

use crate::{
    cache,
    cli::{LoadArgs, SourceArgs, SummaryFormat},
    io_utils,
    loader::{self, LoadOptions},
    metadata::{self, DataSourceMetadata, SourceKind},
    series::{CanonicalSeries, TimeSeriesSummary},
    table,
};

pub fn execute(args: &LoadArgs) -> Result<()> {
    let (bytes, options) = read_source(&args.source)?;
    let (_, summary) = load_bytes(&args.source, &bytes, &options)?;

    if let Some(meta_path) = &args.meta {
        let name = args
            .name
            .clone()
            .unwrap_or_else(|| metadata::default_source_name(&args.source.input));
        let descriptor = DataSourceMetadata::from_summary(
            name,
            SourceKind::Csv,
            cache::fingerprint(&bytes),
            &summary,
        );
        descriptor
            .save(meta_path)
            .with_context(|| format!("Writing metadata to {meta_path:?}"))?;
        info!("Metadata for '{}' written to {:?}", descriptor.name, meta_path);
    }

    match args.format {
        SummaryFormat::Table => {
            table::print_table(&["field", "value"], &table::summary_rows(&summary));
        }
        SummaryFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("Serializing summary")?
            );
        }
    }
    Ok(())
}

/// Reads the input named by `source` under its size ceiling.
pub(crate) fn read_source(source: &SourceArgs) -> Result<(Vec<u8>, LoadOptions)> {
    let options = source.load_options()?;
    info!(
        "Reading '{}' with delimiter '{}' ({} max bytes)",
        source.input.display(),
        crate::printable_delimiter(options.delimiter),
        options.max_bytes
    );
    let reader = io_utils::open_input(&source.input)?;
    let bytes = io_utils::read_capped(reader, options.max_bytes)
        .with_context(|| format!("Reading {:?}", source.input))?;
    Ok((bytes, options))
}

pub(crate) fn load_bytes(
    source: &SourceArgs,
    bytes: &[u8],
    options: &LoadOptions,
) -> Result<(CanonicalSeries, TimeSeriesSummary)> {
    loader::load_with(bytes, options)
        .with_context(|| format!("Invalid CSV {:?}", source.input))
}
