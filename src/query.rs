use std::io::Write;

use anyhow::{Context, Result, bail};
use log::info;

use crate::{
    cli::{QueryArgs, QueryFormat},
    filter::{self, TimeRange},
    ingest, io_utils,
    points::QueryResponse,
    series::{CanonicalSeries, TIMESTAMP_FIELD, VALUE_FIELD},
    table,
};

pub fn execute(args: &QueryArgs) -> Result<()> {
    let range = TimeRange::parse(args.start.as_deref(), args.end.as_deref())?;
    if args.format == QueryFormat::Table
        && args.output.as_deref().is_some_and(|p| !io_utils::is_dash(p))
    {
        bail!("--format table cannot be combined with --output");
    }

    let (bytes, options) = ingest::read_source(&args.source)?;
    let (series, _) = ingest::load_bytes(&args.source, &bytes, &options)?;
    let total = series.len();
    let (filtered, summary) =
        filter::filter_range(series, range).context("Filtering rows by time range")?;

    match args.format {
        QueryFormat::Csv => write_csv(&filtered, args, options.delimiter)?,
        QueryFormat::Json => {
            let response = QueryResponse::build(&filtered, &summary)
                .context("Converting rows to data points")?;
            let mut output = io_utils::open_output(args.output.as_deref())?;
            serde_json::to_writer_pretty(&mut output, &response).context("Writing query JSON")?;
            writeln!(output)?;
            output.flush()?;
        }
        QueryFormat::Table => {
            let rows = filtered
                .rows()
                .iter()
                .map(|row| vec![row.timestamp.clone(), row.value.clone()])
                .collect::<Vec<_>>();
            table::print_table(&[TIMESTAMP_FIELD, VALUE_FIELD], &rows);
        }
    }
    info!(
        "Query matched {} of {} row(s) in {:?}",
        summary.row_count, total, args.source.input
    );
    Ok(())
}

fn write_csv(series: &CanonicalSeries, args: &QueryArgs, delimiter: u8) -> Result<()> {
    let mut writer = io_utils::open_csv_writer(args.output.as_deref(), delimiter)?;
    writer.write_record([TIMESTAMP_FIELD, VALUE_FIELD])?;
    for row in series.rows() {
        writer.write_record([row.timestamp.as_str(), row.value.as_str()])?;
    }
    writer.flush().context("Flushing CSV output")?;
    Ok(())
}
