use anyhow::{Result, bail};

use crate::{cli::DetectArgs, table, timestamp};

pub fn execute(args: &DetectArgs) -> Result<()> {
    let mut failures = 0usize;
    let rows = args
        .tokens
        .iter()
        .map(|token| match timestamp::detect(token) {
            Ok((instant, format)) => vec![
                token.clone(),
                format.to_string(),
                timestamp::to_canonical(&instant),
            ],
            Err(err) => {
                failures += 1;
                vec![token.clone(), "-".to_string(), err.to_string()]
            }
        })
        .collect::<Vec<_>>();
    table::print_table(&["token", "format", "canonical"], &rows);
    if failures > 0 {
        bail!("{failures} of {} token(s) could not be parsed", rows.len());
    }
    Ok(())
}
