//! Plain-text table rendering for terminal output.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{series::TimeSeriesSummary, timestamp};

pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count().max(3)).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(clean(cell).chars().count());
        }
    }

    let mut output = String::new();
    let header_cells: Vec<Cow<'_, str>> = headers.iter().map(|h| Cow::Borrowed(*h)).collect();
    let _ = writeln!(output, "{}", format_line(&header_cells, &widths));
    let rule: Vec<Cow<'_, str>> = widths.iter().map(|w| Cow::Owned("-".repeat(*w))).collect();
    let _ = writeln!(output, "{}", format_line(&rule, &widths));
    for row in rows {
        let cells: Vec<Cow<'_, str>> = row.iter().map(|c| clean(c)).collect();
        let _ = writeln!(output, "{}", format_line(&cells, &widths));
    }
    output
}

pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

/// Two-column `field | value` view of a summary.
pub fn summary_rows(summary: &TimeSeriesSummary) -> Vec<Vec<String>> {
    let instant = |value: Option<chrono::DateTime<chrono::Utc>>| {
        value
            .map(|v| timestamp::to_canonical(&v))
            .unwrap_or_else(|| "-".to_string())
    };
    vec![
        vec!["rows".to_string(), summary.row_count.to_string()],
        vec!["time_label".to_string(), summary.time_label.clone()],
        vec!["value_label".to_string(), summary.value_label.clone()],
        vec!["start_time".to_string(), instant(summary.start_time)],
        vec!["end_time".to_string(), instant(summary.end_time)],
    ]
}

fn format_line(cells: &[Cow<'_, str>], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn clean(cell: &str) -> Cow<'_, str> {
    if cell.contains(['\n', '\r', '\t']) {
        Cow::Owned(cell.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(cell)
    }
}
