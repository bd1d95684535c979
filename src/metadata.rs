use std::{fmt, fs::File, io::BufReader, path::Path, str::FromStr};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::series::TimeSeriesSummary;

/// Kind of backing source. Only CSV exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum SourceKind {
    Csv,
}

impl SourceKind {
    /// Numeric code used by stores that persist the kind as an integer.
    pub fn code(self) -> i32 {
        match self {
            SourceKind::Csv => 0,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(SourceKind::Csv),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Csv => "csv",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(SourceKind::Csv),
            other => Err(anyhow!("Unknown source kind '{other}'")),
        }
    }
}

/// Descriptor persisted alongside an accepted source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceMetadata {
    pub name: String,
    pub kind: SourceKind,
    pub fingerprint: String,
    pub row_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub time_label: String,
    pub value_label: String,
    pub created_at: DateTime<Utc>,
}

impl DataSourceMetadata {
    pub fn from_summary(
        name: impl Into<String>,
        kind: SourceKind,
        fingerprint: impl Into<String>,
        summary: &TimeSeriesSummary,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            fingerprint: fingerprint.into(),
            row_count: summary.row_count,
            start_time: summary.start_time,
            end_time: summary.end_time,
            time_label: summary.time_label.clone(),
            value_label: summary.value_label.clone(),
            created_at: Utc::now(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating meta file {path:?}"))?;
        serde_json::to_writer_pretty(file, self).context("Writing metadata JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening meta file {path:?}"))?;
        let reader = BufReader::new(file);
        let metadata = serde_json::from_reader(reader).context("Parsing metadata JSON")?;
        Ok(metadata)
    }
}

/// Default source name: the file stem, or `stdin` for `-`.
pub fn default_source_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty() && *stem != "-")
        .unwrap_or("stdin")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn source_kind_codes_round_trip() {
        assert_eq!(SourceKind::from_code(SourceKind::Csv.code()), Some(SourceKind::Csv));
        assert_eq!(SourceKind::from_code(7), None);
        assert_eq!(SourceKind::Csv.to_string(), "csv");
        assert_eq!("CSV".parse::<SourceKind>().unwrap(), SourceKind::Csv);
    }

    #[test]
    fn kind_serializes_as_label() {
        let json = serde_json::to_string(&SourceKind::Csv).unwrap();
        assert_eq!(json, "\"csv\"");
    }

    #[test]
    fn default_name_strips_extension() {
        assert_eq!(default_source_name(&PathBuf::from("/data/boiler_temps.csv")), "boiler_temps");
        assert_eq!(default_source_name(&PathBuf::from("-")), "stdin");
    }
}
