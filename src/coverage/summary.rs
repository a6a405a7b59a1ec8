//! istanbul `json-summary` parser (`coverage-summary.json`)

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

use super::{CoverageData, CoverageSummary, FileCoverage, Metric};

#[derive(Debug, Deserialize)]
struct RawMetric {
    total: u64,
    covered: u64,
}

impl From<&RawMetric> for Metric {
    fn from(raw: &RawMetric) -> Self {
        // pct is recomputed; newer istanbul writes "Unknown" for empty metrics
        Metric::new(raw.covered, raw.total)
    }
}

#[derive(Debug, Deserialize)]
struct RawSummary {
    lines: RawMetric,
    statements: RawMetric,
    functions: RawMetric,
    branches: RawMetric,
}

impl From<&RawSummary> for CoverageSummary {
    fn from(raw: &RawSummary) -> Self {
        Self {
            lines: (&raw.lines).into(),
            statements: (&raw.statements).into(),
            functions: (&raw.functions).into(),
            branches: (&raw.branches).into(),
        }
    }
}

/// Parse a `coverage-summary.json` document
///
/// The `total` entry is used as the merged summary when present; otherwise
/// the per-file entries are merged.
pub fn parse_json_summary_string(content: &str) -> Result<CoverageData> {
    let mut entries: BTreeMap<String, RawSummary> =
        serde_json::from_str(content).context("Invalid coverage summary JSON")?;

    let total = entries.remove("total");
    let files: Vec<FileCoverage> = entries
        .iter()
        .map(|(path, raw)| FileCoverage {
            path: path.clone(),
            summary: raw.into(),
        })
        .collect();

    Ok(match total {
        Some(raw) => CoverageData {
            files,
            total: (&raw).into(),
        },
        None => CoverageData::from_files(files),
    })
}
