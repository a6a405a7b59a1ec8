//! Coverage module
//!
//! Provides:
//! - Merged coverage summaries (lines, statements, functions, branches)
//! - LCOV parsing
//! - Cobertura XML parsing
//! - istanbul `json-summary` parsing

mod cobertura;
mod lcov;
mod summary;

pub use cobertura::*;
pub use lcov::*;
pub use summary::*;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Which coverage metric a badge reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    #[default]
    Lines,
    Statements,
    Functions,
    Branches,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::Lines,
        MetricKind::Statements,
        MetricKind::Functions,
        MetricKind::Branches,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Lines => "lines",
            MetricKind::Statements => "statements",
            MetricKind::Functions => "functions",
            MetricKind::Branches => "branches",
        }
    }

    /// Parse a metric name, falling back to `lines` for anything unrecognized.
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            debug!(value, "unknown coverage type, using lines");
            MetricKind::default()
        })
    }
}

impl FromStr for MetricKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_lowercase();
        MetricKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown coverage type: {}. Supported: lines, statements, functions, branches",
                    s
                )
            })
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Covered/total counts for one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metric {
    pub total: u64,
    pub covered: u64,
    pub pct: f64,
}

impl Metric {
    pub fn new(covered: u64, total: u64) -> Self {
        Self {
            total,
            covered,
            pct: percent(covered, total),
        }
    }
}

impl Default for Metric {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

/// Two-decimal percentage rounded half-up; an empty metric counts as fully covered.
pub fn percent(covered: u64, total: u64) -> f64 {
    if total == 0 {
        return 100.0;
    }
    let scaled = 1000.0 * 100.0 * covered as f64 / total as f64 + 5.0;
    (scaled / 10.0).floor() / 100.0
}

/// Coverage summary across all metrics
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CoverageSummary {
    pub lines: Metric,
    pub statements: Metric,
    pub functions: Metric,
    pub branches: Metric,
}

impl CoverageSummary {
    pub fn metric(&self, kind: MetricKind) -> &Metric {
        match kind {
            MetricKind::Lines => &self.lines,
            MetricKind::Statements => &self.statements,
            MetricKind::Functions => &self.functions,
            MetricKind::Branches => &self.branches,
        }
    }

    /// Sum counts across summaries and recompute percentages
    pub fn merge<'a>(summaries: impl IntoIterator<Item = &'a CoverageSummary>) -> Self {
        let mut counts = [(0u64, 0u64); 4];

        for summary in summaries {
            for (slot, kind) in counts.iter_mut().zip(MetricKind::ALL) {
                let metric = summary.metric(kind);
                slot.0 = slot.0.saturating_add(metric.covered);
                slot.1 = slot.1.saturating_add(metric.total);
            }
        }

        let [lines, statements, functions, branches] =
            counts.map(|(covered, total)| Metric::new(covered, total));

        Self {
            lines,
            statements,
            functions,
            branches,
        }
    }
}

/// Coverage for a single file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileCoverage {
    pub path: String,
    pub summary: CoverageSummary,
}

/// Coverage data from any source
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageData {
    pub files: Vec<FileCoverage>,
    pub total: CoverageSummary,
}

impl CoverageData {
    pub fn from_files(files: Vec<FileCoverage>) -> Self {
        let total = CoverageSummary::merge(files.iter().map(|f| &f.summary));
        Self { files, total }
    }
}

/// Supported coverage input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageFormat {
    Lcov,
    Cobertura,
    JsonSummary,
}

impl CoverageFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "info" | "lcov" => Some(CoverageFormat::Lcov),
            "xml" => Some(CoverageFormat::Cobertura),
            "json" => Some(CoverageFormat::JsonSummary),
            _ => None,
        }
    }
}

impl FromStr for CoverageFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "lcov" => Ok(CoverageFormat::Lcov),
            "cobertura" => Ok(CoverageFormat::Cobertura),
            "json-summary" | "json" => Ok(CoverageFormat::JsonSummary),
            _ => anyhow::bail!(
                "Unknown coverage format: {}. Supported: lcov, cobertura, json-summary",
                s
            ),
        }
    }
}

/// Parse coverage from a file based on format
pub fn parse_coverage(path: &Path, format: CoverageFormat) -> Result<CoverageData> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read coverage file: {}", path.display()))?;

    let data = match format {
        CoverageFormat::Lcov => parse_lcov_string(&content),
        CoverageFormat::Cobertura => parse_cobertura_string(&content),
        CoverageFormat::JsonSummary => parse_json_summary_string(&content),
    }
    .with_context(|| format!("Failed to parse coverage file: {}", path.display()))?;

    debug!(
        path = %path.display(),
        files = data.files.len(),
        lines_pct = data.total.lines.pct,
        "coverage parsed"
    );

    Ok(data)
}
